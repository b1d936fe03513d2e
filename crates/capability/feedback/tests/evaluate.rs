use domain::{DeviceState, DeviceVariant, FieldKind, OptionMap, Rgb, StateKey, StateValue, VisualOverride};
use pds_feedback::{FeedbackError, FeedbackKind, evaluate, evaluate_feedback, feedback_definitions};

fn input_options(input: i64) -> OptionMap {
    OptionMap::new()
        .with("fg", 0xffffff_i64)
        .with("bg", 0x00ff00_i64)
        .with("input", input)
}

#[test]
fn preview_override_only_for_matching_input() {
    let mut state = DeviceState::new();
    let options = input_options(3);

    assert_eq!(evaluate_feedback("preview_bg", &options, &state), Ok(None));

    state.set_int(StateKey::PreviewBg, 3);
    assert_eq!(
        evaluate_feedback("preview_bg", &options, &state),
        Ok(Some(VisualOverride {
            color: Rgb::WHITE,
            bgcolor: Rgb::GREEN,
        }))
    );

    state.set_int(StateKey::PreviewBg, 4);
    assert_eq!(evaluate_feedback("preview_bg", &options, &state), Ok(None));
}

#[test]
fn program_and_logo_read_their_own_keys() {
    let mut state = DeviceState::new();
    state.set_int(StateKey::PreviewBg, 2);
    assert!(evaluate(FeedbackKind::ProgramBg, &input_options(2), &state).is_none());

    state.set_int(StateKey::ProgramBg, 2);
    state.set_int(StateKey::LogoBg, 0);
    assert!(evaluate(FeedbackKind::ProgramBg, &input_options(2), &state).is_some());
    assert!(evaluate(FeedbackKind::LogoBg, &input_options(0), &state).is_some());
    assert!(evaluate(FeedbackKind::LogoBg, &input_options(1), &state).is_none());
}

#[test]
fn text_selector_is_parsed_as_integer() {
    let mut state = DeviceState::new();
    state.set_int(StateKey::ProgramBg, 7);
    let options = OptionMap::new().with("input", "7");
    let result = evaluate(FeedbackKind::ProgramBg, &options, &state).expect("override");
    assert_eq!(result.color, Rgb::WHITE);
    assert_eq!(result.bgcolor, Rgb::RED);
}

#[test]
fn pip_override_requires_true_flag() {
    let mut state = DeviceState::new();
    let options = OptionMap::new().with("p", 2_i64).with("bg", 0x0000ff_i64);
    assert!(evaluate(FeedbackKind::PipBg, &options, &state).is_none());

    state.set(StateKey::Pip2, StateValue::Bool(false));
    assert!(evaluate(FeedbackKind::PipBg, &options, &state).is_none());

    state.set(StateKey::Pip2, StateValue::Bool(true));
    let result = evaluate(FeedbackKind::PipBg, &options, &state).expect("override");
    assert_eq!(result.bgcolor, Rgb::new(0, 0, 255));

    let other = OptionMap::new().with("p", 1_i64);
    assert!(evaluate(FeedbackKind::PipBg, &other, &state).is_none());
}

#[test]
fn unknown_feedback_is_reported() {
    let state = DeviceState::new();
    assert_eq!(
        evaluate_feedback("tally", &OptionMap::new(), &state),
        Err(FeedbackError::UnknownFeedback("tally".to_string()))
    );
}

#[test]
fn state_keys_invalidate_matching_feedback() {
    assert_eq!(FeedbackKind::for_state(StateKey::PreviewBg), FeedbackKind::PreviewBg);
    assert_eq!(FeedbackKind::for_state(StateKey::Pip1), FeedbackKind::PipBg);
}

#[test]
fn definitions_carry_default_colors_and_selectors() {
    let definitions = feedback_definitions(DeviceVariant::Pds902);
    assert_eq!(definitions.len(), 4);

    let preview = &definitions[0];
    assert_eq!(preview.kind, FeedbackKind::PreviewBg);
    assert_eq!(preview.options[1].kind, FieldKind::ColorPicker { default: Rgb::GREEN });
    assert_eq!(preview.options[2].id, "input");

    let logo = definitions
        .iter()
        .find(|definition| definition.kind == FeedbackKind::LogoBg)
        .expect("logo");
    let FieldKind::Dropdown { choices, .. } = &logo.options[2].kind else {
        panic!("logo selector must be a dropdown");
    };
    assert_eq!(choices.len(), 4);
}
