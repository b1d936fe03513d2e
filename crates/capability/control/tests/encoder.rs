use domain::{DeviceVariant, OptionMap};
use pds_control::{ActionKind, ControlError, action_definitions, encode_action};

#[test]
fn select_input_encodes_single_command() {
    let options = OptionMap::new().with("i", 5_i64);
    assert_eq!(encode_action("ISEL", &options).unwrap(), "ISEL -i 5\r");
}

#[test]
fn freeze_always_appends_fpupdate() {
    let frozen = OptionMap::new().with("m", 1_i64);
    assert_eq!(
        encode_action("FREEZE", &frozen).unwrap(),
        "FREEZE -m 1\rFPUPDATE\r"
    );

    let unfrozen = OptionMap::new().with("m", 0_i64);
    assert_eq!(
        encode_action("FREEZE", &unfrozen).unwrap(),
        "FREEZE -m 0\rFPUPDATE\r"
    );
}

#[test]
fn pip_position_emits_horizontal_then_vertical() {
    let options = OptionMap::new()
        .with("p", 1_i64)
        .with("hpos", 10_i64)
        .with("vpos", -5_i64);
    assert_eq!(
        encode_action("PIPPOS", &options).unwrap(),
        "PIPHPOS -p 1 -o 10\rPIPVPOS -p 1 -o -5\r"
    );
}

#[test]
fn pip_size_emits_width_then_height() {
    let options = OptionMap::new()
        .with("p", 2_i64)
        .with("hsize", "40")
        .with("vsize", "30");
    assert_eq!(
        encode_action("PIPSIZE", &options).unwrap(),
        "PIPHSIZE -p 2 -w 40\rPIPVSIZE -p 2 -h 30\r"
    );
}

#[test]
fn background_color_uses_flagged_components() {
    let options = OptionMap::new()
        .with("r", "255")
        .with("g", "0")
        .with("b", "0");
    assert_eq!(
        encode_action("RBACKGND", &options).unwrap(),
        "RBACKGND -r 255 -g 0 -b 0\r"
    );
}

#[test]
fn composite_action_without_offsets_is_rejected() {
    let options = OptionMap::new().with("p", 1_i64).with("hpos", 10_i64);
    assert_eq!(
        encode_action("PIPPOS", &options),
        Err(ControlError::MissingOption {
            action: "PIPPOS",
            option: "vpos",
        })
    );
}

#[test]
fn unknown_action_is_a_typed_failure() {
    assert_eq!(
        encode_action("REBOOT", &OptionMap::new()),
        Err(ControlError::UnknownAction("REBOOT".to_string()))
    );
}

#[test]
fn encoding_is_deterministic() {
    let options = OptionMap::new().with("o", 1_i64).with("t", 7_i64);
    let first = encode_action("OTPT", &options).unwrap();
    let second = encode_action("OTPT", &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "OTPT -o 1 -t 7\r");
}

#[test]
fn definitions_validate_dropdowns_and_patterns() {
    let definitions = action_definitions(DeviceVariant::Pds901);
    let find = |kind: ActionKind| {
        definitions
            .iter()
            .find(|definition| definition.kind == kind)
            .expect("definition")
    };

    let isel = find(ActionKind::SelectInput);
    assert!(isel.validate(&OptionMap::new().with("i", 7_i64)).is_ok());
    assert!(isel.validate(&OptionMap::new().with("i", 9_i64)).is_err());
    assert!(isel.validate(&OptionMap::new().with("i", 1_i64).with("f", "64")).is_ok());
    assert!(isel.validate(&OptionMap::new().with("i", 1_i64).with("f", "65")).is_err());

    let transition = find(ActionKind::TransitionTime);
    assert!(transition.validate(&OptionMap::new().with("s", "12.5")).is_ok());
    assert!(transition.validate(&OptionMap::new().with("s", "13")).is_err());

    let background = find(ActionKind::BackgroundColor);
    let rgb = OptionMap::new().with("r", "255").with("g", "0").with("b", "256");
    assert_eq!(
        background.validate(&rgb),
        Err(ControlError::InvalidOption {
            action: "RBACKGND",
            option: "b",
            value: "256".to_string(),
        })
    );

    let position = find(ActionKind::PipPosition);
    let offsets = OptionMap::new().with("p", 1_i64).with("hpos", "10").with("vpos", "-5");
    assert!(position.validate(&offsets).is_ok());
}

#[test]
fn registry_covers_every_action() {
    let definitions = action_definitions(DeviceVariant::Pds701);
    assert_eq!(definitions.len(), ActionKind::ALL.len());
    assert!(definitions.iter().any(|definition| definition.label == "PiP Size"));
}
