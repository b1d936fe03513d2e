//! 动作注册表：动作种类、标签与选项字段。

use crate::ControlError;
use domain::{
    Choice, DeviceVariant, FieldKind, OptionField, OptionMap, logo_choices, logo_slot_choices,
    pip_choices, pip_choices_with_all, pip_recall_choices,
};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const FILE_NUMBER_PATTERN: &str = r"^([1-9]|[1-5][0-9]|6[0-4])$";
const TRANSITION_TIME_PATTERN: &str = r"^([0-9]|1[0-2])(\.\d)?$";
const COLOR_COMPONENT_PATTERN: &str = r"^(1?[0-9]{1,2}|2[0-4][0-9]|25[0-5])$";
const SIGNED_NUMBER_PATTERN: &str = r"^-?\d+$";

/// 动作种类（枚举即注册表）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Take,
    SelectInput,
    Freeze,
    Black,
    TestPatternMode,
    TestPatternType,
    RasterBox,
    TransitionTime,
    LogoSelect,
    LogoSave,
    AutoTake,
    PendPip,
    PipInput,
    PipRecall,
    PipFullscreen,
    PipUnit,
    /// 复合动作：水平 + 垂直位置两条命令
    PipPosition,
    /// 复合动作：水平 + 垂直尺寸两条命令
    PipSize,
    BackgroundColor,
}

impl ActionKind {
    pub const ALL: [ActionKind; 19] = [
        ActionKind::Take,
        ActionKind::SelectInput,
        ActionKind::Freeze,
        ActionKind::Black,
        ActionKind::TestPatternMode,
        ActionKind::TestPatternType,
        ActionKind::RasterBox,
        ActionKind::TransitionTime,
        ActionKind::LogoSelect,
        ActionKind::LogoSave,
        ActionKind::AutoTake,
        ActionKind::PendPip,
        ActionKind::PipInput,
        ActionKind::PipRecall,
        ActionKind::PipFullscreen,
        ActionKind::PipUnit,
        ActionKind::PipPosition,
        ActionKind::PipSize,
        ActionKind::BackgroundColor,
    ];

    /// 动作 ID，同时也是协议命令名。
    pub fn id(self) -> &'static str {
        match self {
            ActionKind::Take => "TAKE",
            ActionKind::SelectInput => "ISEL",
            ActionKind::Freeze => "FREEZE",
            ActionKind::Black => "BLACK",
            ActionKind::TestPatternMode => "OTPM",
            ActionKind::TestPatternType => "OTPT",
            ActionKind::RasterBox => "ORBM",
            ActionKind::TransitionTime => "TRNTIME",
            ActionKind::LogoSelect => "LOGOSEL",
            ActionKind::LogoSave => "LOGOSAVE",
            ActionKind::AutoTake => "AUTOTAKE",
            ActionKind::PendPip => "PENDPIP",
            ActionKind::PipInput => "PIPISEL",
            ActionKind::PipRecall => "PIPREC",
            ActionKind::PipFullscreen => "PIPFULL",
            ActionKind::PipUnit => "PIPUNIT",
            ActionKind::PipPosition => "PIPPOS",
            ActionKind::PipSize => "PIPSIZE",
            ActionKind::BackgroundColor => "RBACKGND",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Take => "Take",
            ActionKind::SelectInput => "Select Input",
            ActionKind::Freeze => "Freeze",
            ActionKind::Black => "Set Black Output",
            ActionKind::TestPatternMode => "Set Testpattern on/off",
            ActionKind::TestPatternType => "Set Testpattern Type",
            ActionKind::RasterBox => "Set Rasterbox on/off",
            ActionKind::TransitionTime => "Set Transition Time",
            ActionKind::LogoSelect => "Select Black/Logo",
            ActionKind::LogoSave => "Save Logo",
            ActionKind::AutoTake => "Set Autotake Mode on/off",
            ActionKind::PendPip => "Pend PiP Mode on/off",
            ActionKind::PipInput => "Pend PiP Input",
            ActionKind::PipRecall => "PiP Recall",
            ActionKind::PipFullscreen => "PiP Fullscreen",
            ActionKind::PipUnit => "PiP Unit mode",
            ActionKind::PipPosition => "PiP Position",
            ActionKind::PipSize => "PiP Size",
            ActionKind::BackgroundColor => "PiP Background color",
        }
    }

    /// 选项字段；输入下拉项随设备型号变化。
    pub fn fields(self, inputs: &[Choice]) -> Vec<OptionField> {
        let input = || OptionField::dropdown("i", "Input", inputs.to_vec(), 1);
        let pip = || OptionField::dropdown("p", "PiP", pip_choices(), 1);
        let output = || OptionField::dropdown("o", "Output", output_choices(), 1);
        match self {
            ActionKind::Take => Vec::new(),
            ActionKind::SelectInput => vec![
                input(),
                OptionField::text_input(
                    "f",
                    "Filenumber (optional)",
                    None,
                    Some(FILE_NUMBER_PATTERN),
                ),
            ],
            ActionKind::Freeze => vec![OptionField::dropdown(
                "m",
                "Freeze",
                two_state("unfrozen", "frozen"),
                1,
            )],
            ActionKind::Black => vec![OptionField::dropdown(
                "m",
                "Mode",
                two_state("normal", "black"),
                1,
            )],
            ActionKind::TestPatternMode => vec![
                output(),
                OptionField::dropdown("m", "Testpattern", two_state("off", "on"), 1),
            ],
            ActionKind::TestPatternType => vec![
                output(),
                OptionField::dropdown("t", "Type", test_pattern_choices(), 4),
            ],
            ActionKind::RasterBox => vec![
                output(),
                OptionField::dropdown("m", "Rasterbox", two_state("off", "on"), 1),
            ],
            ActionKind::TransitionTime => vec![OptionField::text_input(
                "s",
                "Seconds",
                Some("1.0"),
                Some(TRANSITION_TIME_PATTERN),
            )],
            ActionKind::LogoSelect => {
                vec![OptionField::dropdown("l", "Framestore", logo_choices(), 1)]
            }
            ActionKind::LogoSave => {
                vec![OptionField::dropdown("l", "Framestore", logo_slot_choices(), 1)]
            }
            ActionKind::AutoTake => vec![OptionField::dropdown(
                "m",
                "Autotake",
                two_state("off", "on"),
                0,
            )],
            ActionKind::PendPip => vec![
                pip(),
                OptionField::dropdown(
                    "m",
                    "PiP on/off",
                    two_state("unpend (no change on Take)", "pend (PiP on/off on Take)"),
                    0,
                ),
            ],
            ActionKind::PipInput => vec![
                OptionField::dropdown("p", "PiP", pip_choices_with_all(), 1),
                input(),
            ],
            ActionKind::PipRecall => vec![
                pip(),
                OptionField::dropdown("f", "Input", pip_recall_choices(), 1),
            ],
            ActionKind::PipFullscreen => vec![pip()],
            ActionKind::PipUnit => vec![OptionField::dropdown(
                "m",
                "Mode",
                two_state("Percentage", "Pixel"),
                0,
            )],
            ActionKind::PipPosition => vec![
                pip(),
                number("hpos", "Horizontal offset from center"),
                number("vpos", "Vertical offset from center"),
            ],
            ActionKind::PipSize => vec![
                pip(),
                number("hsize", "Horizontal size"),
                number("vsize", "Vertical size"),
            ],
            ActionKind::BackgroundColor => vec![
                color_component("r", "Red"),
                color_component("g", "Green"),
                color_component("b", "Blue"),
            ],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ActionKind {
    type Err = ControlError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.id() == value)
            .ok_or_else(|| ControlError::UnknownAction(value.to_string()))
    }
}

/// 动作定义（供宿主注册按键动作）。
///
/// 文本字段的正则在构建时编译一次，校验时复用。
#[derive(Debug, Clone)]
pub struct ActionDefinition {
    pub kind: ActionKind,
    pub label: &'static str,
    pub options: Vec<OptionField>,
    patterns: Vec<(&'static str, Result<Regex, regex::Error>)>,
}

impl PartialEq for ActionDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.label == other.label && self.options == other.options
    }
}

impl Eq for ActionDefinition {}

impl ActionDefinition {
    pub fn new(kind: ActionKind, inputs: &[Choice]) -> Self {
        let options = kind.fields(inputs);
        let patterns = options
            .iter()
            .filter_map(|field| match field.kind {
                FieldKind::TextInput {
                    pattern: Some(pattern),
                    ..
                } => Some((field.id, Regex::new(pattern))),
                _ => None,
            })
            .collect();
        Self {
            kind,
            label: kind.label(),
            options,
            patterns,
        }
    }

    /// 按字段描述校验选项：下拉值必须在选项内，文本必须匹配正则。
    ///
    /// 空值与未出现的字段不校验；编码本身不调用此方法。
    pub fn validate(&self, options: &OptionMap) -> Result<(), ControlError> {
        for field in &self.options {
            let Some(value) = options.get_filled(field.id) else {
                continue;
            };
            let invalid = || ControlError::InvalidOption {
                action: self.kind.id(),
                option: field.id,
                value: value.to_string(),
            };
            match &field.kind {
                FieldKind::Dropdown { choices, .. } => {
                    let id = value.as_int().ok_or_else(invalid)?;
                    if !choices.iter().any(|choice| choice.id == id) {
                        return Err(invalid());
                    }
                }
                FieldKind::TextInput {
                    pattern: Some(_), ..
                } => {
                    if !self.pattern(field.id)?.is_match(&value.to_string()) {
                        return Err(invalid());
                    }
                }
                FieldKind::TextInput { pattern: None, .. } | FieldKind::ColorPicker { .. } => {}
            }
        }
        Ok(())
    }

    fn pattern(&self, option: &str) -> Result<&Regex, ControlError> {
        match self.patterns.iter().find(|(id, _)| *id == option) {
            Some((_, Ok(regex))) => Ok(regex),
            Some((_, Err(err))) => Err(ControlError::Pattern(err.to_string())),
            None => Err(ControlError::Pattern(format!("no pattern compiled for `{option}`"))),
        }
    }
}

/// 构建指定型号的全部动作定义。
pub fn action_definitions(variant: DeviceVariant) -> Vec<ActionDefinition> {
    let inputs = variant.input_choices();
    ActionKind::ALL
        .into_iter()
        .map(|kind| ActionDefinition::new(kind, &inputs))
        .collect()
}

fn two_state(off: &str, on: &str) -> Vec<Choice> {
    vec![Choice::new(0, off), Choice::new(1, on)]
}

fn number(id: &'static str, label: &'static str) -> OptionField {
    OptionField::text_input(id, label, Some("0"), Some(SIGNED_NUMBER_PATTERN))
}

fn color_component(id: &'static str, label: &'static str) -> OptionField {
    OptionField::text_input(id, label, Some("0"), Some(COLOR_COMPONENT_PATTERN))
}

fn output_choices() -> Vec<Choice> {
    vec![Choice::new(1, "Program"), Choice::new(3, "Preview")]
}

fn test_pattern_choices() -> Vec<Choice> {
    vec![
        Choice::new(4, "16x16 Grid"),
        Choice::new(5, "32x32 Grid"),
        Choice::new(1, "H Ramp"),
        Choice::new(2, "V Ramp"),
        Choice::new(6, "Burst"),
        Choice::new(7, "75% Color Bars"),
        Choice::new(3, "100% Color Bars"),
        Choice::new(9, "Vertical Gray Steps"),
        Choice::new(10, "Horizontal Gray Steps"),
        Choice::new(8, "50% Gray"),
        Choice::new(11, "White"),
        Choice::new(12, "Black"),
        Choice::new(13, "Red"),
        Choice::new(14, "Green"),
        Choice::new(15, "Blue"),
    ]
}
