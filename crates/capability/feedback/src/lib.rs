//! # 反馈判定能力模块
//!
//! 根据设备状态判断按键反馈是否成立，成立时返回配置的前景/背景色。
//! 判定是同步纯函数；哪些反馈需要重算由状态变化显式给出
//! （见 [`FeedbackKind::for_state`]），不做全量扫描。

use domain::{
    Choice, DeviceState, DeviceVariant, OptionField, OptionMap, Rgb, StateKey, VisualOverride,
    logo_choices, pip_choices,
};
use std::fmt;
use std::str::FromStr;

/// 反馈判定错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackError {
    #[error("unknown feedback: {0}")]
    UnknownFeedback(String),
}

/// 反馈种类（枚举即注册表）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    PreviewBg,
    ProgramBg,
    LogoBg,
    PipBg,
}

impl FeedbackKind {
    pub const ALL: [FeedbackKind; 4] = [
        FeedbackKind::PreviewBg,
        FeedbackKind::ProgramBg,
        FeedbackKind::LogoBg,
        FeedbackKind::PipBg,
    ];

    pub fn id(self) -> &'static str {
        match self {
            FeedbackKind::PreviewBg => "preview_bg",
            FeedbackKind::ProgramBg => "program_bg",
            FeedbackKind::LogoBg => "logo_bg",
            FeedbackKind::PipBg => "pip_bg",
        }
    }

    /// 某个状态键变化时需要重算的反馈。
    pub fn for_state(key: StateKey) -> FeedbackKind {
        match key {
            StateKey::PreviewBg => FeedbackKind::PreviewBg,
            StateKey::ProgramBg => FeedbackKind::ProgramBg,
            StateKey::LogoBg => FeedbackKind::LogoBg,
            StateKey::Pip1 | StateKey::Pip2 => FeedbackKind::PipBg,
        }
    }

    fn default_colors(self) -> VisualOverride {
        let bgcolor = match self {
            FeedbackKind::PreviewBg => Rgb::GREEN,
            FeedbackKind::ProgramBg | FeedbackKind::LogoBg | FeedbackKind::PipBg => Rgb::RED,
        };
        VisualOverride {
            color: Rgb::WHITE,
            bgcolor,
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FeedbackKind {
    type Err = FeedbackError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FeedbackKind::ALL
            .into_iter()
            .find(|kind| kind.id() == value)
            .ok_or_else(|| FeedbackError::UnknownFeedback(value.to_string()))
    }
}

/// 判定反馈：条件成立返回颜色覆盖，否则 `None`。
///
/// 选项：`fg`/`bg`（`0xRRGGBB`，缺省取定义默认色），
/// `input`（输入或台标编号），`p`（PiP 编号 1/2）。
pub fn evaluate(kind: FeedbackKind, options: &OptionMap, state: &DeviceState) -> Option<VisualOverride> {
    let holds = match kind {
        FeedbackKind::PreviewBg => selected(state, StateKey::PreviewBg, options),
        FeedbackKind::ProgramBg => selected(state, StateKey::ProgramBg, options),
        FeedbackKind::LogoBg => selected(state, StateKey::LogoBg, options),
        FeedbackKind::PipBg => options
            .get_int("p")
            .and_then(StateKey::pip)
            .and_then(|key| state.get(key))
            .and_then(|value| value.as_bool())
            .unwrap_or(false),
    };
    if !holds {
        return None;
    }

    let defaults = kind.default_colors();
    Some(VisualOverride {
        color: color_option(options, "fg").unwrap_or(defaults.color),
        bgcolor: color_option(options, "bg").unwrap_or(defaults.bgcolor),
    })
}

/// 按反馈 ID 判定。
pub fn evaluate_feedback(
    name: &str,
    options: &OptionMap,
    state: &DeviceState,
) -> Result<Option<VisualOverride>, FeedbackError> {
    let kind: FeedbackKind = name.parse()?;
    Ok(evaluate(kind, options, state))
}

fn selected(state: &DeviceState, key: StateKey, options: &OptionMap) -> bool {
    match (state.get_int(key), options.get_int("input")) {
        (Some(current), Some(expected)) => current == expected,
        _ => false,
    }
}

fn color_option(options: &OptionMap, key: &str) -> Option<Rgb> {
    options
        .get_int(key)
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value <= 0xff_ffff)
        .map(Rgb::from_packed)
}

/// 反馈定义（供宿主注册反馈）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDefinition {
    pub kind: FeedbackKind,
    pub label: &'static str,
    pub description: &'static str,
    pub options: Vec<OptionField>,
}

/// 构建指定型号的全部反馈定义。
pub fn feedback_definitions(variant: DeviceVariant) -> Vec<FeedbackDefinition> {
    let inputs = variant.input_choices();
    FeedbackKind::ALL
        .into_iter()
        .map(|kind| definition(kind, &inputs))
        .collect()
}

fn definition(kind: FeedbackKind, inputs: &[Choice]) -> FeedbackDefinition {
    let defaults = kind.default_colors();
    let colors = [
        OptionField::color("fg", "Foreground color", defaults.color),
        OptionField::color("bg", "Background color", defaults.bgcolor),
    ];
    let (label, description, selector) = match kind {
        FeedbackKind::PreviewBg => (
            "Change colors for preview",
            "If the input specified is in use by preview, change colors of the bank",
            OptionField::dropdown("input", "Input", inputs.to_vec(), 1),
        ),
        FeedbackKind::ProgramBg => (
            "Change colors for program",
            "If the input specified is in use by program, change colors of the bank",
            OptionField::dropdown("input", "Input", inputs.to_vec(), 1),
        ),
        FeedbackKind::LogoBg => (
            "Change colors for logo",
            "If the logo specified is in use, change colors of the bank",
            OptionField::dropdown("input", "Framestore", logo_choices(), 1),
        ),
        FeedbackKind::PipBg => (
            "Change colors for PiP",
            "If the PiP specified is in use, change colors of the bank",
            OptionField::dropdown("p", "PiP", pip_choices(), 1),
        ),
    };

    let options = match kind {
        FeedbackKind::PipBg => std::iter::once(selector).chain(colors).collect(),
        _ => colors.into_iter().chain(std::iter::once(selector)).collect(),
    };
    FeedbackDefinition {
        kind,
        label,
        description,
        options,
    }
}
