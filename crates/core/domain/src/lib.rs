pub mod options;
pub mod state;
pub mod variant;

pub use options::{Choice, FieldKind, OptionField, OptionMap, OptionValue, Rgb, VisualOverride};
pub use state::{DeviceState, StateKey, StateValue};
pub use variant::{
    DeviceVariant, logo_choices, logo_slot_choices, pip_choices, pip_choices_with_all,
    pip_recall_choices,
};

/// 领域模型解析错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("unknown state key: {0}")]
    UnknownStateKey(String),
    #[error("unknown device variant: {0}")]
    UnknownVariant(String),
}
