//! # 命令编码能力模块
//!
//! 把宿主触发的动作（动作名 + 选项表）编码为 PDS 行协议命令串。
//!
//! ```text
//! 宿主按键 ──▶ encode_action("ISEL", {i: 3}) ──▶ "ISEL -i 3\r" ──▶ 会话写入 socket
//! ```
//!
//! 编码是纯函数：相同输入永远得到相同输出，未知动作返回
//! [`ControlError::UnknownAction`]，不会产生残缺命令。

mod action;
mod encoder;

pub use action::{ActionDefinition, ActionKind, action_definitions};
pub use encoder::{FREEZE_FOLLOW_UP, encode, encode_action};

/// 命令编码错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("action {action} requires option `{option}`")]
    MissingOption {
        action: &'static str,
        option: &'static str,
    },
    #[error("invalid value for option `{option}` of {action}: {value}")]
    InvalidOption {
        action: &'static str,
        option: &'static str,
        value: String,
    },
    #[error("invalid option pattern: {0}")]
    Pattern(String),
}
