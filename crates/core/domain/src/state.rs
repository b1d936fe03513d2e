//! 设备状态存储。
//!
//! 只由响应解析器写入，反馈判定只读；会话结束时清空。

use crate::DomainError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 状态键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// 预监总线当前输入
    PreviewBg,
    /// 主输出总线当前输入
    ProgramBg,
    /// 当前选中的黑场/台标帧存
    LogoBg,
    Pip1,
    Pip2,
}

impl StateKey {
    pub const ALL: [StateKey; 5] = [
        StateKey::PreviewBg,
        StateKey::ProgramBg,
        StateKey::LogoBg,
        StateKey::Pip1,
        StateKey::Pip2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::PreviewBg => "preview_bg",
            StateKey::ProgramBg => "program_bg",
            StateKey::LogoBg => "logo_bg",
            StateKey::Pip1 => "pip1",
            StateKey::Pip2 => "pip2",
        }
    }

    /// PiP 编号（1/2）对应的状态键。
    pub fn pip(index: i64) -> Option<StateKey> {
        match index {
            1 => Some(StateKey::Pip1),
            2 => Some(StateKey::Pip2),
            _ => None,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateKey {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        StateKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| DomainError::UnknownStateKey(value.to_string()))
    }
}

/// 状态值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateValue {
    Int(i64),
    Bool(bool),
}

impl StateValue {
    pub fn as_int(self) -> Option<i64> {
        match self {
            StateValue::Int(value) => Some(value),
            StateValue::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            StateValue::Bool(value) => Some(value),
            StateValue::Int(_) => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Int(value) => write!(f, "{}", value),
            StateValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// 设备状态快照。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    values: HashMap<StateKey, StateValue>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: StateKey) -> Option<StateValue> {
        self.values.get(&key).copied()
    }

    /// 按字符串键读取；未知键与未写入的键都返回 `None`。
    pub fn get_by_name(&self, key: &str) -> Option<StateValue> {
        key.parse::<StateKey>().ok().and_then(|key| self.get(key))
    }

    pub fn get_int(&self, key: StateKey) -> Option<i64> {
        self.get(key).and_then(StateValue::as_int)
    }

    pub fn set(&mut self, key: StateKey, value: StateValue) {
        self.values.insert(key, value);
    }

    pub fn set_int(&mut self, key: StateKey, value: i64) {
        self.set(key, StateValue::Int(value));
    }

    /// 交换两个键的值（包括缺失状态）。
    pub fn swap(&mut self, a: StateKey, b: StateKey) {
        let first = self.values.remove(&a);
        let second = self.values.remove(&b);
        if let Some(value) = second {
            self.values.insert(a, value);
        }
        if let Some(value) = first {
            self.values.insert(b, value);
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
