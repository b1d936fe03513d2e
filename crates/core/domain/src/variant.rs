//! 设备型号与输入选项集。

use crate::DomainError;
use crate::options::Choice;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PDS 设备型号（决定可用输入）。
///
/// 序列化为宿主配置中的数字 ID：701 = 1，901 = 2，902 = 3。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DeviceVariant {
    #[default]
    Pds701,
    Pds901,
    Pds902,
}

impl DeviceVariant {
    pub const ALL: [DeviceVariant; 3] = [
        DeviceVariant::Pds701,
        DeviceVariant::Pds901,
        DeviceVariant::Pds902,
    ];

    pub fn id(self) -> u8 {
        match self {
            DeviceVariant::Pds701 => 1,
            DeviceVariant::Pds901 => 2,
            DeviceVariant::Pds902 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceVariant::Pds701 => "PDS-701",
            DeviceVariant::Pds901 => "PDS-901",
            DeviceVariant::Pds902 => "PDS-902",
        }
    }

    /// 901/902 额外带两路 DVI 输入（7、8）。
    pub fn has_dvi_extension(self) -> bool {
        matches!(self, DeviceVariant::Pds901 | DeviceVariant::Pds902)
    }

    /// 只有 901 没有 SDI 输入（9）。
    pub fn has_sdi(self) -> bool {
        self != DeviceVariant::Pds901
    }

    /// 当前型号的输入选项集（有序）。
    pub fn input_choices(self) -> Vec<Choice> {
        let mut choices = vec![
            Choice::new(1, "1 VGA"),
            Choice::new(2, "2 VGA"),
            Choice::new(3, "3 VGA"),
            Choice::new(4, "4 VGA"),
            Choice::new(5, "5 DVI"),
            Choice::new(6, "6 DVI"),
        ];
        if self.has_dvi_extension() {
            choices.push(Choice::new(7, "7 DVI"));
            choices.push(Choice::new(8, "8 DVI"));
        }
        if self.has_sdi() {
            choices.push(Choice::new(9, "9 SDI"));
        }
        choices.push(Choice::new(10, "Black/Logo"));
        choices
    }

    /// 宿主配置表单中的型号下拉项。
    pub fn choices() -> Vec<Choice> {
        DeviceVariant::ALL
            .into_iter()
            .map(|variant| Choice::new(i64::from(variant.id()), variant.label()))
            .collect()
    }
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for DeviceVariant {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DeviceVariant::ALL
            .into_iter()
            .find(|variant| variant.id() == value)
            .ok_or_else(|| DomainError::UnknownVariant(value.to_string()))
    }
}

impl From<DeviceVariant> for u8 {
    fn from(variant: DeviceVariant) -> Self {
        variant.id()
    }
}

impl FromStr for DeviceVariant {
    type Err = DomainError;

    /// 接受配置 ID（`2`）、型号（`901`）或标签（`PDS-901`）。
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let model = trimmed
            .strip_prefix("PDS-")
            .or_else(|| trimmed.strip_prefix("pds-"))
            .unwrap_or(trimmed);
        match model {
            "1" | "701" => Ok(DeviceVariant::Pds701),
            "2" | "901" => Ok(DeviceVariant::Pds901),
            "3" | "902" => Ok(DeviceVariant::Pds902),
            _ => Err(DomainError::UnknownVariant(value.to_string())),
        }
    }
}

/// 黑场/台标选项。
pub fn logo_choices() -> Vec<Choice> {
    vec![
        Choice::new(0, "Black"),
        Choice::new(1, "Logo 1"),
        Choice::new(2, "Logo 2"),
        Choice::new(3, "Logo 3"),
    ]
}

/// 台标保存槽位（不含黑场）。
pub fn logo_slot_choices() -> Vec<Choice> {
    logo_choices().into_iter().filter(|choice| choice.id != 0).collect()
}

pub fn pip_choices() -> Vec<Choice> {
    vec![Choice::new(1, "1"), Choice::new(2, "2")]
}

pub fn pip_choices_with_all() -> Vec<Choice> {
    let mut choices = vec![Choice::new(0, "All")];
    choices.extend(pip_choices());
    choices
}

/// PiP 预设调用槽位 1..=10。
pub fn pip_recall_choices() -> Vec<Choice> {
    (1..=10).map(|id| Choice::new(id, id.to_string())).collect()
}
