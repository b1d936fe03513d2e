//! 动作/反馈选项：取值、有序选项表与字段描述。

use std::fmt;

/// 单个选项值（下拉为整数，文本输入为字符串）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Int(i64),
    Text(String),
}

impl OptionValue {
    /// 空字符串视为未填写。
    pub fn is_blank(&self) -> bool {
        matches!(self, OptionValue::Text(text) if text.is_empty())
    }

    /// 取整数值；文本按前导整数解析（`"12abc"` → 12，`" -5"` → -5）。
    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(value) => Some(*value),
            OptionValue::Text(text) => parse_leading_int(text),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Int(value) => write!(f, "{}", value),
            OptionValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

/// 有序选项表。
///
/// 默认编码规则按插入顺序输出选项，因此不使用 HashMap。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式追加选项。
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// 插入选项；同名键原位覆盖，保持原顺序。
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// 读取非空选项。
    pub fn get_filled(&self, key: &str) -> Option<&OptionValue> {
        self.get(key).filter(|value| !value.is_blank())
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(OptionValue::as_int)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> FromIterator<(K, V)> for OptionMap
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// 24 位 RGB 颜色，宿主以 `0xRRGGBB` 整数传递。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_packed(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    pub fn from_packed(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

/// 反馈成立时返回的前景/背景色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualOverride {
    pub color: Rgb,
    pub bgcolor: Rgb,
}

/// 下拉选项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: i64,
    pub label: String,
}

impl Choice {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// 选项字段类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Dropdown {
        choices: Vec<Choice>,
        default: i64,
    },
    TextInput {
        default: Option<String>,
        /// 输入校验正则（可选）
        pattern: Option<&'static str>,
    },
    ColorPicker {
        default: Rgb,
    },
}

/// 动作或反馈的一个可配置字段（供宿主渲染表单）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionField {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl OptionField {
    pub fn dropdown(id: &'static str, label: &'static str, choices: Vec<Choice>, default: i64) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::Dropdown { choices, default },
        }
    }

    pub fn text_input(
        id: &'static str,
        label: &'static str,
        default: Option<&str>,
        pattern: Option<&'static str>,
    ) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::TextInput {
                default: default.map(str::to_string),
                pattern,
            },
        }
    }

    pub fn color(id: &'static str, label: &'static str, default: Rgb) -> Self {
        Self {
            id,
            label,
            kind: FieldKind::ColorPicker { default },
        }
    }

    /// 字段默认值（文本框无默认时为 `None`）。
    pub fn default_value(&self) -> Option<OptionValue> {
        match &self.kind {
            FieldKind::Dropdown { default, .. } => Some(OptionValue::Int(*default)),
            FieldKind::TextInput { default, .. } => default.clone().map(OptionValue::Text),
            FieldKind::ColorPicker { default } => Some(OptionValue::Int(i64::from(default.to_packed()))),
        }
    }
}
