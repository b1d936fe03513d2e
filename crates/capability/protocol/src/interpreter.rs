//! 响应解析
//!
//! 每条协议行依次与固定的形状列表比对。各形状相互独立：
//! 同一行命中多个形状时全部生效（例如 `ISEL -i 2` 不会同时命中
//! 设备错误形状，但形状之间不做互斥判断）。
//!
//! | 顺序 | 形状 | 效果 |
//! |---|---|---|
//! | 1 | `ShellApp waiting for input` | 回复握手查询 |
//! | 2 | `VER 1.2.3` | 记录固件版本 |
//! | 3 | `PREVIEW -i2` | 更新 preview_bg |
//! | 4 | `PROGRAM -i 3` | 更新 program_bg |
//! | 5 | `LOGOSEL -l 1` | 更新 logo_bg |
//! | 6 | `ISEL -i 2` | 更新 preview_bg |
//! | 7 | `TAKE -e 0` | 交换 preview_bg / program_bg |
//! | 8 | `... -e -9994` | 分类并记录设备错误 |

use crate::error::ProtocolError;
use domain::{DeviceState, StateKey};
use pds_feedback::FeedbackKind;
use pds_telemetry::{LogLevel, LogSink};
use regex::{Captures, Regex};
use std::sync::Arc;
use tracing::debug;

/// 收到握手提示后发送的查询（固件版本 + 三路状态）
pub const HANDSHAKE_REPLY: &str = "\rVER -?\rPREVIEW -?\rPROGRAM -?\rLOGOSEL -?\r";

/// 周期轮询发送的状态查询
pub const REFRESH_REQUEST: &str = "PREVIEW -?\rPROGRAM -?\rLOGOSEL -?\r";

/// 协议行形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    HandshakePrompt,
    FirmwareVersion,
    /// 设备主动推送的预监输入
    PreviewInput,
    ProgramInput,
    LogoSelect,
    /// 交互式选择输入的回显
    InputSelect,
    TakeCompleted,
    DeviceError,
}

impl LineShape {
    /// 比对顺序
    pub const ORDER: [LineShape; 8] = [
        LineShape::HandshakePrompt,
        LineShape::FirmwareVersion,
        LineShape::PreviewInput,
        LineShape::ProgramInput,
        LineShape::LogoSelect,
        LineShape::InputSelect,
        LineShape::TakeCompleted,
        LineShape::DeviceError,
    ];

    fn pattern(self) -> &'static str {
        match self {
            LineShape::HandshakePrompt => r"ShellApp waiting for input",
            LineShape::FirmwareVersion => r"\bVER ((?:\d+\.?)+)",
            LineShape::PreviewInput => r"\bPREVIEW -i ?(\d+)",
            LineShape::ProgramInput => r"\bPROGRAM -i ?(\d+)",
            LineShape::LogoSelect => r"\bLOGOSEL -l ?(\d+)",
            LineShape::InputSelect => r"\bISEL -i (\d+)",
            LineShape::TakeCompleted => r"\bTAKE -e 0\b",
            LineShape::DeviceError => r"-e -(\d+)",
        }
    }
}

const INVALID_SIGNAL_PATTERN: &str = r"\bISEL -e -9999\b";

/// 设备错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    GenericFailure,
    InvalidState,
    NoResponse,
    InvalidResponse,
    Timeout,
    OutOfRange,
    NotFound,
    ChecksumMismatch,
    VersionMismatch,
    UnsupportedInterface,
    InvalidPointer,
    PartialCommand,
    BufferOverflow,
    InitializationInProgress,
    Unspecified,
}

impl DeviceErrorKind {
    /// 负状态码的绝对值 → 分类
    pub fn from_code(code: u64) -> Self {
        match code {
            9999 => DeviceErrorKind::GenericFailure,
            9998 => DeviceErrorKind::InvalidState,
            9997 => DeviceErrorKind::NoResponse,
            9996 => DeviceErrorKind::InvalidResponse,
            9995 => DeviceErrorKind::Timeout,
            9994 => DeviceErrorKind::OutOfRange,
            9993 => DeviceErrorKind::NotFound,
            9992 => DeviceErrorKind::ChecksumMismatch,
            9991 => DeviceErrorKind::VersionMismatch,
            9990 => DeviceErrorKind::UnsupportedInterface,
            9989 => DeviceErrorKind::InvalidPointer,
            9988 => DeviceErrorKind::PartialCommand,
            9987 => DeviceErrorKind::BufferOverflow,
            9986 => DeviceErrorKind::InitializationInProgress,
            _ => DeviceErrorKind::Unspecified,
        }
    }

    /// 宿主日志文本，嵌入实例名与原始行
    pub fn describe(self, label: &str, line: &str) -> String {
        match self {
            DeviceErrorKind::GenericFailure => {
                format!("Received generic fail error from PDS {label}: {line}")
            }
            DeviceErrorKind::InvalidState => {
                format!("PDS {label} says: Operation is not applicable in current state: {line}")
            }
            DeviceErrorKind::NoResponse => format!(
                "Received UI related error from PDS {label}, did not get response from device: {line}"
            ),
            DeviceErrorKind::InvalidResponse => format!(
                "Received UI related error from PDS {label}, did not get valid response from device: {line}"
            ),
            DeviceErrorKind::Timeout => format!("PDS {label} says: Timeout occurred: {line}"),
            DeviceErrorKind::OutOfRange => {
                format!("PDS {label} says: Parameter / data out of range: {line}")
            }
            DeviceErrorKind::NotFound => format!(
                "PDS {label} says: Searching for data in an index, no matching data: {line}"
            ),
            DeviceErrorKind::ChecksumMismatch => {
                format!("PDS {label} says: Checksum didn't match: {line}")
            }
            DeviceErrorKind::VersionMismatch => {
                format!("PDS {label} says: Version didn't match: {line}")
            }
            DeviceErrorKind::UnsupportedInterface => format!(
                "Received UI related error from PDS {label}, current device interface not supported: {line}"
            ),
            DeviceErrorKind::InvalidPointer => {
                format!("PDS {label} says: Pointer operation invalid: {line}")
            }
            DeviceErrorKind::PartialCommand => {
                format!("PDS {label} says: Part of command had error: {line}")
            }
            DeviceErrorKind::BufferOverflow => format!("PDS {label} says: Buffer overflow: {line}"),
            DeviceErrorKind::InitializationInProgress => format!(
                "PDS {label} says: Initialization is not done (still in progress): {line}"
            ),
            DeviceErrorKind::Unspecified => {
                format!("Received unspecified error from PDS {label}: {line}")
            }
        }
    }
}

/// 设备上报的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFault {
    /// 选择的输入无有效信号（`ISEL -e -9999`）
    InvalidSignal { preview: Option<i64> },
    /// `code` 为负状态码的绝对值；超出 u64 时为 `None`
    Classified {
        code: Option<u64>,
        kind: DeviceErrorKind,
    },
}

/// 单行解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEffects {
    /// 需要立即写回设备的命令
    pub replies: Vec<&'static str>,
    /// 需要重算的反馈（每种至多一次，按触发顺序）
    pub invalidated: Vec<FeedbackKind>,
    pub fault: Option<DeviceFault>,
}

impl LineEffects {
    pub fn invalidate(&mut self, kind: FeedbackKind) {
        if !self.invalidated.contains(&kind) {
            self.invalidated.push(kind);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty() && self.invalidated.is_empty() && self.fault.is_none()
    }
}

struct ShapeMatcher {
    shape: LineShape,
    regex: Regex,
}

/// 响应解析器：唯一的设备状态写入方
pub struct ResponseInterpreter {
    label: String,
    matchers: Vec<ShapeMatcher>,
    invalid_signal: Regex,
    firmware_version: String,
    log: Arc<dyn LogSink>,
}

impl ResponseInterpreter {
    pub fn new(label: impl Into<String>, log: Arc<dyn LogSink>) -> Result<Self, ProtocolError> {
        let matchers = LineShape::ORDER
            .into_iter()
            .map(|shape| {
                Ok(ShapeMatcher {
                    shape,
                    regex: Regex::new(shape.pattern())?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self {
            label: label.into(),
            matchers,
            invalid_signal: Regex::new(INVALID_SIGNAL_PATTERN)?,
            firmware_version: "0".to_string(),
            log,
        })
    }

    /// 最近一次上报的固件版本（未上报时为 `"0"`）
    pub fn firmware_version(&self) -> &str {
        &self.firmware_version
    }

    pub fn reset(&mut self) {
        self.firmware_version = "0".to_string();
    }

    /// 解析一条协议行；未识别的行返回空结果。
    pub fn interpret(&mut self, line: &str, state: &mut DeviceState) -> LineEffects {
        let mut effects = LineEffects::default();
        for matcher in &self.matchers {
            let Some(captures) = matcher.regex.captures(line) else {
                continue;
            };
            match matcher.shape {
                LineShape::HandshakePrompt => effects.replies.push(HANDSHAKE_REPLY),
                LineShape::FirmwareVersion => {
                    self.firmware_version = captures[1].to_string();
                    debug!(
                        target: "pds.protocol",
                        firmware_version = %self.firmware_version,
                        "firmware_version_reported"
                    );
                }
                LineShape::PreviewInput | LineShape::InputSelect => {
                    store_input(state, &mut effects, StateKey::PreviewBg, &captures);
                }
                LineShape::ProgramInput => {
                    store_input(state, &mut effects, StateKey::ProgramBg, &captures);
                }
                LineShape::LogoSelect => {
                    store_input(state, &mut effects, StateKey::LogoBg, &captures);
                }
                LineShape::TakeCompleted => {
                    state.swap(StateKey::PreviewBg, StateKey::ProgramBg);
                    effects.invalidate(FeedbackKind::PreviewBg);
                    effects.invalidate(FeedbackKind::ProgramBg);
                }
                LineShape::DeviceError => {
                    let fault = if self.invalid_signal.is_match(line) {
                        DeviceFault::InvalidSignal {
                            preview: state.get_int(StateKey::PreviewBg),
                        }
                    } else {
                        let code = captures[1].parse::<u64>().ok();
                        DeviceFault::Classified {
                            code,
                            kind: code
                                .map(DeviceErrorKind::from_code)
                                .unwrap_or(DeviceErrorKind::Unspecified),
                        }
                    };
                    self.log
                        .log(LogLevel::Error, &describe_fault(&fault, &self.label, line));
                    effects.fault = Some(fault);
                }
            }
        }
        effects
    }
}

fn store_input(
    state: &mut DeviceState,
    effects: &mut LineEffects,
    key: StateKey,
    captures: &Captures<'_>,
) {
    match captures[1].parse::<i64>() {
        Ok(value) => {
            state.set_int(key, value);
            effects.invalidate(FeedbackKind::for_state(key));
        }
        Err(err) => {
            debug!(target: "pds.protocol", key = %key, error = %err, "state_value_unparsable");
        }
    }
}

fn describe_fault(fault: &DeviceFault, label: &str, line: &str) -> String {
    match fault {
        DeviceFault::InvalidSignal { preview } => {
            let preview = preview
                .map(|input| input.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            format!("Current selected input \"{preview}\" on {label} is an invalid signal!")
        }
        DeviceFault::Classified { kind, .. } => kind.describe(label, line),
    }
}
