//! 日志初始化、面向宿主的日志汇与会话 ID 生成。

use std::fmt;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt};

/// 宿主可见日志级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// 日志汇：宿主日志面板的抽象（level + message）。
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// 转发到 tracing 的日志汇。
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "pds.device", "{}", message),
            LogLevel::Info => tracing::info!(target: "pds.device", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "pds.device", "{}", message),
            LogLevel::Error => tracing::error!(target: "pds.device", "{}", message),
        }
    }
}

/// 内存日志汇（用于测试与占位）。
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录日志的副本。
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// 指定级别的消息。
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .map(|(_, message)| message)
            .collect()
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_fmt().with_env_filter(filter).try_init();
}

/// 生成新的 session_id，串联同一 TCP 会话的日志。
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
