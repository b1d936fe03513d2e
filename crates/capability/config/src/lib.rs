//! 驱动运行配置加载。

use domain::{DeviceVariant, OptionField};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// 设备固定 TCP 端口。
pub const DEVICE_PORT: u16 = 3000;

/// 状态轮询周期（固定 1 秒）。
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// 宿主配置表单中的默认设备地址。
pub const DEFAULT_HOST: &str = "192.168.0.10";

const IPV4_PATTERN: &str =
    r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("config parse error: {0}")]
    Parse(String),
}

/// 单个 PDS 实例的运行配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// 设备地址；为空时不建立连接
    #[serde(default)]
    pub host: Option<String>,
    /// 设备型号
    #[serde(default)]
    pub variant: DeviceVariant,
    /// 实例名称，嵌入设备错误日志
    #[serde(default = "default_label")]
    pub label: String,
    /// 连接超时（毫秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// 单行最大缓冲长度（字节）
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

fn default_label() -> String {
    "pds".to_string()
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_max_line_len() -> usize {
    1024
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            host: None,
            variant: DeviceVariant::default(),
            label: default_label(),
            connect_timeout_ms: default_connect_timeout(),
            max_line_len: default_max_line_len(),
        }
    }
}

impl DriverConfig {
    pub fn new(host: impl Into<String>, variant: DeviceVariant) -> Self {
        Self {
            host: Some(host.into()),
            variant,
            ..Self::default()
        }
    }

    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = read_optional("PDS_HOST");
        let variant = match read_optional("PDS_VARIANT") {
            Some(value) => value
                .parse::<DeviceVariant>()
                .map_err(|_| ConfigError::Invalid("PDS_VARIANT".to_string(), value))?,
            None => DeviceVariant::default(),
        };
        let label = read_optional("PDS_LABEL").unwrap_or_else(default_label);
        let connect_timeout_ms =
            read_u64_with_default("PDS_CONNECT_TIMEOUT_MS", default_connect_timeout())?;
        let max_line_len = read_usize_with_default("PDS_MAX_LINE_LEN", default_max_line_len())?;

        Ok(Self {
            host,
            variant,
            label,
            connect_timeout_ms,
            max_line_len,
        }
        .sanitized())
    }

    /// 从宿主下发的 JSON 配置对象解析。
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DriverConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config.sanitized())
    }

    /// 设备地址（`host:3000`）；未配置 host 时为 `None`。
    pub fn address(&self) -> Option<String> {
        self.host
            .as_deref()
            .map(|host| format!("{}:{}", host, DEVICE_PORT))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    fn sanitized(mut self) -> Self {
        self.host = self
            .host
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty());
        if self.max_line_len == 0 {
            self.max_line_len = default_max_line_len();
        }
        self
    }
}

/// 宿主配置表单：设备地址与型号。
pub fn config_fields() -> Vec<OptionField> {
    vec![
        OptionField::text_input("host", "Target IP", Some(DEFAULT_HOST), Some(IPV4_PATTERN)),
        OptionField::dropdown(
            "variant",
            "Variant",
            DeviceVariant::choices(),
            i64::from(DeviceVariant::default().id()),
        ),
    ]
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
