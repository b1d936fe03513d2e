//! 协议错误类型定义

/// 协议会话错误
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 连接错误
    #[error("connection error: {0}")]
    Connection(String),

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 超时错误
    #[error("timeout: {0}")]
    Timeout(String),

    /// 响应形状正则编译失败
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
