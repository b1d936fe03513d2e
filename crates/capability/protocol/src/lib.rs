//! # 协议会话能力模块
//!
//! 与 PDS 切换台之间的 TCP 行协议（端口 3000，`\r` 分行）。
//!
//! ## 架构设计
//!
//! ```text
//! PdsInstance (init / update_config / destroy)
//!       │
//!       ▼
//! Session (tokio 任务，独占 socket)
//!       │
//!       ├── 读：LineFramer → ResponseInterpreter → DeviceState
//!       │                                   │
//!       │                                   ▼
//!       │                         HostEvents::check_feedbacks
//!       │
//!       ├── 定时：每秒写入 PREVIEW / PROGRAM / LOGOSEL 查询
//!       │
//!       └── 写：SessionHandle::execute → pds_control::encode_action
//! ```
//!
//! ## 会话示例
//!
//! ```text
//! <- ShellApp waiting for input
//! -> \rVER -?\rPREVIEW -?\rPROGRAM -?\rLOGOSEL -?\r
//! <- VER 3.12.0
//! <- PREVIEW -i2
//! <- PROGRAM -i 5
//! -> TAKE\r
//! <- TAKE -e 0          (preview/program 互换)
//! ```

mod device;
mod error;
mod framer;
mod instance;
mod interpreter;
mod session;

pub use device::{DeviceUpdate, PdsDevice};
pub use error::ProtocolError;
pub use framer::{FrameError, LINE_DELIMITER, LineFramer};
pub use instance::PdsInstance;
pub use interpreter::{
    DeviceErrorKind, DeviceFault, HANDSHAKE_REPLY, LineEffects, LineShape, REFRESH_REQUEST,
    ResponseInterpreter,
};
pub use session::{
    ConnectionStatus, DeviceSnapshot, HostEvents, NoopHost, Session, SessionHandle,
};
