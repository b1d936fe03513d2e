//! TCP 会话
//!
//! 一个会话任务独占 socket、分帧器、设备状态与轮询定时器，
//! 通过 `tokio::select!` 串行处理三类事件：
//!
//! - socket 读到的字节 → 解析 → 状态更新 → 通知宿主
//! - 1 秒轮询 → 写入状态查询
//! - [`SessionHandle`] 下发的命令 → 写入 socket
//!
//! 宿主侧只持有 [`SessionHandle`]：动作经通道进入会话任务，
//! 状态与连接状态经 `watch` 通道读出。
//!
//! ```text
//! Disconnected ──▶ Connecting ──▶ Connected ──▶ Disconnected (对端关闭)
//!                      │              │
//!                      └──────────────┴──────▶ Error(msg)
//! ```

use crate::device::PdsDevice;
use crate::error::ProtocolError;
use crate::interpreter::REFRESH_REQUEST;
use domain::{DeviceState, OptionMap, StateValue, VisualOverride};
use pds_config::{DriverConfig, POLL_INTERVAL};
use pds_control::{ControlError, encode_action};
use pds_feedback::{FeedbackError, FeedbackKind, evaluate_feedback};
use pds_telemetry::{LogLevel, LogSink, new_session_id};
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tracing::{debug, info, warn};

const READ_BUFFER_SIZE: usize = 4096;

/// 连接状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => f.write_str("disconnected"),
            ConnectionStatus::Connecting => f.write_str("connecting"),
            ConnectionStatus::Connected => f.write_str("connected"),
            ConnectionStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// 宿主回调
///
/// 在会话任务内同步调用，实现方不应阻塞。
pub trait HostEvents: Send + Sync {
    fn status_changed(&self, _status: &ConnectionStatus) {}

    /// 给定反馈需要重算；调用时状态快照已经更新。
    fn check_feedbacks(&self, _kinds: &[FeedbackKind]) {}
}

/// 不关心回调的宿主
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl HostEvents for NoopHost {}

/// 会话对外发布的设备快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub state: DeviceState,
    pub firmware_version: String,
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self {
            state: DeviceState::new(),
            firmware_version: "0".to_string(),
        }
    }
}

#[derive(Debug)]
enum SessionCommand {
    Send(String),
    Shutdown,
}

/// 宿主侧句柄（可克隆）
///
/// 全部句柄被丢弃等同于 [`SessionHandle::shutdown`]。
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    status: watch::Receiver<ConnectionStatus>,
    snapshot: watch::Receiver<DeviceSnapshot>,
}

impl SessionHandle {
    /// 编码并下发动作。
    ///
    /// 编码失败返回错误；未连接时命令被丢弃（记 debug 日志），不排队。
    pub fn execute(&self, name: &str, options: &OptionMap) -> Result<(), ControlError> {
        let command = encode_action(name, options)?;
        if !self.is_connected() {
            debug!(target: "pds.session", action = %name, "action_dropped_not_connected");
            return Ok(());
        }
        if self.commands.send(SessionCommand::Send(command)).is_err() {
            debug!(target: "pds.session", action = %name, "action_dropped_session_closed");
        }
        Ok(())
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.status.borrow() == ConnectionStatus::Connected
    }

    pub fn state(&self) -> DeviceState {
        self.snapshot.borrow().state.clone()
    }

    /// 按字符串键读取状态；未知键返回 `None`。
    pub fn get_state(&self, key: &str) -> Option<StateValue> {
        self.snapshot.borrow().state.get_by_name(key)
    }

    pub fn evaluate_feedback(
        &self,
        name: &str,
        options: &OptionMap,
    ) -> Result<Option<VisualOverride>, FeedbackError> {
        evaluate_feedback(name, options, &self.snapshot.borrow().state)
    }

    pub fn firmware_version(&self) -> String {
        self.snapshot.borrow().firmware_version.clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<DeviceSnapshot> {
        self.snapshot.clone()
    }

    /// 请求会话结束；会话任务随后清空状态并回到 `Disconnected`。
    pub fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
    }
}

enum DriveEnd {
    Shutdown,
    Closed,
    Failed(String),
}

/// 会话任务
pub struct Session {
    config: DriverConfig,
    device: PdsDevice,
    log: Arc<dyn LogSink>,
    host: Arc<dyn HostEvents>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    status: watch::Sender<ConnectionStatus>,
    snapshot: watch::Sender<DeviceSnapshot>,
    session_id: String,
}

impl Session {
    pub fn new(
        config: DriverConfig,
        log: Arc<dyn LogSink>,
        host: Arc<dyn HostEvents>,
    ) -> Result<(Self, SessionHandle), ProtocolError> {
        let device = PdsDevice::new(config.label.clone(), config.max_line_len, log.clone())?;
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
        let (snapshot_tx, snapshot_rx) = watch::channel(DeviceSnapshot::default());

        let session = Self {
            config,
            device,
            log,
            host,
            commands: command_rx,
            status: status_tx,
            snapshot: snapshot_tx,
            session_id: new_session_id(),
        };
        let handle = SessionHandle {
            commands: command_tx,
            status: status_rx,
            snapshot: snapshot_rx,
        };
        Ok((session, handle))
    }

    /// 在当前 tokio 运行时上启动会话任务。
    pub fn spawn(
        config: DriverConfig,
        log: Arc<dyn LogSink>,
        host: Arc<dyn HostEvents>,
    ) -> Result<(SessionHandle, JoinHandle<()>), ProtocolError> {
        let (session, handle) = Self::new(config, log, host)?;
        Ok((handle, tokio::spawn(session.run())))
    }

    /// 连接 `host:3000` 并驱动会话直到结束。不做自动重连。
    pub async fn run(mut self) {
        let Some(address) = self.config.address() else {
            warn!(target: "pds.session", session_id = %self.session_id, "host_not_configured");
            self.log.log(
                LogLevel::Warn,
                &format!("No host configured for {}", self.config.label),
            );
            self.idle().await;
            self.teardown();
            return;
        };

        self.set_status(ConnectionStatus::Connecting);
        info!(
            target: "pds.session",
            session_id = %self.session_id,
            address = %address,
            "connecting"
        );

        let connected = match timeout(self.config.connect_timeout(), TcpStream::connect(&address)).await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(err)) => Err(ProtocolError::Connection(err.to_string())),
            Err(_) => Err(ProtocolError::Timeout(format!(
                "connect to {} timed out after {}ms",
                address, self.config.connect_timeout_ms
            ))),
        };

        match connected {
            Ok(stream) => self.run_on(stream).await,
            Err(err) => {
                self.fail(err.to_string());
                self.idle().await;
                self.teardown();
            }
        }
    }

    /// 在已建立的双向流上驱动会话（TCP 或内存流）。
    pub async fn run_on<S>(mut self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.set_status(ConnectionStatus::Connected);
        match self.drive(stream).await {
            DriveEnd::Shutdown => {}
            DriveEnd::Closed => {
                info!(target: "pds.session", session_id = %self.session_id, "remote_closed");
                self.set_status(ConnectionStatus::Disconnected);
                self.idle().await;
            }
            DriveEnd::Failed(message) => {
                self.fail(message);
                self.idle().await;
            }
        }
        self.teardown();
    }

    async fn drive<S>(&mut self, stream: S) -> DriveEnd
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (mut reader, mut writer) = tokio::io::split(stream);
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        let mut poll = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                read = reader.read(&mut buffer) => match read {
                    Ok(0) => return DriveEnd::Closed,
                    Ok(n) => {
                        let update = self.device.receive(&buffer[..n]);
                        // 先发布已提交的状态，再写回复
                        if update.lines > 0 {
                            self.publish();
                        }
                        if !update.invalidated.is_empty() {
                            self.host.check_feedbacks(&update.invalidated);
                        }
                        for reply in &update.replies {
                            if let Err(err) = write_command(&mut writer, reply, &self.session_id).await {
                                return DriveEnd::Failed(err.to_string());
                            }
                        }
                    }
                    Err(err) => return DriveEnd::Failed(err.to_string()),
                },
                _ = poll.tick() => {
                    if let Err(err) = write_command(&mut writer, REFRESH_REQUEST, &self.session_id).await {
                        return DriveEnd::Failed(err.to_string());
                    }
                }
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Send(command)) => {
                        if let Err(err) = write_command(&mut writer, &command, &self.session_id).await {
                            return DriveEnd::Failed(err.to_string());
                        }
                    }
                    Some(SessionCommand::Shutdown) | None => {
                        if let Err(err) = writer.shutdown().await {
                            debug!(target: "pds.session", error = %err, "socket_shutdown_failed");
                        }
                        return DriveEnd::Shutdown;
                    }
                },
            }
        }
    }

    /// 连接结束后等待关闭请求；期间到达的动作一律丢弃。
    async fn idle(&mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                SessionCommand::Send(command) => {
                    debug!(
                        target: "pds.session",
                        command = %command.escape_debug(),
                        "action_dropped_not_connected"
                    );
                }
                SessionCommand::Shutdown => break,
            }
        }
    }

    fn fail(&mut self, message: String) {
        warn!(target: "pds.session", session_id = %self.session_id, error = %message, "session_failed");
        self.log
            .log(LogLevel::Error, &format!("Network error: {}", message));
        self.set_status(ConnectionStatus::Error(message));
    }

    fn teardown(&mut self) {
        self.device.reset();
        self.publish();
        self.set_status(ConnectionStatus::Disconnected);
        info!(target: "pds.session", session_id = %self.session_id, "session_closed");
    }

    fn publish(&self) {
        self.snapshot.send_replace(DeviceSnapshot {
            state: self.device.state().clone(),
            firmware_version: self.device.firmware_version().to_string(),
        });
    }

    fn set_status(&self, status: ConnectionStatus) {
        if *self.status.borrow() == status {
            return;
        }
        info!(
            target: "pds.session",
            session_id = %self.session_id,
            status = %status,
            "status_changed"
        );
        self.status.send_replace(status.clone());
        self.host.status_changed(&status);
    }
}

async fn write_command<S>(
    writer: &mut WriteHalf<S>,
    command: &str,
    session_id: &str,
) -> Result<(), ProtocolError>
where
    S: AsyncWrite,
{
    writer.write_all(command.as_bytes()).await?;
    writer.flush().await?;
    debug!(
        target: "pds.session",
        session_id = %session_id,
        command = %command.escape_debug(),
        "command_sent"
    );
    Ok(())
}
