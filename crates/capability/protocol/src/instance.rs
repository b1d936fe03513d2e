//! 宿主实例生命周期：init / update_config / destroy。

use crate::error::ProtocolError;
use crate::session::{HostEvents, Session, SessionHandle};
use domain::{Choice, OptionMap};
use pds_config::DriverConfig;
use pds_control::{ActionDefinition, ControlError, action_definitions, encode_action};
use pds_feedback::{FeedbackDefinition, feedback_definitions};
use pds_telemetry::LogSink;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 一个已配置的 PDS 实例
pub struct PdsInstance {
    config: DriverConfig,
    log: Arc<dyn LogSink>,
    host: Arc<dyn HostEvents>,
    inputs: Vec<Choice>,
    actions: Vec<ActionDefinition>,
    feedbacks: Vec<FeedbackDefinition>,
    session: Option<(SessionHandle, JoinHandle<()>)>,
}

impl PdsInstance {
    /// 按型号构建输入选项与动作/反馈注册表；不建立连接。
    pub fn new(config: DriverConfig, log: Arc<dyn LogSink>, host: Arc<dyn HostEvents>) -> Self {
        let mut instance = Self {
            config,
            log,
            host,
            inputs: Vec::new(),
            actions: Vec::new(),
            feedbacks: Vec::new(),
            session: None,
        };
        instance.rebuild_definitions();
        instance
    }

    fn rebuild_definitions(&mut self) {
        let variant = self.config.variant;
        self.inputs = variant.input_choices();
        self.actions = action_definitions(variant);
        self.feedbacks = feedback_definitions(variant);
    }

    /// 启动会话；已有会话时不重复启动。需在 tokio 运行时内调用。
    pub fn init(&mut self) -> Result<(), ProtocolError> {
        if self.session.is_some() {
            warn!(target: "pds.session", label = %self.config.label, "instance_already_initialized");
            return Ok(());
        }
        info!(
            target: "pds.session",
            label = %self.config.label,
            variant = %self.config.variant.label(),
            "instance_init"
        );
        let session = Session::spawn(self.config.clone(), self.log.clone(), self.host.clone())?;
        self.session = Some(session);
        Ok(())
    }

    /// 关闭会话并等待会话任务退出。
    pub async fn destroy(&mut self) {
        let Some((handle, task)) = self.session.take() else {
            return;
        };
        handle.shutdown();
        if let Err(err) = task.await {
            warn!(target: "pds.session", error = %err, "session_task_join_failed");
        }
        info!(target: "pds.session", label = %self.config.label, "instance_destroyed");
    }

    /// 新配置生效：销毁旧会话、按新型号重建注册表、重新启动。
    pub async fn update_config(&mut self, config: DriverConfig) -> Result<(), ProtocolError> {
        self.destroy().await;
        self.config = config;
        self.rebuild_definitions();
        self.init()
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn handle(&self) -> Option<&SessionHandle> {
        self.session.as_ref().map(|(handle, _)| handle)
    }

    pub fn input_choices(&self) -> &[Choice] {
        &self.inputs
    }

    pub fn action_definitions(&self) -> &[ActionDefinition] {
        &self.actions
    }

    pub fn feedback_definitions(&self) -> &[FeedbackDefinition] {
        &self.feedbacks
    }

    /// 执行动作；未初始化时只做编码校验。
    pub fn execute(&self, name: &str, options: &OptionMap) -> Result<(), ControlError> {
        match self.handle() {
            Some(handle) => handle.execute(name, options),
            None => {
                encode_action(name, options)?;
                debug!(target: "pds.session", action = %name, "action_dropped_no_session");
                Ok(())
            }
        }
    }
}
