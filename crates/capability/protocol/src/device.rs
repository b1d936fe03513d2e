//! 单台设备的接收侧：分帧 → 解析 → 状态。

use crate::error::ProtocolError;
use crate::framer::LineFramer;
use crate::interpreter::{DeviceFault, ResponseInterpreter};
use domain::{DeviceState, OptionMap, StateValue, VisualOverride};
use pds_feedback::{FeedbackError, FeedbackKind, evaluate_feedback};
use pds_telemetry::{LogLevel, LogSink};
use std::sync::Arc;

/// 一块字节处理后的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceUpdate {
    /// 需要写回设备的命令，按行顺序
    pub replies: Vec<&'static str>,
    /// 需要重算的反馈（整块内去重）
    pub invalidated: Vec<FeedbackKind>,
    pub faults: Vec<DeviceFault>,
    /// 本块完成的行数
    pub lines: usize,
}

impl DeviceUpdate {
    fn invalidate(&mut self, kind: FeedbackKind) {
        if !self.invalidated.contains(&kind) {
            self.invalidated.push(kind);
        }
    }
}

pub struct PdsDevice {
    framer: LineFramer,
    interpreter: ResponseInterpreter,
    state: DeviceState,
    log: Arc<dyn LogSink>,
}

impl PdsDevice {
    pub fn new(
        label: impl Into<String>,
        max_line_len: usize,
        log: Arc<dyn LogSink>,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            framer: LineFramer::new(max_line_len),
            interpreter: ResponseInterpreter::new(label, log.clone())?,
            state: DeviceState::new(),
            log,
        })
    }

    /// 处理一块收到的字节；超长行记一条警告后跳过。
    pub fn receive(&mut self, chunk: &[u8]) -> DeviceUpdate {
        self.framer.push(chunk);
        let mut update = DeviceUpdate::default();
        loop {
            match self.framer.next_line() {
                Ok(Some(line)) => {
                    update.lines += 1;
                    let effects = self.interpreter.interpret(&line, &mut self.state);
                    update.replies.extend(effects.replies);
                    for kind in effects.invalidated {
                        update.invalidate(kind);
                    }
                    update.faults.extend(effects.fault);
                }
                Ok(None) => break,
                Err(err) => {
                    self.log
                        .log(LogLevel::Warn, &format!("Discarding device data: {err}"));
                }
            }
        }
        update
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn get_state(&self, key: &str) -> Option<StateValue> {
        self.state.get_by_name(key)
    }

    pub fn evaluate_feedback(
        &self,
        name: &str,
        options: &OptionMap,
    ) -> Result<Option<VisualOverride>, FeedbackError> {
        evaluate_feedback(name, options, &self.state)
    }

    pub fn firmware_version(&self) -> &str {
        self.interpreter.firmware_version()
    }

    /// 会话结束：清空状态、缓冲与固件版本
    pub fn reset(&mut self) {
        self.framer.clear();
        self.state.clear();
        self.interpreter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::HANDSHAKE_REPLY;
    use domain::StateKey;
    use pds_telemetry::MemoryLogSink;

    fn device(max_line_len: usize) -> (PdsDevice, Arc<MemoryLogSink>) {
        let log = Arc::new(MemoryLogSink::new());
        let device = PdsDevice::new("studio", max_line_len, log.clone()).expect("device");
        (device, log)
    }

    #[test]
    fn invalidations_are_deduplicated_per_chunk() {
        let (mut device, _) = device(1024);
        let update = device.receive(b"PREVIEW -i2\rPREVIEW -i3\rTAKE -e 0\r");
        assert_eq!(update.lines, 3);
        assert_eq!(
            update.invalidated,
            vec![FeedbackKind::PreviewBg, FeedbackKind::ProgramBg]
        );
        assert_eq!(device.state().get_int(StateKey::ProgramBg), Some(3));
        assert_eq!(device.state().get(StateKey::PreviewBg), None);
    }

    #[test]
    fn partial_lines_wait_for_delimiter() {
        let (mut device, _) = device(1024);
        assert_eq!(device.receive(b"ShellApp waiting"), DeviceUpdate::default());
        let update = device.receive(b" for input\r");
        assert_eq!(update.replies, vec![HANDSHAKE_REPLY]);
    }

    #[test]
    fn overflow_is_logged_and_stream_recovers() {
        let (mut device, log) = device(16);
        device.receive(b"XXXXXXXXXXXXXXXXXXXXXXXX");
        assert_eq!(log.messages(LogLevel::Warn).len(), 1);

        let update = device.receive(b"XXXX\rPROGRAM -i 4\r");
        assert_eq!(update.invalidated, vec![FeedbackKind::ProgramBg]);
        assert_eq!(device.get_state("program_bg"), Some(StateValue::Int(4)));
    }

    #[test]
    fn reset_forgets_everything() {
        let (mut device, _) = device(1024);
        device.receive(b"VER 2.1\rLOGOSEL -l 2\rPREV");
        device.reset();
        assert!(device.state().is_empty());
        assert_eq!(device.firmware_version(), "0");
        assert_eq!(device.receive(b"IEW -i1\r").lines, 1);
        assert!(device.state().is_empty());
    }
}
