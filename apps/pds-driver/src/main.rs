//! PDS 切换台驱动进程：连接设备、维护状态，并从标准输入接收动作。
//!
//! 标准输入每行一个动作，例如 `ISEL i=3`、`TAKE`、`PIPPOS p=1 hpos=-10 vpos=20`。

use domain::{OptionMap, OptionValue};
use pds_config::DriverConfig;
use pds_feedback::FeedbackKind;
use pds_protocol::{ConnectionStatus, HostEvents, PdsInstance};
use pds_telemetry::{TracingLogSink, init_tracing};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// 把会话回调写入日志的宿主
struct LoggingHost;

impl HostEvents for LoggingHost {
    fn status_changed(&self, status: &ConnectionStatus) {
        info!(target: "pds.driver", status = %status, "connection_status");
    }

    fn check_feedbacks(&self, kinds: &[FeedbackKind]) {
        let kinds: Vec<&str> = kinds.iter().map(|kind| kind.id()).collect();
        info!(target: "pds.driver", feedbacks = ?kinds, "feedbacks_invalidated");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在）
    dotenvy::dotenv().ok();
    let config = DriverConfig::from_env()?;
    init_tracing();

    let mut instance = PdsInstance::new(config, Arc::new(TracingLogSink), Arc::new(LoggingHost));
    instance.init()?;
    info!(
        target: "pds.driver",
        label = %instance.config().label,
        inputs = instance.input_choices().len(),
        actions = instance.action_definitions().len(),
        "driver_started"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) => {
                    let Some((name, options)) = parse_action_line(&line) else {
                        continue;
                    };
                    if let Err(err) = instance.execute(&name, &options) {
                        warn!(target: "pds.driver", action = %name, error = %err, "action_rejected");
                    }
                }
                None => {
                    // 标准输入关闭后只等待退出信号
                    tokio::signal::ctrl_c().await?;
                    break;
                }
            },
        }
    }

    instance.destroy().await;
    Ok(())
}

/// `NAME key=value ...`；数字值按整数传递，空行返回 `None`。
fn parse_action_line(line: &str) -> Option<(String, OptionMap)> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?.to_ascii_uppercase();
    let options = tokens
        .filter_map(|token| token.split_once('='))
        .map(|(key, value)| {
            let value = match value.parse::<i64>() {
                Ok(number) => OptionValue::Int(number),
                Err(_) => OptionValue::Text(value.to_string()),
            };
            (key.to_string(), value)
        })
        .collect();
    Some((name, options))
}
