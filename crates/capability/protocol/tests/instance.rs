use domain::{DeviceVariant, FieldKind, OptionMap};
use pds_config::DriverConfig;
use pds_control::{ActionKind, ControlError};
use pds_protocol::{ConnectionStatus, NoopHost, PdsInstance};
use pds_telemetry::{LogLevel, MemoryLogSink};
use std::sync::Arc;

fn instance(variant: DeviceVariant) -> (PdsInstance, Arc<MemoryLogSink>) {
    let log = Arc::new(MemoryLogSink::new());
    let config = DriverConfig {
        variant,
        ..DriverConfig::default()
    };
    let instance = PdsInstance::new(config, log.clone(), Arc::new(NoopHost));
    (instance, log)
}

fn select_input_ids(instance: &PdsInstance) -> Vec<i64> {
    let isel = instance
        .action_definitions()
        .iter()
        .find(|definition| definition.kind == ActionKind::SelectInput)
        .expect("ISEL");
    let FieldKind::Dropdown { choices, .. } = &isel.options[0].kind else {
        panic!("input must be a dropdown");
    };
    choices.iter().map(|choice| choice.id).collect()
}

fn input_ids(instance: &PdsInstance) -> Vec<i64> {
    instance.input_choices().iter().map(|choice| choice.id).collect()
}

#[tokio::test]
async fn update_config_rebuilds_registries_for_new_variant() {
    let (mut instance, _) = instance(DeviceVariant::Pds701);
    instance.init().expect("init");
    assert_eq!(input_ids(&instance), vec![1, 2, 3, 4, 5, 6, 9, 10]);
    assert_eq!(select_input_ids(&instance), input_ids(&instance));

    let config = DriverConfig {
        variant: DeviceVariant::Pds901,
        ..DriverConfig::default()
    };
    instance.update_config(config).await.expect("update");

    assert_eq!(instance.config().variant, DeviceVariant::Pds901);
    assert_eq!(input_ids(&instance), vec![1, 2, 3, 4, 5, 6, 7, 8, 10]);
    assert_eq!(select_input_ids(&instance), input_ids(&instance));
    assert!(instance.handle().is_some());

    instance.destroy().await;
    assert!(instance.handle().is_none());
}

#[tokio::test]
async fn init_twice_keeps_a_single_session() {
    let (mut instance, log) = instance(DeviceVariant::Pds701);
    instance.init().expect("init");
    instance.init().expect("second init");

    let handle = instance.handle().cloned().expect("handle");
    instance.destroy().await;

    // 未配置 host 的会话各记一条警告
    assert_eq!(log.messages(LogLevel::Warn).len(), 1);
    assert_eq!(handle.status(), ConnectionStatus::Disconnected);

    instance.init().expect("init after destroy");
    instance.destroy().await;
    assert_eq!(log.messages(LogLevel::Warn).len(), 2);
}

#[tokio::test]
async fn execute_without_session_still_encodes() {
    let (instance, _) = instance(DeviceVariant::Pds902);
    assert!(instance.handle().is_none());
    assert_eq!(
        instance.execute("NOPE", &OptionMap::new()),
        Err(ControlError::UnknownAction("NOPE".to_string()))
    );
    assert_eq!(instance.execute("TAKE", &OptionMap::new()), Ok(()));
    assert_eq!(
        instance.execute("PIPPOS", &OptionMap::new().with("p", 1_i64)),
        Err(ControlError::MissingOption {
            action: "PIPPOS",
            option: "hpos",
        })
    );
}

#[tokio::test]
async fn destroy_without_init_is_a_no_op() {
    let (mut instance, log) = instance(DeviceVariant::Pds701);
    instance.destroy().await;
    assert!(instance.handle().is_none());
    assert!(log.entries().is_empty());
}
