use domain::{DeviceVariant, FieldKind, OptionValue};
use pds_config::{ConfigError, DEFAULT_HOST, DriverConfig, config_fields};

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("PDS_HOST", "192.168.0.42");
        std::env::set_var("PDS_VARIANT", "901");
        std::env::set_var("PDS_LABEL", "studio-a");
        std::env::set_var("PDS_CONNECT_TIMEOUT_MS", "2500");
    }

    let config = DriverConfig::from_env().expect("config");
    assert_eq!(config.host.as_deref(), Some("192.168.0.42"));
    assert_eq!(config.variant, DeviceVariant::Pds901);
    assert_eq!(config.label, "studio-a");
    assert_eq!(config.connect_timeout_ms, 2500);
    assert_eq!(config.max_line_len, 1024);
}

#[test]
fn parse_host_config_json() {
    let json = r#"{"host": "192.168.0.10", "variant": 3, "label": "pds-main"}"#;
    let config = DriverConfig::from_json(json).expect("config");
    assert_eq!(config.address().as_deref(), Some("192.168.0.10:3000"));
    assert_eq!(config.variant, DeviceVariant::Pds902);
    assert_eq!(config.label, "pds-main");
    assert_eq!(config.connect_timeout_ms, 5000);
}

#[test]
fn blank_host_means_no_connection() {
    let config = DriverConfig::from_json(r#"{"host": "  "}"#).expect("config");
    assert!(config.host.is_none());
    assert_eq!(config.variant, DeviceVariant::Pds701);
}

#[test]
fn unknown_variant_is_rejected() {
    let err = DriverConfig::from_json(r#"{"host": "pds", "variant": 9}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn config_form_defaults_match_driver_defaults() {
    let fields = config_fields();
    assert_eq!(fields.len(), 2);

    assert_eq!(fields[0].id, "host");
    assert_eq!(
        fields[0].default_value(),
        Some(OptionValue::Text(DEFAULT_HOST.to_string()))
    );

    assert_eq!(fields[1].id, "variant");
    let Some(OptionValue::Int(default_variant)) = fields[1].default_value() else {
        panic!("variant default must be an id");
    };
    let json = format!(r#"{{"variant": {default_variant}}}"#);
    let config = DriverConfig::from_json(&json).expect("config");
    assert_eq!(config.variant, DeviceVariant::default());

    let FieldKind::Dropdown { choices, .. } = &fields[1].kind else {
        panic!("variant must be a dropdown");
    };
    let labels: Vec<&str> = choices.iter().map(|choice| choice.label.as_str()).collect();
    assert_eq!(labels, vec!["PDS-701", "PDS-901", "PDS-902"]);
}
