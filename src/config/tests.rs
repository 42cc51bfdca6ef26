use serial_test::serial;

use super::settings::Settings;
use super::load_config;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.network.device_filter, "+");
    assert_eq!(settings.broker.port, 1883);
    assert_eq!(settings.broker.keepalive_secs, 60);
    assert_eq!(settings.log.level, "info");
}

#[test]
#[serial]
fn test_load_config_from_environment() {
    temp_env::with_vars(
        [
            ("NETWORK__ID", Some("lora-fing")),
            ("NETWORK__ACCESS_KEY", Some("test-key")),
            ("BROKER__HOST", Some("us-west.thethings.network")),
        ],
        || {
            let settings = load_config().expect("config should load");
            assert_eq!(settings.network.id, "lora-fing");
            assert_eq!(settings.network.access_key, "test-key");
            assert_eq!(settings.network.device_filter, "+");
            assert_eq!(settings.broker.host, "us-west.thethings.network");
            assert_eq!(settings.broker.port, 1883);
            assert_eq!(settings.broker.keepalive_secs, 60);
        },
    );
}

#[test]
#[serial]
fn test_environment_overrides_defaults() {
    temp_env::with_vars(
        [
            ("NETWORK__ID", Some("lora-fing")),
            ("NETWORK__ACCESS_KEY", Some("test-key")),
            ("NETWORK__DEVICE_FILTER", Some("sensor1")),
            ("BROKER__HOST", Some("localhost")),
            ("BROKER__PORT", Some("8883")),
            ("BROKER__KEEPALIVE_SECS", Some("30")),
            ("LOG__LEVEL", Some("debug")),
        ],
        || {
            let settings = load_config().expect("config should load");
            assert_eq!(settings.network.device_filter, "sensor1");
            assert_eq!(settings.broker.port, 8883);
            assert_eq!(settings.broker.keepalive_secs, 30);
            assert_eq!(settings.log.level, "debug");
        },
    );
}

#[test]
#[serial]
fn test_missing_access_key_fails() {
    temp_env::with_vars(
        [
            ("NETWORK__ID", Some("lora-fing")),
            ("NETWORK__ACCESS_KEY", None::<&str>),
            ("BROKER__HOST", Some("localhost")),
        ],
        || {
            assert!(load_config().is_err());
        },
    );
}

#[test]
#[serial]
fn test_empty_network_id_fails() {
    temp_env::with_vars(
        [
            ("NETWORK__ID", Some("")),
            ("NETWORK__ACCESS_KEY", Some("test-key")),
            ("BROKER__HOST", Some("localhost")),
        ],
        || {
            assert!(load_config().is_err());
        },
    );
}
