mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::Settings;
pub use settings::{BrokerSettings, LogSettings, NetworkSettings};
pub use settings::{DEFAULT_DEVICE_FILTER, DEFAULT_KEEPALIVE_SECS, DEFAULT_PORT};

/// Loads the configuration from the default file and environment variables.
/// Merges the configuration with default values; required keys (network id,
/// access key, broker host) fail loading when absent so credentials are
/// never baked into the binary.
///
/// Environment variables use a double-underscore separator, e.g.
/// `NETWORK__ACCESS_KEY` maps to `network.access_key`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("__"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    let network = partial
        .network
        .ok_or_else(|| ConfigError::Message("missing [network] settings".to_string()))?;
    let broker = partial
        .broker
        .ok_or_else(|| ConfigError::Message("missing [broker] settings".to_string()))?;

    let id = network
        .id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Message("network.id is required".to_string()))?;
    let access_key = network
        .access_key
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Message("network.access_key is required".to_string()))?;
    let host = broker
        .host
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::Message("broker.host is required".to_string()))?;

    Ok(Settings {
        network: NetworkSettings {
            id,
            access_key,
            device_filter: network
                .device_filter
                .filter(|v| !v.is_empty())
                .unwrap_or(default.network.device_filter),
        },
        broker: BrokerSettings {
            host,
            port: broker.port.unwrap_or(default.broker.port),
            keepalive_secs: broker
                .keepalive_secs
                .unwrap_or(default.broker.keepalive_secs),
        },
        log: LogSettings {
            level: partial
                .log
                .and_then(|l| l.level)
                .unwrap_or(default.log.level),
        },
    })
}

#[cfg(test)]
mod tests;
