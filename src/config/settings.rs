use serde::Deserialize;

/// Default broker port.
pub const DEFAULT_PORT: u16 = 1883;

/// Default keepalive: maximum idle interval in seconds before the client
/// pings the broker to keep the connection alive.
pub const DEFAULT_KEEPALIVE_SECS: u64 = 60;

/// Default device filter: the broker wildcard matching every device in the
/// network.
pub const DEFAULT_DEVICE_FILTER: &str = "+";

/// Top-level configuration settings for the bridge.
///
/// Includes settings for the network identity, the broker connection and
/// logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub network: NetworkSettings,
    pub broker: BrokerSettings,
    pub log: LogSettings,
}

/// Identity of the network application this bridge serves.
///
/// The network id doubles as the broker username and the leading segment of
/// every topic; the access key is the broker password and must come from the
/// environment or a secret store, never from source.
#[derive(Debug, Deserialize, Clone)]
pub struct NetworkSettings {
    pub id: String,
    pub access_key: String,
    pub device_filter: String,
}

/// Configuration settings for the broker connection.
///
/// Defines the host and port the bridge connects to and the keepalive
/// contract.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub keepalive_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled
/// using defaults; missing required values fail loading.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub network: Option<PartialNetworkSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub log: Option<PartialLogSettings>,
}

/// Partial network settings.
#[derive(Debug, Deserialize)]
pub struct PartialNetworkSettings {
    pub id: Option<String>,
    pub access_key: Option<String>,
    pub device_filter: Option<String>,
}

/// Partial broker settings.
#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub keepalive_secs: Option<u64>,
}

/// Partial logging settings.
#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Required fields (network id, access key, broker host) default to empty
/// strings here; `load_config` rejects them when they are not supplied.
impl Default for Settings {
    fn default() -> Self {
        Self {
            network: NetworkSettings {
                id: String::new(),
                access_key: String::new(),
                device_filter: DEFAULT_DEVICE_FILTER.to_string(),
            },
            broker: BrokerSettings {
                host: String::new(),
                port: DEFAULT_PORT,
                keepalive_secs: DEFAULT_KEEPALIVE_SECS,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
