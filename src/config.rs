use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,
    /// Server host address
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Application environment
    pub environment: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,
    /// Run migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Warehouse location finished goods and materials default to.
    #[serde(default = "default_location_id")]
    pub default_location_id: i32,
    /// When true, insufficient stock blocks production start instead of
    /// proceeding with a warning.
    #[serde(default)]
    pub strict_reservations: bool,
    /// Machine-time rate used for the completion cost entry, per hour.
    #[serde(default = "default_work_center_rate")]
    pub work_center_hourly_rate: Decimal,
    /// Scrap factor applied to BOM lines generated from accepted quotes.
    #[serde(default = "default_scrap_factor")]
    pub default_scrap_factor: Decimal,
    /// Packaging item consumed per shipped unit, when configured.
    #[serde(default)]
    pub packaging_item_id: Option<i64>,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_location_id() -> i32 {
    1
}

fn default_work_center_rate() -> Decimal {
    Decimal::new(250, 2) // 2.50/hour
}

fn default_scrap_factor() -> Decimal {
    Decimal::new(5, 2) // 5%
}

/// Settings the transition handlers need, injected explicitly rather than
/// read from ambient global state.
#[derive(Debug, Clone)]
pub struct FulfillmentSettings {
    pub default_location_id: i32,
    pub strict_reservations: bool,
    pub work_center_hourly_rate: Decimal,
    pub default_scrap_factor: Decimal,
    pub packaging_item_id: Option<i64>,
}

impl AppConfig {
    pub fn fulfillment_settings(&self) -> FulfillmentSettings {
        FulfillmentSettings {
            default_location_id: self.default_location_id,
            strict_reservations: self.strict_reservations,
            work_center_hourly_rate: self.work_center_hourly_rate,
            default_scrap_factor: self.default_scrap_factor,
            packaging_item_id: self.packaging_item_id,
        }
    }
}

impl FulfillmentSettings {
    /// Defaults used by tests and ad-hoc tooling.
    pub fn for_tests() -> Self {
        Self {
            default_location_id: 1,
            strict_reservations: false,
            work_center_hourly_rate: default_work_center_rate(),
            default_scrap_factor: Decimal::ZERO,
            packaging_item_id: None,
        }
    }
}

/// Loads configuration from `config/{default,<env>}.toml` plus
/// `APP__`-prefixed environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = std::env::var("RUN_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    Config::builder()
        .set_default("database_url", "sqlite://printforge.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8080_i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", "info")?
        .set_default("log_json", false)?
        .set_default("auto_migrate", true)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

/// Initializes the tracing subscriber; honors RUST_LOG when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("printforge_api={},tower_http=debug", level);
    let directive = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(directive).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = FulfillmentSettings::for_tests();
        assert_eq!(settings.default_location_id, 1);
        assert!(!settings.strict_reservations);
        assert!(settings.work_center_hourly_rate > Decimal::ZERO);
    }
}
