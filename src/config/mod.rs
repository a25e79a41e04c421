use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub venue: VenueConfig,
    pub checkout: CheckoutConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub sessions: SessionConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

// Схема зала и сбор
#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    /// Файл со схемой зала; без него используется встроенная схема.
    pub layout_file: Option<String>,
    pub service_fee: f64,
    pub currency: String,
}

// Настройки внешнего платежного шлюза, которому передается заказ
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    pub merchant_id: String,
    pub merchant_password: String,
    pub gateway_url: String,
    pub success_url: String,
    pub fail_url: String,
    pub timeout_seconds: u64,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Время жизни сессий выбора мест
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub idle_ttl_seconds: i64,
    pub sweep_interval_seconds: u64,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: FromStr>(name: &'static str, default: &str, expected: &'static str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value.parse().map_err(|_| ConfigError::Invalid { name, expected, value })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parsed_or("PORT", "8000", "port number")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "seat_selection=debug,tower_http=debug"),
                log_format: parsed_or("LOG_FORMAT", "pretty", "log format (pretty|json)")?,
            },
            venue: VenueConfig {
                layout_file: env::var("VENUE_FILE").ok().filter(|v| !v.is_empty()),
                service_fee: parsed_or("SERVICE_FEE", "12.00", "number")?,
                currency: var_or("CURRENCY", "KZT"),
            },
            checkout: CheckoutConfig {
                merchant_id: var_or("MERCHANT_ID", "seat-selection"),
                merchant_password: var_or("MERCHANT_PASSWORD", ""),
                gateway_url: var_or("PAYMENT_GATEWAY_URL", "https://gateway.hackload.com/api/v1"),
                success_url: var_or("PAYMENT_SUCCESS_URL", "https://your-domain.com/payment/success"),
                fail_url: var_or("PAYMENT_FAIL_URL", "https://your-domain.com/payment/fail"),
                timeout_seconds: parsed_or("PAYMENT_TIMEOUT_SECONDS", "30", "number")?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parsed_or("CIRCUIT_BREAKER_FAILURE_THRESHOLD", "5", "number")?,
                timeout_seconds: parsed_or("CIRCUIT_BREAKER_TIMEOUT_SECONDS", "60", "number")?,
            },
            sessions: SessionConfig {
                idle_ttl_seconds: parsed_or("SESSION_IDLE_TTL_SECONDS", "1800", "number")?,
                sweep_interval_seconds: parsed_or("SESSION_SWEEP_INTERVAL_SECONDS", "300", "number")?,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "seat_selection=debug".to_string(),
                log_format: LogFormat::Pretty,
            },
            venue: VenueConfig {
                layout_file: None,
                service_fee: crate::services::pricing::DEFAULT_SERVICE_FEE,
                currency: "KZT".to_string(),
            },
            checkout: CheckoutConfig {
                merchant_id: "seat-selection".to_string(),
                merchant_password: String::new(),
                gateway_url: "http://127.0.0.1:9000".to_string(),
                success_url: "http://127.0.0.1:8000/payment/success".to_string(),
                fail_url: "http://127.0.0.1:8000/payment/fail".to_string(),
                timeout_seconds: 30,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 5,
                timeout_seconds: 60,
            },
            sessions: SessionConfig {
                idle_ttl_seconds: 1800,
                sweep_interval_seconds: 300,
            },
        }
    }
}
