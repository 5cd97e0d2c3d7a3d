use std::{fmt::Display, str::FromStr};

use shuttle_runtime::SecretStore;
use tracing::{info, warn};

const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Value for `Access-Control-Allow-Origin`, if the origin may be served.
    pub fn header_value(&self, origin: Option<&str>) -> Option<String> {
        match (self, origin) {
            (AllowedOrigins::Any, _) => Some("*".to_string()),
            (AllowedOrigins::List(list), Some(origin)) if list.iter().any(|o| o == origin) => {
                Some(origin.to_string())
            }
            _ => None,
        }
    }
}

impl FromStr for AllowedOrigins {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let origins: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() {
            return Err("no origins given".into());
        }
        if origins.iter().any(|o| o == "*") {
            return Ok(AllowedOrigins::Any);
        }
        Ok(AllowedOrigins::List(origins))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub allowed_origins: AllowedOrigins,
    pub rate_limit_max: u32,
    pub rate_limit_window_minutes: i64,
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            allowed_origins: AllowedOrigins::Any,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window_minutes: DEFAULT_RATE_LIMIT_WINDOW_MINUTES,
            seed_demo_data: true,
        }
    }
}

impl Config {
    pub fn from_secrets(secrets: &SecretStore) -> Self {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            environment: try_load(&lookup, "ENVIRONMENT", defaults.environment),
            allowed_origins: try_load(&lookup, "ALLOWED_ORIGINS", defaults.allowed_origins),
            rate_limit_max: try_load(&lookup, "RATE_LIMIT_MAX", defaults.rate_limit_max),
            rate_limit_window_minutes: try_load(
                &lookup,
                "RATE_LIMIT_WINDOW_MINUTES",
                defaults.rate_limit_window_minutes,
            ),
            seed_demo_data: try_load(&lookup, "SEED_DEMO_DATA", defaults.seed_demo_data),
        }
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default:?}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default:?}");
        default
    })
}
