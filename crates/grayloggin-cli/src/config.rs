use grayloggin_egress::{AuthContext, HttpClientConfig, RetryPolicy, SearchConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub graylog: GraylogSettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraylogSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_sleep_ms")]
    pub initial_sleep_ms: u64,

    #[serde(default = "default_jitter_step_ms")]
    pub jitter_step_ms: u64,

    #[serde(default = "default_jitter_steps")]
    pub jitter_steps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for GraylogSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: None,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_sleep_ms: default_initial_sleep_ms(),
            jitter_step_ms: default_jitter_step_ms(),
            jitter_steps: default_jitter_steps(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl CliConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("GRAYLOGGIN_URL") {
            self.graylog.url = val;
        }

        if let Ok(val) = std::env::var("GRAYLOGGIN_USERNAME") {
            self.graylog.username = val;
        }

        if let Ok(val) = std::env::var("GRAYLOGGIN_PASSWORD") {
            self.graylog.password = val;
        }

        if let Ok(val) = std::env::var("GRAYLOGGIN_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("GRAYLOGGIN_MAX_RETRIES") {
            match val.parse::<u32>() {
                Ok(retries) => self.retry.max_retries = retries,
                Err(_) => eprintln!("Warning: Invalid GRAYLOGGIN_MAX_RETRIES '{}', ignoring", val),
            }
        }

        if let Ok(val) = std::env::var("GRAYLOGGIN_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.http.timeout_secs = secs,
                Err(_) => eprintln!("Warning: Invalid GRAYLOGGIN_TIMEOUT_SECS '{}', ignoring", val),
            }
        }
    }

    pub fn auth(&self) -> AuthContext {
        AuthContext::basic(&self.graylog.username, &self.graylog.password)
    }

    pub fn client_config(&self) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        HttpClientConfig {
            timeout_secs: self.http.timeout_secs,
            connect_timeout_secs: self.http.connect_timeout_secs,
            user_agent: self.http.user_agent.clone().unwrap_or(defaults.user_agent),
            ..defaults
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            retry: RetryPolicy {
                max_retries: self.retry.max_retries,
                initial_sleep: Duration::from_millis(self.retry.initial_sleep_ms),
                jitter_step: Duration::from_millis(self.retry.jitter_step_ms),
                jitter_steps: self.retry.jitter_steps,
            },
            ..SearchConfig::default()
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:9000/".to_string()
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    10
}

fn default_initial_sleep_ms() -> u64 {
    1000
}

fn default_jitter_step_ms() -> u64 {
    250
}

fn default_jitter_steps() -> u32 {
    120
}

fn default_log_level() -> String {
    "warn".to_string()
}
