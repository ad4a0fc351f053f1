use crate::quotes_logic::cors::CorsConfig;
use clap::Parser;
use lib_quotes::markets::barchart::apicall::BARCHART_BASE_URL;
use lib_quotes::markets::currency::awesomeapi::AWESOMEAPI_URL;
use lib_quotes::markets::currency::investing::{INVESTING_API_URL, INVESTING_PAGE_URL};
use lib_quotes::markets::currency::rate::MAX_SAMPLE_AGE_SECS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "server_quotes.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[clap(about = "Futures and dollar quotes proxy server", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "QUOTES_PORT", help = "Port to listen on.")]
    pub port: Option<u16>,

    #[clap(long, env = "QUOTES_HOST", help = "Address to bind to.")]
    pub host: Option<String>,

    #[clap(long, env = "QUOTES_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "QUOTES_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "QUOTES_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error, fatal).")]
    pub log_level: Option<String>,

    #[clap(long, env = "QUOTES_CORS_ALLOW_ORIGINS", value_delimiter = ',', help = "Allowed CORS origins, `*` for any.")]
    pub cors_allow_origins: Option<Vec<String>>,

    #[clap(long, env = "QUOTES_CORS_ALLOW_METHODS", value_delimiter = ',', help = "Allowed CORS methods, `*` for any.")]
    pub cors_allow_methods: Option<Vec<String>>,

    #[clap(long, env = "QUOTES_CORS_ALLOW_HEADERS", value_delimiter = ',', help = "Allowed CORS headers, `*` for any.")]
    pub cors_allow_headers: Option<Vec<String>>,

    #[clap(long, env = "QUOTES_CORS_ALLOW_CREDENTIALS", help = "Whether CORS responses allow credentials.")]
    pub cors_allow_credentials: Option<bool>,

    #[clap(long, env = "QUOTES_BARCHART_URL", help = "Base URL of the futures quote site.")]
    pub barchart_url: Option<String>,

    #[clap(long, env = "QUOTES_INVESTING_PAGE_URL", help = "Base URL of the primary currency page.")]
    pub investing_page_url: Option<String>,

    #[clap(long, env = "QUOTES_INVESTING_API_URL", help = "Base URL of the primary real-time currency API.")]
    pub investing_api_url: Option<String>,

    #[clap(long, env = "QUOTES_AWESOMEAPI_URL", help = "Base URL of the fallback currency aggregator.")]
    pub awesomeapi_url: Option<String>,

    #[clap(long, env = "QUOTES_CURRENCY_TIMEOUT_SECS", help = "Timeout in seconds for each currency provider call.")]
    pub currency_timeout_secs: Option<u64>,

    #[clap(long, env = "QUOTES_MAX_SAMPLE_AGE_SECS", help = "Maximum age in seconds of an accepted primary dollar rate.")]
    pub max_sample_age_secs: Option<i64>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    pub fn merge(self, other: Config) -> Config {
        Config {
            port: other.port.or(self.port),
            host: other.host.or(self.host),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            cors_allow_origins: other.cors_allow_origins.or(self.cors_allow_origins),
            cors_allow_methods: other.cors_allow_methods.or(self.cors_allow_methods),
            cors_allow_headers: other.cors_allow_headers.or(self.cors_allow_headers),
            cors_allow_credentials: other.cors_allow_credentials.or(self.cors_allow_credentials),
            barchart_url: other.barchart_url.or(self.barchart_url),
            investing_page_url: other.investing_page_url.or(self.investing_page_url),
            investing_api_url: other.investing_api_url.or(self.investing_api_url),
            awesomeapi_url: other.awesomeapi_url.or(self.awesomeapi_url),
            currency_timeout_secs: other.currency_timeout_secs.or(self.currency_timeout_secs),
            max_sample_age_secs: other.max_sample_age_secs.or(self.max_sample_age_secs),
        }
    }

    pub fn defaults() -> Config {
        let cors = CorsConfig::default();
        Config {
            port: Some(8000),
            host: Some("0.0.0.0".to_string()),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            cors_allow_origins: Some(cors.allow_origins),
            cors_allow_methods: Some(cors.allow_methods),
            cors_allow_headers: Some(cors.allow_headers),
            cors_allow_credentials: Some(cors.allow_credentials),
            barchart_url: Some(BARCHART_BASE_URL.to_string()),
            investing_page_url: Some(INVESTING_PAGE_URL.to_string()),
            investing_api_url: Some(INVESTING_API_URL.to_string()),
            awesomeapi_url: Some(AWESOMEAPI_URL.to_string()),
            currency_timeout_secs: Some(10),
            max_sample_age_secs: Some(MAX_SAMPLE_AGE_SECS),
            ..Default::default()
        }
    }

    /// Reads a JSON config file. Unreadable or invalid files are logged and ignored.
    pub fn from_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            log::info!("Config file not found at {}. Using defaults and environment/CLI variables.", path.display());
            return None;
        }
        match fs::read_to_string(path) {
            Ok(config_str) => match serde_json::from_str::<Config>(&config_str) {
                Ok(file_config) => Some(file_config),
                Err(e) => {
                    log::warn!("Failed to parse config file {}: {}. Falling back to other sources.", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {}: {}. Falling back to other sources.", path.display(), e);
                None
            }
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8000)
    }

    pub fn host(&self) -> String {
        self.host.clone().unwrap_or_else(|| "0.0.0.0".to_string())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("./logs"))
    }

    pub fn log_level(&self) -> String {
        self.log_level.clone().unwrap_or_else(|| "info".to_string())
    }

    pub fn currency_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.currency_timeout_secs.unwrap_or(10))
    }

    pub fn max_sample_age(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(self.max_sample_age_secs.unwrap_or(MAX_SAMPLE_AGE_SECS))
    }

    /// CORS settings; unset fields keep the permissive defaults.
    pub fn cors(&self) -> CorsConfig {
        let defaults = CorsConfig::default();
        CorsConfig {
            allow_origins: self.cors_allow_origins.clone().unwrap_or(defaults.allow_origins),
            allow_methods: self.cors_allow_methods.clone().unwrap_or(defaults.allow_methods),
            allow_headers: self.cors_allow_headers.clone().unwrap_or(defaults.allow_headers),
            allow_credentials: self.cors_allow_credentials.unwrap_or(defaults.allow_credentials),
        }
    }
}

/// Layers defaults, then the config file, then environment/CLI values.
pub fn resolve_config(cli: Config) -> Config {
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = Config::defaults();
    if let Some(file_config) = Config::from_file(&config_file_path) {
        current_config = current_config.merge(file_config);
    }

    // clap::Parser already folded env vars into the CLI values.
    current_config.merge(cli)
}

pub fn load_config() -> Config {
    resolve_config(Config::parse())
}
