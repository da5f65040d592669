use std::env;
use std::time::Duration;

use crate::services::list_controller::ListSettings;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the shop REST API, e.g. `http://localhost:8080/api`.
    pub api_base_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub default_page_size: usize,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            api_base_url: env::var("API_BASE_URL")?,
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            search_debounce_ms: env::var("SEARCH_DEBOUNCE_MS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        })
    }

    /// Configuration for tests and local runs against `api_base_url`.
    pub fn local(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: "http://localhost:5173".to_string(),
            default_page_size: 10,
            search_debounce_ms: 300,
            request_timeout_secs: 10,
        }
    }

    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            default_page_size: self.default_page_size.max(1),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
