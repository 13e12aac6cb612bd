use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the portfolio API namespace
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Number of projects requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// File that receives the tracing output while the TUI owns the terminal
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_page_size() -> u32 {
    4
}

fn default_log_file() -> String {
    "portfolio_manager.log".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables are read with the `PORTFOLIO_` prefix, so `api_base_url`
    /// comes from `PORTFOLIO_API_BASE_URL`.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed("PORTFOLIO_").from_env::<Config>()?;

        Ok(config)
    }

    /// Get a direct reference to the API base URL
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_unset_fields() {
        let vars: Vec<(String, String)> = Vec::new();
        let config: Config = envy::prefixed("PORTFOLIO_")
            .from_iter(vars)
            .expect("config should parse");

        assert_eq!(config.api_base_url(), "http://localhost:3000/api");
        assert_eq!(config.page_size, 4);
        assert_eq!(config.log_file, "portfolio_manager.log");
    }

    #[test]
    fn prefixed_variables_are_read() {
        let vars = vec![
            ("PORTFOLIO_API_BASE_URL".to_string(), "https://api.example.com".to_string()),
            ("PORTFOLIO_PAGE_SIZE".to_string(), "8".to_string()),
            ("PAGE_SIZE".to_string(), "12".to_string()),
        ];
        let config: Config = envy::prefixed("PORTFOLIO_")
            .from_iter(vars)
            .expect("config should parse");

        assert_eq!(config.api_base_url(), "https://api.example.com");
        assert_eq!(config.page_size, 8);
    }

    #[test]
    fn malformed_page_size_is_an_error() {
        let vars = vec![("PORTFOLIO_PAGE_SIZE".to_string(), "many".to_string())];
        assert!(envy::prefixed("PORTFOLIO_").from_iter::<_, Config>(vars).is_err());
    }
}
