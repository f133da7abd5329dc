use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Whole-request timeout applied by the HTTP layer, in seconds
    pub request_timeout: u64,
    pub log_level: String,
    pub geocode: GeocodeConfig,
    /// Buffered events per live stream subscriber before it starts lagging
    pub stream_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    pub base_url: String,
    pub access_token: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            max_connections: env::var("MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            request_timeout: env::var("REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "orion=debug,tower_http=debug".to_string()),
            geocode: GeocodeConfig {
                base_url: env::var("MAPBOX_BASE_URL")
                    .unwrap_or_else(|_| "https://api.mapbox.com".to_string()),
                access_token: env::var("MAPBOX_ACCESS_TOKEN").map_err(|_| {
                    anyhow::anyhow!("MAPBOX_ACCESS_TOKEN environment variable is required")
                })?,
                timeout_secs: env::var("GEOCODE_TIMEOUT")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            stream_capacity: env::var("STREAM_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .unwrap_or(256),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
