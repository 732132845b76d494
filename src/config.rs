use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite catalog database URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Steam Web API key
    pub steam_api_key: String,

    /// Steam Web API base URL
    #[serde(default = "default_steam_api_url")]
    pub steam_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum number of friends whose activity is fetched per request
    #[serde(default = "default_friend_limit")]
    pub steam_friend_limit: usize,

    /// Maximum concurrent friend activity requests
    #[serde(default = "default_max_friend_workers")]
    pub max_friend_workers: usize,

    /// Vocabulary bound for the catalog term-vector space
    #[serde(default = "default_max_features")]
    pub max_features: usize,
}

fn default_database_url() -> String {
    "sqlite://data/steam_catalog.db".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_steam_api_url() -> String {
    "https://api.steampowered.com".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_friend_limit() -> usize {
    30
}

fn default_max_friend_workers() -> usize {
    8
}

fn default_max_features() -> usize {
    50_000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
