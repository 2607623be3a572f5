use std::env;
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub log_dir: String,

    /// How long fetched contribution schedules stay cached, in seconds.
    pub schedule_cache_ttl: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            schedule_cache_ttl: env::var("SCHEDULE_CACHE_TTL")
                .unwrap_or_else(|_| "86400".to_string()) // default 24h
                .parse()
                .unwrap(),
        }
    }
}
