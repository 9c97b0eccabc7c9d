//! Engine configuration
//!
//! # 环境变量
//!
//! 所有配置项都可以通过环境变量覆盖：
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | BOOKINGS_COLLECTION | bookings | Booking document collection |
//! | RATINGS_COLLECTION | ratings | Rating document collection |
//! | EVENT_CHANNEL_CAPACITY | 1024 | Booking event broadcast capacity |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | LOG_DIR | (unset) | Optional rolling log directory |

/// Engine configuration, loaded from the environment with defaults
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Collection holding booking documents
    pub bookings_collection: String,
    /// Collection holding rating documents
    pub ratings_collection: String,
    /// Capacity of the booking event broadcast channel
    pub event_channel_capacity: usize,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// Optional directory for rolling log files
    pub log_dir: Option<String>,
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset. `.env` files are honored.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            bookings_collection: std::env::var("BOOKINGS_COLLECTION")
                .unwrap_or_else(|_| "bookings".into()),
            ratings_collection: std::env::var("RATINGS_COLLECTION")
                .unwrap_or_else(|_| "ratings".into()),
            event_channel_capacity: std::env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Fixed configuration for tests, independent of the host environment
    pub fn for_tests() -> Self {
        Self {
            bookings_collection: "bookings".into(),
            ratings_collection: "ratings".into(),
            event_channel_capacity: 64,
            environment: "development".into(),
            log_dir: None,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
