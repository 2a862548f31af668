/// Configuration management for Post Service
///
/// Everything is read from environment variables (optionally via `.env`).
/// Values that are present but malformed are rejected at startup.
use db_pool::env_utils::{parse_env_flag, parse_env_or};
use db_pool::DbConfig;
use std::fmt;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Which store backs the service
    pub storage: StorageBackend,
    /// Post rules and paging limits
    pub limits: PostLimits,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Pool settings
    pub pool: DbConfig,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
    /// Insert the demo users when the users table is empty
    pub seed_demo_users: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Postgres => write!(f, "postgres"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Width of `posts.content`. `POSTS_MAX_LENGTH` may not exceed it.
pub const MAX_STORED_CONTENT_LENGTH: usize = 777;

/// Post rules and paging limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostLimits {
    /// Posts plus reposts a user may author per UTC day
    pub daily_post_limit: u32,
    /// Maximum content length in characters, after trimming
    pub max_content_length: usize,
    /// Page size used when the client sends none (or a non-positive one)
    pub default_page_size: u32,
    /// Hard ceiling on page size
    pub max_page_size: u32,
    /// Search terms are truncated to this many characters
    pub max_search_length: usize,
}

impl Default for PostLimits {
    fn default() -> Self {
        Self {
            daily_post_limit: 5,
            max_content_length: MAX_STORED_CONTENT_LENGTH,
            default_page_size: 15,
            max_page_size: 100,
            max_search_length: 200,
        }
    }
}

impl PostLimits {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        let limits = Self {
            daily_post_limit: parse_env_or("POSTS_DAILY_LIMIT", defaults.daily_post_limit)?,
            max_content_length: parse_env_or("POSTS_MAX_LENGTH", defaults.max_content_length)?,
            default_page_size: parse_env_or(
                "POSTS_DEFAULT_PAGE_SIZE",
                defaults.default_page_size,
            )?,
            max_page_size: parse_env_or("POSTS_MAX_PAGE_SIZE", defaults.max_page_size)?,
            max_search_length: parse_env_or(
                "POSTS_MAX_SEARCH_LENGTH",
                defaults.max_search_length,
            )?,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_content_length == 0 {
            return Err("POSTS_MAX_LENGTH must be greater than zero".to_string());
        }
        if self.max_content_length > MAX_STORED_CONTENT_LENGTH {
            return Err(format!(
                "POSTS_MAX_LENGTH cannot exceed {} (posts.content column limit)",
                MAX_STORED_CONTENT_LENGTH
            ));
        }
        if self.max_page_size == 0 {
            return Err("POSTS_MAX_PAGE_SIZE must be greater than zero".to_string());
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(format!(
                "POSTS_DEFAULT_PAGE_SIZE must be between 1 and {}",
                self.max_page_size
            ));
        }
        if self.max_search_length == 0 {
            return Err("POSTS_MAX_SEARCH_LENGTH must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("POST_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_or("POST_SERVICE_PORT", 8080)?,
        };

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if app.is_production() => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                Err(_) => "http://localhost:3000".to_string(),
            };

            if app.is_production() && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let storage: StorageBackend = match std::env::var("POST_STORAGE") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::Postgres,
        };

        let mut pool = DbConfig::from_env("post-service", "postgres://localhost/posterr")?;
        // DATABASE_MAX_CONNECTIONS is the service-level knob; DB_MAX_CONNECTIONS still wins.
        if std::env::var("DB_MAX_CONNECTIONS").is_err() {
            pool.max_connections = parse_env_or("DATABASE_MAX_CONNECTIONS", pool.max_connections)?;
            pool.min_connections = pool.min_connections.min(pool.max_connections);
        }
        if pool.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than zero".to_string());
        }

        let database = DatabaseConfig {
            pool,
            run_migrations: parse_env_flag("DATABASE_RUN_MIGRATIONS", true)?,
            seed_demo_users: parse_env_flag("DATABASE_SEED", !app.is_production())?,
        };

        Ok(Config {
            app,
            cors,
            database,
            storage,
            limits: PostLimits::from_env()?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 14] = [
        "APP_ENV",
        "POST_SERVICE_HOST",
        "POST_SERVICE_PORT",
        "CORS_ALLOWED_ORIGINS",
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "DATABASE_RUN_MIGRATIONS",
        "DATABASE_SEED",
        "POST_STORAGE",
        "POSTS_DAILY_LIMIT",
        "POSTS_MAX_LENGTH",
        "POSTS_DEFAULT_PAGE_SIZE",
        "POSTS_MAX_PAGE_SIZE",
        "POSTS_MAX_SEARCH_LENGTH",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
        std::env::remove_var("DB_MAX_CONNECTIONS");
        std::env::remove_var("DB_MIN_CONNECTIONS");
    }

    #[test]
    #[serial_test::serial]
    fn test_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.limits, PostLimits::default());
        assert!(config.database.run_migrations);
        assert!(config.database.seed_demo_users);
        assert_eq!(config.database.pool.database_url, "postgres://localhost/posterr");
    }

    #[test]
    #[serial_test::serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("POST_SERVICE_PORT", "9000");
        std::env::set_var("POST_STORAGE", "memory");
        std::env::set_var("POSTS_DAILY_LIMIT", "10");
        std::env::set_var("DATABASE_MAX_CONNECTIONS", "1");
        std::env::set_var("DATABASE_SEED", "false");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.port, 9000);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.limits.daily_post_limit, 10);
        assert_eq!(config.database.pool.max_connections, 1);
        assert_eq!(config.database.pool.min_connections, 1);
        assert!(!config.database.seed_demo_users);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_production_guards() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("cannot be '*'"));

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://posterr.example");
        let config = Config::from_env().unwrap();
        assert!(!config.database.seed_demo_users);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_malformed_values_are_rejected() {
        clear_env();
        std::env::set_var("POSTS_MAX_LENGTH", "long");
        assert!(Config::from_env().is_err());

        clear_env();
        std::env::set_var("POST_STORAGE", "redis");
        assert!(Config::from_env().is_err());

        clear_env();
        std::env::set_var("POSTS_DEFAULT_PAGE_SIZE", "150");
        assert!(Config::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_content_length_cannot_exceed_column() {
        clear_env();
        std::env::set_var("POSTS_MAX_LENGTH", "1000");
        let err = PostLimits::from_env().unwrap_err();
        assert!(err.contains("cannot exceed 777"), "{}", err);
        assert!(Config::from_env().is_err());

        std::env::set_var("POSTS_MAX_LENGTH", "777");
        assert_eq!(PostLimits::from_env().unwrap().max_content_length, 777);

        std::env::set_var("POSTS_MAX_LENGTH", "280");
        assert_eq!(PostLimits::from_env().unwrap().max_content_length, 280);

        clear_env();
    }
}
