/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `APP_ENV`: `development` or `production` (default: development)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `RUN_MIGRATIONS`: Apply embedded migrations at startup (default: true)
/// - `SUPABASE_URL`: Hosted project URL (required)
/// - `SUPABASE_ANON_KEY`: Public API key for the auth service (required)
/// - `SUPABASE_JWT_SECRET`: Secret that signs access tokens (required)
/// - `RUST_LOG`: Log filter (default: swamp_api=debug,tower_http=debug)
/// - `LOG_FORMAT`: `json` for structured logs
///
/// # Example
///
/// ```no_run
/// use swamp_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Hosted auth configuration
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Hosted auth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`
    pub url: String,

    /// Public (anon) API key sent with every auth request
    pub anon_key: String,

    /// Secret that signs access tokens
    ///
    /// IMPORTANT: This must be kept secret. It is found in the hosted
    /// project's API settings.
    #[serde(skip_serializing)]
    pub jwt_secret: String,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", name))
}

fn parse_var<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var_or(name, default)
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid {}: {}", name, e))
}

/// Splits a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    /// - The JWT secret is shorter than 32 characters
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = var_or("API_HOST", "0.0.0.0");
        let port = parse_var::<u16>("API_PORT", "5000")?;
        let cors_origins = parse_origins(&var_or("CORS_ORIGINS", "*"));
        let production = var_or("APP_ENV", "development").eq_ignore_ascii_case("production");

        let database_url = required("DATABASE_URL")?;
        let max_connections = parse_var::<u32>("DATABASE_MAX_CONNECTIONS", "10")?;
        let run_migrations = parse_var::<bool>("RUN_MIGRATIONS", "true")?;

        let auth_url = required("SUPABASE_URL")?;
        let anon_key = required("SUPABASE_ANON_KEY")?;
        let jwt_secret = required("SUPABASE_JWT_SECRET")?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("SUPABASE_JWT_SECRET must be at least 32 characters long");
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations,
            },
            auth: AuthConfig {
                url: auth_url,
                anon_key,
                jwt_secret,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.is_empty() || self.api.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
                run_migrations: false,
            },
            auth: AuthConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: "anon".to_string(),
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(config().bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://swamp.app ,,"),
            vec!["http://localhost:5173", "https://swamp.app"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_allows_any_origin() {
        let mut config = config();
        assert!(config.allows_any_origin());

        config.api.cors_origins = vec!["http://localhost:5173".to_string()];
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let json = serde_json::to_value(config()).unwrap();
        assert!(json["auth"].get("jwt_secret").is_none());
        assert_eq!(json["auth"]["anon_key"], "anon");
    }
}
