use std::env::var;
use std::time::Duration;

use dexquiz_core::DEFAULT_DURATION_SECS;
use dotenvy::dotenv;

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Request body size limit in bytes
    /// Env: REQUEST_BODY_LIMIT (default: 16384 = 16KB)
    pub request_body_limit: usize,

    /// Request timeout in seconds
    /// Env: REQUEST_TIMEOUT_SECS (default: 10)
    pub request_timeout: Duration,

    /// Server port
    /// Env: PORT (default: 5000)
    pub port: u16,

    /// Length of a new game session in seconds
    /// Env: GAME_DURATION_SECS (default: 900)
    pub game_duration_secs: u64,

    /// Optional catalog file, one name per line
    /// Env: CATALOG_PATH (default: built-in Generation 1 list)
    pub catalog_path: Option<String>,

    /// Milliseconds to replenish one guess request
    /// Env: RATE_LIMIT_GUESS_REPLENISH_MS (default: 50, i.e. 20/sec)
    /// Lenient since a whole lobby guesses from behind one address
    pub rate_limit_guess_replenish_ms: u64,

    /// Burst size for the guess endpoint
    /// Env: RATE_LIMIT_GUESS_BURST (default: 40)
    pub rate_limit_guess_burst: u32,

    /// Milliseconds to replenish one request on other game endpoints
    /// Env: RATE_LIMIT_GENERAL_REPLENISH_MS (default: 100, i.e. 10/sec)
    pub rate_limit_general_replenish_ms: u64,

    /// Burst size for other game endpoints
    /// Env: RATE_LIMIT_GENERAL_BURST (default: 30)
    pub rate_limit_general_burst: u32,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv();
        let defaults = Self::default();
        Self {
            request_body_limit: env_or_default("REQUEST_BODY_LIMIT", defaults.request_body_limit),
            request_timeout: Duration::from_secs(env_or_default(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            port: env_or_default("PORT", defaults.port),
            game_duration_secs: env_or_default("GAME_DURATION_SECS", defaults.game_duration_secs),
            catalog_path: var("CATALOG_PATH").ok().filter(|path| !path.is_empty()),
            rate_limit_guess_replenish_ms: env_or_default(
                "RATE_LIMIT_GUESS_REPLENISH_MS",
                defaults.rate_limit_guess_replenish_ms,
            ),
            rate_limit_guess_burst: env_or_default(
                "RATE_LIMIT_GUESS_BURST",
                defaults.rate_limit_guess_burst,
            ),
            rate_limit_general_replenish_ms: env_or_default(
                "RATE_LIMIT_GENERAL_REPLENISH_MS",
                defaults.rate_limit_general_replenish_ms,
            ),
            rate_limit_general_burst: env_or_default(
                "RATE_LIMIT_GENERAL_BURST",
                defaults.rate_limit_general_burst,
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_body_limit: 16 * 1024,
            request_timeout: Duration::from_secs(10),
            port: 5000,
            game_duration_secs: DEFAULT_DURATION_SECS,
            catalog_path: None,
            rate_limit_guess_replenish_ms: 50,
            rate_limit_guess_burst: 40,
            rate_limit_general_replenish_ms: 100,
            rate_limit_general_burst: 30,
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}
