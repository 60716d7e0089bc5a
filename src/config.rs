use std::{env, str::FromStr, time::Duration};

use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

/// Output token ceilings per content kind.
///
/// Ten multiple-choice items with four options each need a much larger budget
/// than a single chat reply, so each kind gets its own ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationBudgets {
    pub multiple_choice: u32,
    pub true_false: u32,
    pub short_answer: u32,
    pub chat: u32,
    pub note: u32,
}

impl Default for GenerationBudgets {
    fn default() -> Self {
        Self {
            multiple_choice: 4000,
            true_false: 2000,
            short_answer: 2000,
            chat: 1000,
            note: 1024,
        }
    }
}

/// MongoDB connection pool sizing. The timeout applies to both connecting
/// and server selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MongoPoolSettings {
    pub max_size: u32,
    pub min_size: u32,
    pub timeout_secs: u64,
}

impl Default for MongoPoolSettings {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_size: 0,
            timeout_secs: 5,
        }
    }
}

impl MongoPoolSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: SecretString,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    pub budgets: GenerationBudgets,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub notes_collection: String,
    pub mongo_pool: MongoPoolSettings,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: Option<String>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = GenerationBudgets::default();
        let pool = MongoPoolSettings::default();

        Self {
            gemini_api_key: SecretString::from(env::var("GEMINI_API_KEY").unwrap_or_default()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_timeout_secs: env_or("GEMINI_TIMEOUT_SECS", 60),
            budgets: GenerationBudgets {
                multiple_choice: env_or("MULTIPLE_CHOICE_MAX_TOKENS", defaults.multiple_choice),
                true_false: env_or("TRUE_FALSE_MAX_TOKENS", defaults.true_false),
                short_answer: env_or("SHORT_ANSWER_MAX_TOKENS", defaults.short_answer),
                chat: env_or("CHAT_MAX_TOKENS", defaults.chat),
                note: env_or("NOTE_MAX_TOKENS", defaults.note),
            },
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "bookstore-local".to_string()),
            notes_collection: env::var("NOTES_COLLECTION").unwrap_or_else(|_| "notes".to_string()),
            mongo_pool: MongoPoolSettings {
                max_size: env_or("MONGO_MAX_POOL_SIZE", pool.max_size),
                min_size: env_or("MONGO_MIN_POOL_SIZE", pool.min_size),
                timeout_secs: env_or("MONGO_TIMEOUT_SECS", pool.timeout_secs),
            },
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_server_port: env_or("WEB_SERVER_PORT", 8080),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|origin| !origin.trim().is_empty()),
        }
    }

    pub fn gemini_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini_timeout_secs)
    }

    /// Rejects configuration the server cannot start with.
    pub fn validate(&self) -> AppResult<()> {
        if self.gemini_api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ValidationError(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        if self.gemini_timeout_secs == 0 {
            return Err(AppError::ValidationError(
                "GEMINI_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let budgets = self.budgets;
        let all_budgets = [
            budgets.multiple_choice,
            budgets.true_false,
            budgets.short_answer,
            budgets.chat,
            budgets.note,
        ];
        if all_budgets.contains(&0) {
            return Err(AppError::ValidationError(
                "token budgets must be greater than zero".to_string(),
            ));
        }

        let pool = self.mongo_pool;
        if pool.max_size == 0 || pool.min_size > pool.max_size {
            return Err(AppError::ValidationError(
                "MONGO_MIN_POOL_SIZE must not exceed a non-zero MONGO_MAX_POOL_SIZE".to_string(),
            ));
        }
        if pool.timeout_secs == 0 {
            return Err(AppError::ValidationError(
                "MONGO_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            gemini_api_key: SecretString::from("test-gemini-key".to_string()),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            gemini_timeout_secs: 5,
            budgets: GenerationBudgets::default(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "bookstore-test".to_string(),
            notes_collection: "notes".to_string(),
            mongo_pool: MongoPoolSettings::default(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: None,
        }
    }
}
