//! Application configuration
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the application, plus the
//! runtime `Settings` read from the command line and environment.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

// ===== Database =====

/// Maximum pooled SQLite connections
pub const DB_MAX_CONNECTIONS: u32 = 5;

/// Seconds a connection waits on a locked database before failing
pub const DB_BUSY_TIMEOUT_SECS: u64 = 5;

// ===== Upload Limits =====

/// Default maximum upload size in bytes (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Allowance for multipart framing on top of the upload size limit
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// File extensions accepted by the upload endpoint
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "eml"];

/// Maximum stored filename length
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Number of characters returned as the upload preview
pub const TEXT_SNIPPET_CHARS: usize = 200;

// ===== Generation Limits =====

/// Character budget for document text sent with most prompts
pub const MAX_TEXT_FOR_AI: usize = 8000;

/// Character budget for document text sent with planner prompts
pub const PLANNER_CONTEXT_CHARS: usize = 5000;

/// Character budget for document text sent with doubt questions
pub const DOUBT_CONTEXT_CHARS: usize = 24_000;

/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API base URL
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for a single completion request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Sampling temperature for every completion request
pub const COMPLETION_TEMPERATURE: f64 = 0.3;

// ===== Quiz Settings =====

/// Number of questions when the client does not ask for a count
pub const DEFAULT_QUIZ_QUESTIONS: u32 = 5;

/// Upper bound on questions per quiz
pub const MAX_QUIZ_QUESTIONS: u32 = 50;

/// Score above which the next quiz steps up a difficulty
pub const DIFFICULTY_UP_THRESHOLD: f64 = 0.8;

/// Score below which the next quiz steps down a difficulty
pub const DIFFICULTY_DOWN_THRESHOLD: f64 = 0.5;

/// Topic used when the grader does not name one
pub const DEFAULT_TOPIC: &str = "General";

// ===== Flashcard Settings =====

/// Mastery level at which a flashcard counts as mastered
pub const MASTERY_THRESHOLD: f64 = 0.8;

/// Fraction of the gap to the target closed by a single review
pub const MASTERY_LEARNING_RATE: f64 = 0.3;

/// Topic recorded for flashcard review metrics
pub const FLASHCARD_METRIC_TOPIC: &str = "Flashcards";

// ===== Planner Settings =====

/// Plan length in days when no exam date is given
pub const DEFAULT_PLAN_HORIZON_DAYS: i64 = 30;

/// Furthest accepted exam date, in days from today
pub const MAX_PLAN_HORIZON_DAYS: i64 = 365;

/// Importance assigned to topics supplied by name only
pub const DEFAULT_TOPIC_WEIGHT: u8 = 5;

/// Assumed mastery for topics without any recorded performance
pub const DEFAULT_TOPIC_MASTERY: f64 = 0.5;

/// Shortest study session in minutes
pub const MIN_SESSION_MINUTES: u32 = 30;

/// Longest study session in minutes
pub const MAX_SESSION_MINUTES: u32 = 90;

/// Runtime settings, read from flags or environment (a `.env` file is honored)
#[derive(Parser, Debug, Clone)]
#[command(name = "study-agent")]
#[command(version)]
#[command(about = "Study assistant backend: documents, flashcards, quizzes and revision plans")]
pub struct Settings {
    /// Address to listen on
    #[arg(long, env = "STUDY_AGENT_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// SQLite database file
    #[arg(long, env = "STUDY_AGENT_DATABASE", default_value = "study_assistant.db")]
    pub database: PathBuf,

    /// Credential for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the OpenAI-compatible completion service
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_COMPLETION_BASE_URL)]
    pub base_url: String,

    /// Completion model name
    #[arg(long, env = "STUDY_AGENT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Seconds to wait for a completion before failing the request
    #[arg(long, env = "STUDY_AGENT_LLM_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Allowed cross-origin client addresses, comma separated ("*" for any)
    #[arg(long, env = "STUDY_AGENT_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "STUDY_AGENT_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        allows_any_origin(&self.cors_origins)
    }
}

/// An empty origin list or a `*` entry opens the API to every origin
pub fn allows_any_origin(origins: &[String]) -> bool {
    origins.is_empty() || origins.iter().any(|origin| origin.trim() == "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_args() {
        let settings = Settings::try_parse_from([
            "study-agent",
            "--api-key",
            "sk-test",
            "--cors-origins",
            "http://localhost:3000,http://localhost:5173",
            "--max-upload-bytes",
            "1024",
        ])
        .unwrap();

        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.cors_origins.len(), 2);
        assert!(!settings.allows_any_origin());
        assert_eq!(settings.max_upload_bytes, 1024);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_default_origins_allow_any() {
        let settings = Settings::try_parse_from(["study-agent", "--api-key", "k"]).unwrap();
        assert!(settings.allows_any_origin());
    }

    #[test]
    fn test_allows_any_origin_list() {
        assert!(allows_any_origin(&[]));
        assert!(allows_any_origin(&[" * ".to_string()]));
        assert!(!allows_any_origin(&["http://localhost:3000".to_string()]));
    }
}
