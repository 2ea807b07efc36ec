// Environment-backed constants, resolved once at first use.

use std::env;

pub const AGENT_NAME: &str = "BrandPulse Assistant";
pub const DEFAULT_SESSION_ID: &str = "default";

/// Origins the React dev server may call us from.
pub const ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
];

lazy_static::lazy_static! {
    pub static ref GEMINI_API_URL: String = env::var("GEMINI_API_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    pub static ref GEMINI_MODEL: String = env::var("GEMINI_MODEL")
        .unwrap_or_else(|_| "gemini-2.0-flash-exp".to_string());
    pub static ref SERVICE_ACCOUNT_FILE: String = env::var("SERVICE_ACCOUNT_FILE")
        .unwrap_or_else(|_| "service_account.json".to_string());
}
