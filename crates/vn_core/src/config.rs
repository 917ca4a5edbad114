use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::Result;

pub const DEFAULT_USER_AGENT: &str = "DuckDuckBot/1.1; (+https://duckduckgo.com/duckduckbot)";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MAX_ARTICLES: usize = 10;

/// Credentials for the external services. All four are required at startup.
#[derive(Clone)]
pub struct Credentials {
    pub news_api_key: String,
    pub groq_api_key: String,
    pub gemini_api_key: String,
    pub google_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("news_api_key", &"<redacted>")
            .field("groq_api_key", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .field("google_api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub bind: SocketAddr,
    pub max_articles: usize,
    pub max_concurrency: usize,
    pub retry: RetryPolicy,
    pub gemini_model: String,
    pub groq_model: String,
    pub user_agent: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Every missing credential
    /// is reported in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let required = ["NEWS_API_KEY", "GROQ_API_KEY", "GENAI_KEY", "GOOGLE_API_KEY"];
        let missing: Vec<&str> = required.iter().copied().filter(|key| get(key).is_none()).collect();
        if !missing.is_empty() {
            return Err(Error::ConfigurationMissing(missing.join(", ")));
        }

        let credentials = Credentials {
            news_api_key: get("NEWS_API_KEY").unwrap_or_default(),
            groq_api_key: get("GROQ_API_KEY").unwrap_or_default(),
            gemini_api_key: get("GENAI_KEY").unwrap_or_default(),
            google_api_key: get("GOOGLE_API_KEY").unwrap_or_default(),
        };

        let timeout_secs: u64 = parse_or(get("VN_TIMEOUT_SECS"), "VN_TIMEOUT_SECS", 30)?;
        let max_retries: u32 = parse_or(get("VN_MAX_RETRIES"), "VN_MAX_RETRIES", 2)?;
        let max_articles: usize = parse_or(get("VN_MAX_ARTICLES"), "VN_MAX_ARTICLES", DEFAULT_MAX_ARTICLES)?;
        let max_concurrency: usize = parse_or(get("VN_MAX_CONCURRENCY"), "VN_MAX_CONCURRENCY", 4)?;

        Ok(Self {
            credentials,
            bind: parse_or(get("VN_BIND"), "VN_BIND", SocketAddr::from(([127, 0, 0, 1], 8000)))?,
            max_articles,
            max_concurrency: max_concurrency.max(1),
            retry: RetryPolicy::new(max_retries, Duration::from_secs(timeout_secs)),
            gemini_model: get("VN_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            groq_model: get("VN_GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            user_agent: get("VN_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::ConfigurationMissing(format!("{} has an unparsable value {:?}", key, raw))),
    }
}
