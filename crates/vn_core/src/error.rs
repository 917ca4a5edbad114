use std::fmt;
use serde::Serialize;
use thiserror::Error;

/// The pipeline step an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NewsSearch,
    PageFetch,
    Summarize,
    ExtractTopics,
    ClassifySentiment,
    Comparative,
    FinalSummary,
    Translation,
    Speech,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::NewsSearch => "news search",
            Stage::PageFetch => "page fetch",
            Stage::Summarize => "summarize",
            Stage::ExtractTopics => "topic extraction",
            Stage::ClassifySentiment => "sentiment classification",
            Stage::Comparative => "comparative analysis",
            Stage::FinalSummary => "final summary",
            Stage::Translation => "translation",
            Stage::Speech => "speech synthesis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn article_suffix(article: &Option<usize>) -> String {
    match article {
        Some(index) => format!(" (article {})", index),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{stage} unavailable{}: {message}", article_suffix(.article))]
    UpstreamUnavailable {
        stage: Stage,
        article: Option<usize>,
        message: String,
        timed_out: bool,
    },

    #[error("{stage} returned a malformed response{}: {message}", article_suffix(.article))]
    UpstreamMalformedResponse {
        stage: Stage,
        article: Option<usize>,
        message: String,
    },

    #[error("{stage} rejected the request{} with HTTP {status}: {message}", article_suffix(.article))]
    UpstreamRejected {
        stage: Stage,
        article: Option<usize>,
        status: u16,
        message: String,
    },

    #[error("{stage} produced invalid model output{}: {message}", article_suffix(.article))]
    ModelOutputInvalid {
        stage: Stage,
        article: Option<usize>,
        message: String,
    },

    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn unavailable(stage: Stage, message: impl Into<String>) -> Self {
        Error::UpstreamUnavailable {
            stage,
            article: None,
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timed_out(stage: Stage, message: impl Into<String>) -> Self {
        Error::UpstreamUnavailable {
            stage,
            article: None,
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn malformed(stage: Stage, message: impl Into<String>) -> Self {
        Error::UpstreamMalformedResponse {
            stage,
            article: None,
            message: message.into(),
        }
    }

    pub fn invalid_output(stage: Stage, message: impl Into<String>) -> Self {
        Error::ModelOutputInvalid {
            stage,
            article: None,
            message: message.into(),
        }
    }

    /// Classifies a transport error from an upstream call. Anything that
    /// decoded badly is a shape problem, everything else is availability.
    pub fn from_http(stage: Stage, err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::malformed(stage, err.to_string())
        } else if err.is_timeout() {
            Error::timed_out(stage, err.to_string())
        } else {
            Error::unavailable(stage, err.to_string())
        }
    }

    /// Maps a non-success HTTP status from an upstream service. 5xx and 429
    /// are availability problems; any other status is the service refusing
    /// the request and keeps its code.
    pub fn from_status(stage: Stage, status: reqwest::StatusCode, body: &str) -> Self {
        let body = body.chars().take(200).collect::<String>();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Error::unavailable(stage, format!("HTTP {}: {}", status.as_u16(), body.trim()))
        } else {
            Error::UpstreamRejected {
                stage,
                article: None,
                status: status.as_u16(),
                message: body.trim().to_string(),
            }
        }
    }

    /// HTTP status an upstream service answered with when it refused a request.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::UpstreamRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Attaches the index of the article being processed when the error was raised.
    pub fn with_article(mut self, index: usize) -> Self {
        match &mut self {
            Error::UpstreamUnavailable { article, .. }
            | Error::UpstreamMalformedResponse { article, .. }
            | Error::UpstreamRejected { article, .. }
            | Error::ModelOutputInvalid { article, .. } => *article = Some(index),
            _ => {}
        }
        self
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::UpstreamUnavailable { stage, .. }
            | Error::UpstreamMalformedResponse { stage, .. }
            | Error::UpstreamRejected { stage, .. }
            | Error::ModelOutputInvalid { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn article(&self) -> Option<usize> {
        match self {
            Error::UpstreamUnavailable { article, .. }
            | Error::UpstreamMalformedResponse { article, .. }
            | Error::UpstreamRejected { article, .. }
            | Error::ModelOutputInvalid { article, .. } => *article,
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable { timed_out: true, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
