pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod services;
pub mod testing;
pub mod types;

pub use config::Settings;
pub use error::{Error, Stage};
pub use models::LanguageModel;
pub use retry::RetryPolicy;
pub use services::{NewsSearch, PageContent, PageScraper, SpeechSynthesizer, Translator};
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;
