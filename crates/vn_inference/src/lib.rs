pub mod analysis;
pub mod models;
pub mod preprocess;
pub mod prompts;

pub use analysis::{ArticleAnalyzer, ComparativeAnalyzer, FinalSummarizer};
pub use models::{create_models, ModelSet};
pub use preprocess::preprocess;

pub mod prelude {
    pub use super::analysis::{ArticleAnalyzer, ComparativeAnalyzer, FinalSummarizer};
    pub use super::models::{create_models, DummyModel, ModelSet};
    pub use vn_core::{Article, ComparativeReport, Error, LanguageModel, Result};
}
