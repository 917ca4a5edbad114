use std::sync::Arc;
use vn_core::{Article, ComparativeReport, Error, LanguageModel, Result, Stage};
use crate::prompts::{self, EXAMPLE_COMPARISONS, EXAMPLE_ONLY_TERMS};

/// Produces the cross-article comparison and checks it before anyone
/// downstream sees it.
pub struct ComparativeAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl ComparativeAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn compare(&self, articles: &[Article]) -> Result<ComparativeReport> {
        if articles.is_empty() {
            return Ok(ComparativeReport::default());
        }

        let raw = self.model.complete(Stage::Comparative, &prompts::comparative(articles)).await?;
        let report = parse_report(&raw, articles)?;
        tracing::info!(
            articles = articles.len(),
            positive = report.sentiment_distribution.positive,
            negative = report.sentiment_distribution.negative,
            neutral = report.sentiment_distribution.neutral,
            differences = report.coverage_differences.len(),
            "comparative analysis parsed"
        );
        Ok(report)
    }
}

/// Removes markdown fences and any prose around the outermost JSON object.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Parses a model reply into a report and validates it against the articles
/// that were compared.
pub fn parse_report(raw: &str, articles: &[Article]) -> Result<ComparativeReport> {
    let json = extract_json(raw)
        .ok_or_else(|| Error::invalid_output(Stage::Comparative, "reply contains no JSON object"))?;

    let report: ComparativeReport = serde_json::from_str(json)
        .map_err(|e| Error::invalid_output(Stage::Comparative, format!("reply is not a valid report: {}", e)))?;

    validate(&report, articles)?;
    Ok(report)
}

fn report_text(report: &ComparativeReport) -> String {
    let differences = report
        .coverage_differences
        .iter()
        .flat_map(|d| [d.comparison.as_str(), d.impact.as_str()]);
    let topics = report
        .topic_overlap
        .common
        .iter()
        .chain(report.topic_overlap.unique.values().flatten())
        .map(String::as_str);
    differences.chain(topics).collect::<Vec<_>>().join("\n").to_lowercase()
}

fn articles_text(articles: &[Article]) -> String {
    articles
        .iter()
        .flat_map(|a| [a.title.as_str(), a.summary.as_str(), a.topics.as_str()])
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}

fn validate(report: &ComparativeReport, articles: &[Article]) -> Result<()> {
    let article_count = articles.len();
    let total = report.sentiment_distribution.total();
    if total != article_count {
        return Err(Error::invalid_output(
            Stage::Comparative,
            format!("sentiment counts add up to {} but {} articles were compared", total, article_count),
        ));
    }

    if let Some(number) = report.topic_overlap.unique.keys().find(|n| **n == 0 || **n > article_count) {
        return Err(Error::invalid_output(
            Stage::Comparative,
            format!("unique topics reference article {} of {}", number, article_count),
        ));
    }

    if report
        .coverage_differences
        .iter()
        .any(|d| EXAMPLE_COMPARISONS.contains(&d.comparison.trim()))
    {
        return Err(Error::invalid_output(
            Stage::Comparative,
            "reply copies the example comparison instead of describing the articles",
        ));
    }

    let reported = report_text(report);
    let source = articles_text(articles);
    if let Some(term) = EXAMPLE_ONLY_TERMS
        .iter()
        .find(|term| reported.contains(&term.to_lowercase()) && !source.contains(&term.to_lowercase()))
    {
        return Err(Error::invalid_output(
            Stage::Comparative,
            format!("reply mentions {:?} from the example, which none of the articles cover", term),
        ));
    }

    Ok(())
}
