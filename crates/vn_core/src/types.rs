use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

/// One fetched news item together with what the models said about it.
///
/// `sentiment` and `topics` hold the model replies verbatim. Use
/// [`Article::sentiment_label`] and [`Article::topic_list`] to read them
/// leniently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Url", default)]
    pub url: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: String,
    #[serde(rename = "Topics")]
    pub topics: String,
}

pub type ArticleSet = Vec<Article>;

impl Article {
    pub fn sentiment_label(&self) -> Option<Sentiment> {
        Sentiment::parse_lenient(&self.sentiment)
    }

    /// Best-effort split of the topic reply into keywords. Accepts
    /// `["a", "b"]`, `['a', 'b']`, bullet lists and comma separated text.
    pub fn topic_list(&self) -> Vec<String> {
        let raw = self.topics.trim();
        if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
            return list.into_iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
        }

        let inner = match (raw.find('['), raw.rfind(']')) {
            (Some(start), Some(end)) if start < end => &raw[start + 1..end],
            _ => raw,
        };

        inner
            .split(|c| c == ',' || c == '\n')
            .map(|t| {
                t.trim()
                    .trim_start_matches(|c: char| c == '-' || c == '*' || c == '•')
                    .trim()
                    .trim_matches(|c| c == '"' || c == '\'' || c == '`')
                    .trim()
                    .to_string()
            })
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// Reads a model reply such as `"Positive"`, `"negative."` or
    /// `"The sentiment is Neutral"`. Replies naming zero or several labels
    /// yield `None`.
    pub fn parse_lenient(text: &str) -> Option<Sentiment> {
        let lowered = text.to_lowercase();
        let found: Vec<Sentiment> = Sentiment::ALL
            .into_iter()
            .filter(|s| {
                lowered
                    .split(|c: char| !c.is_alphanumeric())
                    .any(|word| word == s.as_str().to_lowercase())
            })
            .collect();
        match found.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(rename = "Positive", default)]
    pub positive: usize,
    #[serde(rename = "Negative", default)]
    pub negative: usize,
    #[serde(rename = "Neutral", default)]
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDifference {
    #[serde(rename = "Comparison")]
    pub comparison: String,
    #[serde(rename = "Impact")]
    pub impact: String,
}

const COMMON_TOPICS_KEY: &str = "Common Topics";
const UNIQUE_TOPICS_PREFIX: &str = "Unique Topics in Article ";

/// Topics shared by every article and the ones only a single article covers.
/// `unique` is keyed by the 1-based article number used in the report text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<String>>", into = "BTreeMap<String, Vec<String>>")]
pub struct TopicOverlap {
    pub common: BTreeSet<String>,
    pub unique: BTreeMap<usize, BTreeSet<String>>,
}

impl TryFrom<BTreeMap<String, Vec<String>>> for TopicOverlap {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Vec<String>>) -> std::result::Result<Self, Self::Error> {
        let mut overlap = TopicOverlap::default();
        for (key, topics) in raw {
            let key = key.trim();
            if key.eq_ignore_ascii_case(COMMON_TOPICS_KEY) {
                overlap.common.extend(topics);
            } else if let Some(number) = key.strip_prefix(UNIQUE_TOPICS_PREFIX) {
                let number: usize = number
                    .trim()
                    .parse()
                    .map_err(|_| format!("unrecognised article number in key {:?}", key))?;
                overlap.unique.entry(number).or_default().extend(topics);
            } else {
                return Err(format!("unexpected topic overlap key {:?}", key));
            }
        }
        Ok(overlap)
    }
}

impl From<TopicOverlap> for BTreeMap<String, Vec<String>> {
    fn from(overlap: TopicOverlap) -> Self {
        let mut raw = BTreeMap::new();
        raw.insert(COMMON_TOPICS_KEY.to_string(), overlap.common.into_iter().collect());
        for (number, topics) in overlap.unique {
            raw.insert(format!("{}{}", UNIQUE_TOPICS_PREFIX, number), topics.into_iter().collect());
        }
        raw
    }
}

/// Aggregate comparison across one article set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeReport {
    #[serde(rename = "Sentiment Distribution")]
    pub sentiment_distribution: SentimentDistribution,
    #[serde(rename = "Coverage Differences", default)]
    pub coverage_differences: Vec<CoverageDifference>,
    #[serde(rename = "Topic Overlap", default)]
    pub topic_overlap: TopicOverlap,
}

/// Everything `/fetch_news` returns for one company. Built per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsReport {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Articles")]
    pub articles: ArticleSet,
    #[serde(rename = "Comparative Sentiment Score")]
    pub comparative: ComparativeReport,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_summary: String,
}

/// A single hit from the news search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub count: usize,
}

impl SearchQuery {
    pub fn for_company(company: &str, count: usize) -> Self {
        Self {
            keyword: company.trim().to_lowercase(),
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoiceGender {
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioEncoding {
    #[default]
    #[serde(rename = "MP3")]
    Mp3,
}

impl AudioEncoding {
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "audio/mpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "mp3",
        }
    }
}

pub const DEFAULT_SPEECH_LANGUAGE: &str = "hi-IN";
pub const DEFAULT_TRANSLATION_LANGUAGE: &str = "hi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConfig {
    pub language_code: String,
    pub gender: VoiceGender,
    pub encoding: AudioEncoding,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self::for_language(DEFAULT_SPEECH_LANGUAGE)
    }
}

impl VoiceConfig {
    pub fn for_language(language_code: &str) -> Self {
        Self {
            language_code: language_code.to_string(),
            gender: VoiceGender::Neutral,
            encoding: AudioEncoding::Mp3,
        }
    }
}

/// Synthesized speech. Lives only as long as the request that produced it.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub encoding: AudioEncoding,
    pub language_code: String,
}

impl fmt::Debug for AudioArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioArtifact")
            .field("bytes", &format!("<{} bytes>", self.bytes.len()))
            .field("encoding", &self.encoding)
            .field("language_code", &self.language_code)
            .finish()
    }
}

impl AudioArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Writes the audio under `dir` with a fresh name so concurrent callers
    /// never share a path.
    pub async fn write_transient(&self, dir: &Path) -> crate::Result<PathBuf> {
        let path = dir.join(format!("vaaninews-{}.{}", uuid::Uuid::new_v4(), self.encoding.extension()));
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}
