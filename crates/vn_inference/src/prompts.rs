use serde::Serialize;
use vn_core::Article;

/// One-shot example embedded in the comparative prompt. The validator uses
/// these sentences to detect replies that copy the example instead of
/// analysing the articles.
pub const EXAMPLE_COMPARISONS: [&str; 2] = [
    "Article 1 highlights Tesla's strong sales, while Article 2 discusses regulatory issues.",
    "Article 1 is focused on financial success and innovation, whereas Article 2 is about legal challenges and risks.",
];

/// Names that only occur in the one-shot example. Seeing one in a report
/// about articles that never mention it means the example leaked.
pub const EXAMPLE_ONLY_TERMS: [&str; 3] = ["Tesla", "Electric Vehicles", "Autonomous Vehicles"];

const EXAMPLE_REPORT: &str = r#"{
    "Sentiment Distribution": {
        "Positive": 1,
        "Negative": 1,
        "Neutral": 0
    },
    "Coverage Differences": [
        {
            "Comparison": "Article 1 highlights Tesla's strong sales, while Article 2 discusses regulatory issues.",
            "Impact": "The first article boosts confidence in Tesla's market growth, while the second raises concerns about future regulatory hurdles."
        },
        {
            "Comparison": "Article 1 is focused on financial success and innovation, whereas Article 2 is about legal challenges and risks.",
            "Impact": "Investors may react positively to growth news but stay cautious due to regulatory scrutiny."
        }
    ],
    "Topic Overlap": {
        "Common Topics": ["Electric Vehicles"],
        "Unique Topics in Article 1": ["Stock Market", "Innovation"],
        "Unique Topics in Article 2": ["Regulations", "Autonomous Vehicles"]
    }
}"#;

pub fn article_summary(content: &str) -> String {
    format!(
        "Summarize the following content\n\n{}\n\n\
         so that a reader understands what it is about. Leave out marketing, ads \
         and other promotional material and keep only the necessary information. \
         Use at most 5 sentences and answer with plain text only.",
        content
    )
}

pub fn topic_keywords(summary: &str) -> String {
    format!(
        "###SUMMARY OF THE ARTICLE:\n{}\n\
         ###INSTRUCTIONS:\n\
         The content above is the summary of a news article. Analyze it in detail and \
         identify its most important keywords. Return at most 7 keywords as a list, \
         for example [\"Keyword one\", \"Keyword two\"]. Do not include anything else.",
        summary
    )
}

pub fn sentiment(cleaned_summary: &str) -> String {
    format!(
        "###CLEANED SUMMARY OF THE ARTICLE:\n{}\n\
         ###INSTRUCTIONS:\n\
         This is a cleaned summary of a news article. Analyze its sentiment. \
         Answer with a single word: Positive, Negative or Neutral.",
        cleaned_summary
    )
}

/// The fields of an article a model gets to see. The URL carries no
/// content and stays out of the prompt.
#[derive(Serialize)]
struct PromptArticle<'a> {
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Summary")]
    summary: &'a str,
    #[serde(rename = "Sentiment")]
    sentiment: &'a str,
    #[serde(rename = "Topics")]
    topics: &'a str,
}

fn articles_json(articles: &[Article]) -> String {
    let view: Vec<PromptArticle<'_>> = articles
        .iter()
        .map(|a| PromptArticle {
            title: &a.title,
            summary: &a.summary,
            sentiment: &a.sentiment,
            topics: &a.topics,
        })
        .collect();
    serde_json::to_string_pretty(&view).unwrap_or_else(|_| "[]".to_string())
}

pub fn comparative(articles: &[Article]) -> String {
    format!(
        "Every element of the following array is a news article with the keys `Title`, \
         `Summary`, `Sentiment` and `Topics`:\n\n{articles}\n\n\
         Count the Positive, Negative and Neutral values of `Sentiment` across all {count} \
         articles; the three counts must add up to {count}. Compare the summaries, find \
         related articles and describe each difference under the headers Comparison and \
         Impact. Using the `Topics` keys, list the topics common to all articles and the \
         topics unique to each article, numbering articles from 1 in array order.\n\n\
         Here is an example comparing two unrelated articles. Follow this exact JSON \
         format, but do not copy its content:\n\n{example}\n\n\
         Now analyze the articles in the array and return the JSON only, with no preamble.",
        articles = articles_json(articles),
        count = articles.len(),
        example = EXAMPLE_REPORT,
    )
}

pub fn final_summary(articles: &[Article]) -> String {
    format!(
        "This is an array of news articles:\n\n{}\n\n\
         Each element has a `Title`, a `Summary`, a `Sentiment` and the key `Topics` of \
         the article. Based on all of these details, write a final summary of the coverage \
         in 4-5 lines. Return only the summary text and nothing else.",
        articles_json(articles)
    )
}
