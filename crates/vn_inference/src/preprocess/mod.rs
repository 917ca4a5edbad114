//! Text normalisation applied to a summary before sentiment classification.

use lazy_static::lazy_static;
use regex::Regex;

mod lemmatizer;
mod stopwords;

pub use lemmatizer::lemmatize;
pub use stopwords::is_stopword;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"\W+").expect("static regex");
}

/// Lowercases, strips punctuation, drops stopwords and lemmatizes.
///
/// The output never contains a stopword and `preprocess(preprocess(x))`
/// equals `preprocess(x)`.
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");

    cleaned
        .split_whitespace()
        .filter(|token| !is_stopword(token))
        .map(lemmatize)
        .filter(|lemma| !lemma.is_empty() && !is_stopword(lemma))
        .collect::<Vec<_>>()
        .join(" ")
}
