//! Noun lemmatizer: plural suffix rules plus a table of irregular forms.
//!
//! Rules are applied until the word stops changing, so every returned lemma
//! is a fixed point of [`lemmatize`].

use std::collections::{HashMap, HashSet};
use lazy_static::lazy_static;

lazy_static! {
    static ref IRREGULAR: HashMap<&'static str, &'static str> = [
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("people", "people"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("leaves", "leaf"),
        ("halves", "half"),
        ("shelves", "shelf"),
        ("movies", "movie"),
        ("cookies", "cookie"),
        ("calories", "calorie"),
        ("indices", "index"),
        ("crises", "crisis"),
        ("analyses", "analysis"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
    ]
    .into_iter()
    .collect();

    static ref UNCHANGED: HashSet<&'static str> = [
        "news", "series", "species", "always", "perhaps", "whereas", "bias", "alias",
        "atlas", "canvas", "lens", "chaos", "ethos", "thus", "data", "media",
    ]
    .into_iter()
    .collect();
}

fn step(word: &str) -> Option<String> {
    if word.chars().count() <= 3 || UNCHANGED.contains(word) {
        return None;
    }
    if let Some(lemma) = IRREGULAR.get(word) {
        return (*lemma != word).then(|| lemma.to_string());
    }
    if word.ends_with("ies") && word.chars().count() > 4 {
        return Some(format!("{}y", &word[..word.len() - 3]));
    }
    if ["sses", "xes", "ches", "shes", "zzes"].iter().any(|suffix| word.ends_with(suffix)) {
        return Some(word[..word.len() - 2].to_string());
    }
    if ["ss", "us", "is"].iter().any(|suffix| word.ends_with(suffix)) {
        return None;
    }
    word.strip_suffix('s').map(str::to_string)
}

/// Reduces a lowercase token to its base form.
pub fn lemmatize(word: &str) -> String {
    let mut current = word.to_string();
    while let Some(next) = step(&current) {
        current = next;
    }
    current
}
