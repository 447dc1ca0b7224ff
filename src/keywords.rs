/// Keyword extraction from link titles and URLs
use std::sync::LazyLock;

use regex::Regex;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("punctuation pattern"));

static URL_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("separator pattern"));

/// Words long enough to pass the length filter that still say nothing about a category
const STOPWORDS: &[&str] = &[
    "about", "after", "best", "been", "before", "deal", "deals", "free", "from", "have", "here",
    "home", "html", "http", "https", "index", "into", "just", "login", "more", "news", "official",
    "online", "page", "sale", "sign", "site", "than", "that", "their", "them", "there", "they",
    "this", "what", "when", "where", "which", "will", "with", "your",
];

/// Turn free text into candidate keywords
///
/// Lowercases, strips everything that is not a letter, digit or whitespace,
/// splits on whitespace, then drops tokens that are shorter than `min_len`,
/// purely numeric, or stopwords. Order of appearance is kept.
pub fn extract_keywords(text: &str, min_len: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = PUNCTUATION.replace_all(&lowered, "");

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= min_len)
        .filter(|token| !token.chars().all(|c| c.is_numeric()))
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Keywords of a URL, treating every separator (`/`, `.`, `-`, `?` ...) as a word break
pub fn url_keywords(url: &str, min_len: usize) -> Vec<String> {
    let spaced = URL_SEPARATORS.replace_all(url, " ");
    extract_keywords(&spaced, min_len)
}
