//! Legal text preprocessing
//!
//! Turns the HTML body of a document (`content`) into plain text and splits
//! it into its numbered articles (`Điều 1.`, `Điều 2.`, ...).

use regex::Regex;
use scraper::Html;
use serde::Serialize;
use std::sync::LazyLock;

/// An article heading at the start of a line: `Điều 12.`
static ARTICLE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*Điều \d+\.").expect("article heading regex is valid")
});

/// Runs of carriage returns, newlines and tabs
static ESCAPE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\r\n\t]+").expect("escape run regex is valid")
});

/// One numbered article of a legal document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Position of the article within the document, from 0
    pub index: usize,
    pub title: String,
    pub content: String,
}

/// Extracts the visible text of an HTML fragment
///
/// Tags are dropped and entities decoded. Each non-blank text node becomes
/// one line of the result.
pub fn clean_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replaces every run of `\r`, `\n` and `\t` with one space and trims
pub fn collapse_whitespace(text: &str) -> String {
    ESCAPE_RUN.replace_all(text, " ").trim().to_string()
}

/// Splits plain text into articles
///
/// An article starts at a line beginning with `Điều N.` and runs to the next
/// such line or the end of the text. Its first line is the title, the rest
/// the content. Text before the first heading is ignored.
pub fn extract_articles(text: &str) -> Vec<Article> {
    let starts: Vec<usize> = ARTICLE_HEADING.find_iter(text).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            let end = starts.get(index + 1).copied().unwrap_or(text.len());
            let segment = text[start..end].trim();
            let (title, content) = segment.split_once('\n').unwrap_or((segment, ""));
            Article {
                index,
                title: collapse_whitespace(title),
                content: collapse_whitespace(content),
            }
        })
        .collect()
}

/// Cleans an HTML body and splits it into articles
pub fn process(html: &str) -> Vec<Article> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    extract_articles(&clean_html(html))
}
