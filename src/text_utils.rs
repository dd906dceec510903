use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IMAGE_REGEX: Regex = Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref LINK_REGEX: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref CODE_REGEX: Regex = Regex::new(r"`([^`]*)`").unwrap();
    static ref HEADING_REGEX: Regex = Regex::new(r"(?m)^#{1,6}\s+").unwrap();
    static ref QUOTE_REGEX: Regex = Regex::new(r"(?m)^>\s?").unwrap();
    static ref EMPHASIS_REGEX: Regex = Regex::new(r"(\*\*|__|\*|~~)").unwrap();
}

/// Flattens markdown to plain text. Good enough for one-paragraph previews,
/// not a general converter.
pub fn strip_markdown(md_text: &str) -> String {
    let text = IMAGE_REGEX.replace_all(md_text, "$1");
    let text = LINK_REGEX.replace_all(&text, "$1");
    let text = CODE_REGEX.replace_all(&text, "$1");
    let text = HEADING_REGEX.replace_all(&text, "");
    let text = QUOTE_REGEX.replace_all(&text, "");
    let text = EMPHASIS_REGEX.replace_all(&text, "");
    text.trim().to_string()
}

pub fn first_paragraph(body: &str) -> &str {
    body.trim_start_matches('\n').split("\n\n").next().unwrap_or("")
}

/// Plain-text preview of a markdown body, computed once when content loads.
pub fn excerpt_of(body: &str) -> String {
    strip_markdown(first_paragraph(body))
}

pub fn format_date_time(date_time: &NaiveDateTime) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}
