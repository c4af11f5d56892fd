//! 英語ニュース向けの保守的なトークナイザ。
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9_-]+").expect("compile keyword token regex"));

// Two or more word characters, as in the usual TF-IDF analyzers.
static TERM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("compile tf-idf term regex"));

fn normalize_text(input: &str) -> String {
    input.nfkc().collect::<String>().to_lowercase()
}

/// 小文字化したテキストを英数字・ハイフン・アンダースコアの並びで分割する。
///
/// 記号だけのトークン（`-` など）は捨て、前後のハイフン／アンダースコアは削る。
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    WORD_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().trim_matches(|c| c == '-' || c == '_'))
        .filter(|token| token.chars().any(|c| c.is_ascii_alphanumeric()))
        .map(ToString::to_string)
        .collect()
}

/// TF-IDF 用の語を取り出す。
pub(crate) fn analyze_terms(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    TERM_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}
