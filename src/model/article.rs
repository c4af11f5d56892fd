use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// トレンド記事に付けるカテゴリ。
pub const TRENDING_CATEGORY: &str = "explore";

const NO_TITLE: &str = "No Title";
const NO_DESCRIPTION: &str = "No Description";
const NO_URL: &str = "#";
const UNKNOWN_SOURCE: &str = "Unknown";

/// 取得元が返す記事レコード。
///
/// どのフィールドも欠落・型違いがあり得るため、文字列以外は `None` として読む。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawArticle {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, alias = "urlToImage", deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default, alias = "publishedAt", deserialize_with = "lenient_string")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
}

/// `source` は文字列か `{ "name": .. }` のどちらか。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawSource {
    Name(String),
    Object {
        #[serde(default, deserialize_with = "lenient_string")]
        name: Option<String>,
    },
    Other(Value),
}

impl RawSource {
    fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Object { name } => name.as_deref(),
            Self::Other(_) => None,
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

/// ランキング対象の候補記事。
///
/// `score` は 1 回のランキング呼び出しの中でだけ比較可能で、永続化しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateArticle {
    pub article_id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub published_at: String,
    pub source: String,
    pub category: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl RawArticle {
    /// 既定値を埋めて候補記事にする。説明文には取得条件を記録する。
    #[must_use]
    pub fn normalize(self, category: &str, keyword_filter: Option<&str>) -> CandidateArticle {
        let mut explanation = format!("Matched category '{category}'");
        if let Some(keywords) = keyword_filter.filter(|keywords| !keywords.trim().is_empty()) {
            explanation.push_str(&format!(" and keywords '{keywords}'"));
        }
        self.into_candidate(category, explanation)
    }

    /// カテゴリ指定なしのトレンド記事として取り込む。
    #[must_use]
    pub fn into_trending(self) -> CandidateArticle {
        self.into_candidate(TRENDING_CATEGORY, "Trending article".to_string())
    }

    fn into_candidate(self, category: &str, explanation: String) -> CandidateArticle {
        let source = self
            .source
            .as_ref()
            .and_then(RawSource::name)
            .unwrap_or(UNKNOWN_SOURCE)
            .to_string();
        CandidateArticle {
            article_id: Uuid::new_v4().to_string(),
            title: self.title.unwrap_or_else(|| NO_TITLE.to_string()),
            description: self.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            url: self.url.unwrap_or_else(|| NO_URL.to_string()),
            image_url: self.image_url.unwrap_or_default(),
            published_at: self.published_at.unwrap_or_default(),
            source,
            category: category.to_string(),
            explanation,
            score: None,
        }
    }
}

impl CandidateArticle {
    /// 最小限のフィールドから組み立てる。テストや疑似記事向け。
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            article_id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            url: NO_URL.to_string(),
            image_url: String::new(),
            published_at: String::new(),
            source: source.into(),
            category: category.into(),
            explanation: String::new(),
            score: None,
        }
    }

    /// キーワード抽出に使う本文（タイトル + 説明）。
    #[must_use]
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// 説明文に ` | ` 区切りで追記する。
    pub fn append_explanation(&mut self, note: &str) {
        if note.is_empty() {
            return;
        }
        if !self.explanation.is_empty() {
            self.explanation.push_str(" | ");
        }
        self.explanation.push_str(note);
    }
}
