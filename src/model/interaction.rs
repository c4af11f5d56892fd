use serde::{Deserialize, Serialize};

use super::CandidateArticle;
use crate::config::InteractionWeights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Read,
    Save,
    Like,
    Search,
    Preference,
}

impl InteractionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Save => "save",
            Self::Like => "like",
            Self::Search => "search",
            Self::Preference => "preference",
        }
    }

    /// 設定された加算重みを引く。
    #[must_use]
    pub fn weight(self, weights: &InteractionWeights) -> f64 {
        match self {
            Self::Read => weights.read,
            Self::Save => weights.save,
            Self::Like => weights.like,
            Self::Search => weights.search,
            Self::Preference => weights.preference,
        }
    }

    /// 記事 ID を記録するユーザー単位のコレクション。いいね・保存のみ。
    #[must_use]
    pub fn collection(self) -> Option<ArticleCollection> {
        match self {
            Self::Like => Some(ArticleCollection::Liked),
            Self::Save => Some(ArticleCollection::Saved),
            Self::Read | Self::Search | Self::Preference => None,
        }
    }
}

/// ユーザーがいいね・保存した記事 ID の集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleCollection {
    Liked,
    Saved,
}

impl ArticleCollection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Saved => "saved",
        }
    }
}

/// プロファイル更新に必要な記事の一部。欠けた次元は更新しない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleSignal {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub source: Option<String>,
}

impl From<&CandidateArticle> for ArticleSignal {
    fn from(article: &CandidateArticle) -> Self {
        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            category: Some(article.category.clone()),
            source: Some(article.source.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InteractionSubject {
    Article(ArticleSignal),
    /// 検索語。タイトルだけを持つ疑似記事として扱う。
    Search(String),
    /// 嗜好設定の自由記述。
    PreferenceText(String),
}

/// 即座に消費される行動シグナル。永続化はしない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub kind: InteractionKind,
    pub subject: InteractionSubject,
    pub weight: f64,
}

impl InteractionEvent {
    #[must_use]
    pub fn article(kind: InteractionKind, article: ArticleSignal, weight: f64) -> Self {
        Self {
            kind,
            subject: InteractionSubject::Article(article),
            weight,
        }
    }

    #[must_use]
    pub fn search(query: impl Into<String>, weight: f64) -> Self {
        Self {
            kind: InteractionKind::Search,
            subject: InteractionSubject::Search(query.into()),
            weight,
        }
    }

    #[must_use]
    pub fn preference_text(text: impl Into<String>, weight: f64) -> Self {
        Self {
            kind: InteractionKind::Preference,
            subject: InteractionSubject::PreferenceText(text.into()),
            weight,
        }
    }

    /// キーワード抽出の対象テキスト。
    #[must_use]
    pub fn text(&self) -> String {
        match &self.subject {
            InteractionSubject::Article(article) => {
                format!("{} {}", article.title, article.description)
            }
            InteractionSubject::Search(text) | InteractionSubject::PreferenceText(text) => {
                text.clone()
            }
        }
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match &self.subject {
            InteractionSubject::Article(article) => article
                .category
                .as_deref()
                .filter(|category| !category.is_empty()),
            _ => None,
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        match &self.subject {
            InteractionSubject::Article(article) => {
                article.source.as_deref().filter(|source| !source.is_empty())
            }
            _ => None,
        }
    }
}
