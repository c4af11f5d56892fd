use std::num::NonZeroUsize;

use serde::Serialize;

/// 取得クライアントへ渡す検索条件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalQuery {
    pub categories: Vec<String>,
    /// 嗜好の自由記述そのまま。
    pub keywords: String,
    pub locations: Vec<String>,
    pub limit: NonZeroUsize,
}

impl RetrievalQuery {
    #[must_use]
    pub fn new(
        categories: Vec<String>,
        keywords: impl Into<String>,
        locations: Vec<String>,
        limit: NonZeroUsize,
    ) -> Self {
        Self {
            categories,
            keywords: keywords.into(),
            locations,
            limit,
        }
    }

    /// 全体の上限をカテゴリ数で割った 1 カテゴリあたりの件数。最低 1 件。
    #[must_use]
    pub fn per_category_limit(&self) -> usize {
        (self.limit.get() / self.categories.len().max(1)).max(1)
    }

    /// 空白を除いたキーワード。無ければ `None`。
    #[must_use]
    pub fn keyword_filter(&self) -> Option<&str> {
        let keywords = self.keywords.trim();
        (!keywords.is_empty()).then_some(keywords)
    }

    /// `"<keywords> <loc1 OR loc2 ...>"` 形式の検索文字列。条件が無ければ `None`。
    #[must_use]
    pub fn query_string(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::with_capacity(2);
        if let Some(keywords) = self.keyword_filter() {
            parts.push(keywords.to_string());
        }
        if !self.locations.is_empty() {
            parts.push(self.locations.join(" OR "));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}
