use rustc_hash::FxHashMap;

use crate::model::WeightMap;
use crate::text::KeywordExtractor;

/// 固定の地域一覧と、キーワードから地域名への照合表。
///
/// 照合は大文字小文字を区別せず、語幹化後のキーワードとも一致させる。
#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    names: Vec<String>,
    by_key: FxHashMap<String, usize>,
}

impl LocationCatalog {
    #[must_use]
    pub fn new<S: AsRef<str>>(locations: &[S], extractor: &KeywordExtractor) -> Self {
        let mut names: Vec<String> = Vec::with_capacity(locations.len());
        let mut by_key = FxHashMap::default();
        for location in locations {
            let name = location.as_ref().trim();
            if name.is_empty() || names.iter().any(|known| known == name) {
                continue;
            }
            let idx = names.len();
            names.push(name.to_string());
            let lower = name.to_lowercase();
            by_key.entry(extractor.stem(&lower)).or_insert(idx);
            by_key.entry(lower).or_insert(idx);
        }
        Self { names, by_key }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// キーワードが地域名と一致すれば正規の地域名を返す。
    #[must_use]
    pub fn match_keyword(&self, keyword: &str) -> Option<&str> {
        self.by_key
            .get(&keyword.to_lowercase())
            .and_then(|idx| self.names.get(*idx))
            .map(String::as_str)
    }

    /// 地域次元を持たない古いプロファイル向けに、キーワード重みから地域重みを導く。
    #[must_use]
    pub fn derive_from_keywords(&self, keywords: &WeightMap) -> WeightMap {
        let mut derived = WeightMap::new();
        for (keyword, weight) in keywords.iter() {
            if let Some(location) = self.match_keyword(keyword) {
                derived.add(location, weight);
            }
        }
        derived
    }
}
