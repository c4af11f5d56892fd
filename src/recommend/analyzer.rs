use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{InterestProfile, Preferences, WeightMap};
use crate::profile::LocationCatalog;
use crate::text::KeywordExtractor;

/// 次の取得に使う推薦リスト。各リストの長さは上限 N 以下。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ActivityAnalyzer {
    extractor: KeywordExtractor,
    locations: LocationCatalog,
    top_n: NonZeroUsize,
}

impl ActivityAnalyzer {
    #[must_use]
    pub fn new(extractor: KeywordExtractor, locations: LocationCatalog, top_n: NonZeroUsize) -> Self {
        Self {
            extractor,
            locations,
            top_n,
        }
    }

    #[must_use]
    pub fn top_n(&self) -> usize {
        self.top_n.get()
    }

    /// プロファイルの重み順リストに、まだ含まれていない明示的嗜好を宣言順で追記し、
    /// 上位 N 件に切り詰める。
    ///
    /// 嗜好は上書きではなく補完として働く。カテゴリが空で返った場合、呼び出し側は
    /// [`super::CategoryRanker`] にフォールバックする。
    #[must_use]
    pub fn analyze(&self, profile: &InterestProfile, preferences: &Preferences) -> Recommendation {
        let categories = self.merge(&profile.categories, preferences.categories.iter().cloned());

        let preference_keywords = self.extractor.extract(&preferences.keywords);
        let keywords = self.merge(&profile.keywords, preference_keywords.into_iter());

        // Profiles stored before the location dimension existed.
        let derived;
        let location_weights = if profile.locations.is_empty() {
            derived = self.locations.derive_from_keywords(&profile.keywords);
            &derived
        } else {
            &profile.locations
        };
        let locations = self.merge(location_weights, preferences.locations.iter().cloned());

        debug!(
            categories = categories.len(),
            keywords = keywords.len(),
            locations = locations.len(),
            "analyzed activity"
        );
        Recommendation {
            categories,
            keywords,
            locations,
        }
    }

    fn merge(&self, weights: &WeightMap, declared: impl Iterator<Item = String>) -> Vec<String> {
        let mut merged: Vec<String> = weights
            .ranked()
            .into_iter()
            .filter(|(_, weight)| *weight > 0.0)
            .map(|(name, _)| name.to_string())
            .collect();
        for value in declared {
            if !value.is_empty() && !merged.contains(&value) {
                merged.push(value);
            }
        }
        merged.truncate(self.top_n.get());
        merged
    }
}
