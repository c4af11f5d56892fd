use serde::{Deserialize, Serialize};

use super::WeightMap;

/// ユーザーごとの関心プロファイル。
///
/// すべての重みは非負。全マップが空のプロファイルは「コールドスタート」として有効。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestProfile {
    pub categories: WeightMap,
    pub sources: WeightMap,
    pub keywords: WeightMap,
    pub locations: WeightMap,
}

/// 1 回のインタラクションで各次元に加算する増分。
///
/// ストア側はこれをフィールド単位のアトミックな加算として適用できる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDelta {
    pub categories: WeightMap,
    pub sources: WeightMap,
    pub keywords: WeightMap,
    pub locations: WeightMap,
}

impl ProfileDelta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.sources.is_empty()
            && self.keywords.is_empty()
            && self.locations.is_empty()
    }
}

impl InterestProfile {
    #[must_use]
    pub fn is_cold_start(&self) -> bool {
        self.categories.is_empty()
            && self.sources.is_empty()
            && self.keywords.is_empty()
            && self.locations.is_empty()
    }

    /// すべてのシグナルを消去する。
    pub fn reset(&mut self) {
        self.categories.clear();
        self.sources.clear();
        self.keywords.clear();
        self.locations.clear();
    }

    pub fn merge(&mut self, delta: &ProfileDelta) {
        self.categories.merge(&delta.categories);
        self.sources.merge(&delta.sources);
        self.keywords.merge(&delta.keywords);
        self.locations.merge(&delta.locations);
    }

    /// 全次元の重みに `factor` を掛ける。値域の検証は呼び出し側で行う。
    pub fn scale(&mut self, factor: f64) {
        self.categories.scale(factor);
        self.sources.scale(factor);
        self.keywords.scale(factor);
        self.locations.scale(factor);
    }
}
