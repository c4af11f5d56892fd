use tracing::debug;

use super::LocationCatalog;
use crate::model::{InteractionEvent, InterestProfile, ProfileDelta};
use crate::text::KeywordExtractor;

/// インタラクションからプロファイルの増分を作り、適用する。
#[derive(Debug, Clone)]
pub struct ProfileUpdater {
    extractor: KeywordExtractor,
    locations: LocationCatalog,
}

impl ProfileUpdater {
    #[must_use]
    pub fn new(extractor: KeywordExtractor, locations: LocationCatalog) -> Self {
        Self {
            extractor,
            locations,
        }
    }

    #[must_use]
    pub fn extractor(&self) -> &KeywordExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn locations(&self) -> &LocationCatalog {
        &self.locations
    }

    /// イベント 1 件分の増分。
    ///
    /// カテゴリ・ソースが無ければその次元は更新しない。キーワードは重複なしで
    /// それぞれ `weight` を加算し、地域名と一致したものは地域次元にも加算する。
    #[must_use]
    pub fn delta(&self, event: &InteractionEvent) -> ProfileDelta {
        let mut delta = ProfileDelta::default();
        let weight = event.weight;
        if !(weight.is_finite() && weight > 0.0) {
            debug!(kind = event.kind.as_str(), weight, "skipping non-positive interaction weight");
            return delta;
        }

        if let Some(category) = event.category() {
            delta.categories.add(category, weight);
        }
        if let Some(source) = event.source() {
            delta.sources.add(source, weight);
        }
        for keyword in self.extractor.extract(&event.text()) {
            if let Some(location) = self.locations.match_keyword(&keyword) {
                delta.locations.add(location, weight);
            }
            delta.keywords.add(&keyword, weight);
        }

        debug!(
            kind = event.kind.as_str(),
            weight,
            keywords = delta.keywords.len(),
            locations = delta.locations.len(),
            "computed profile delta"
        );
        delta
    }

    /// 呼び出し側が排他的に保持するプロファイルへ増分を適用し、その増分を返す。
    pub fn apply(&self, profile: &mut InterestProfile, event: &InteractionEvent) -> ProfileDelta {
        let delta = self.delta(event);
        profile.merge(&delta);
        delta
    }

    /// 更新後のプロファイルを返す純粋関数版。
    #[must_use]
    pub fn update(&self, mut profile: InterestProfile, event: &InteractionEvent) -> InterestProfile {
        self.apply(&mut profile, event);
        profile
    }
}
