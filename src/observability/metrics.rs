/// Prometheusメトリクス定義。
use prometheus::{
    Counter, Histogram, HistogramOpts, Registry, register_counter_with_registry,
    register_histogram_with_registry,
};
use std::sync::Arc;

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    // カウンター
    pub profile_updates: Counter,
    pub interactions_skipped: Counter,
    pub articles_ranked: Counter,
    pub feeds_served: Counter,
    pub feed_fallbacks: Counter,
    pub explore_articles: Counter,
    pub category_fallbacks: Counter,
    pub default_category_fallbacks: Counter,
    pub retrieval_failures: Counter,
    pub decay_runs: Counter,

    // ヒストグラム
    pub rank_duration: Histogram,
    pub feed_duration: Histogram,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成する。
    ///
    /// # Errors
    /// 同じレジストリに同名のメトリクスが登録済みの場合。
    pub fn new(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            profile_updates: register_counter_with_registry!(
                "feed_profile_updates_total",
                "Total number of interaction events applied to interest profiles",
                registry
            )?,
            interactions_skipped: register_counter_with_registry!(
                "feed_interactions_skipped_total",
                "Interaction events ignored (read-time sharing disabled or empty delta)",
                registry
            )?,
            articles_ranked: register_counter_with_registry!(
                "feed_articles_ranked_total",
                "Total number of candidate articles scored",
                registry
            )?,
            feeds_served: register_counter_with_registry!(
                "feed_served_total",
                "Total number of personalized feeds assembled",
                registry
            )?,
            feed_fallbacks: register_counter_with_registry!(
                "feed_trending_fallback_total",
                "Feeds that fell back to the unranked trending set",
                registry
            )?,
            explore_articles: register_counter_with_registry!(
                "feed_explore_articles_total",
                "Trending articles mixed into feeds for experimental opt-in users",
                registry
            )?,
            category_fallbacks: register_counter_with_registry!(
                "feed_category_ranker_fallback_total",
                "Recommendations whose categories came from tf-idf similarity",
                registry
            )?,
            default_category_fallbacks: register_counter_with_registry!(
                "feed_default_category_fallback_total",
                "Recommendations that used the configured default categories",
                registry
            )?,
            retrieval_failures: register_counter_with_registry!(
                "feed_retrieval_failures_total",
                "Candidate retrieval calls that failed and were skipped",
                registry
            )?,
            decay_runs: register_counter_with_registry!(
                "feed_decay_runs_total",
                "Total number of profile decay passes",
                registry
            )?,
            rank_duration: register_histogram_with_registry!(
                HistogramOpts::new(
                    "feed_rank_duration_seconds",
                    "Duration of article scoring and sorting"
                )
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
                registry
            )?,
            feed_duration: register_histogram_with_registry!(
                "feed_assembly_duration_seconds",
                "Duration of personalized feed assembly",
                registry
            )?,
        })
    }
}
