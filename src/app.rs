use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::Config,
    feed::{Collaborators, FeedService},
    observability::{Telemetry, metrics::Metrics},
    profile::{LocationCatalog, ProfileUpdater},
    ranking::ArticleRanker,
    recommend::{ActivityAnalyzer, CategoryRanker},
    text::{KeywordExtractor, Stopwords, SynonymBounds, Thesaurus},
};

/// 構成から組み立てたパーソナライズ部品の共有レジストリ。
pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    extractor: KeywordExtractor,
    updater: ProfileUpdater,
    analyzer: ActivityAnalyzer,
    category_ranker: CategoryRanker,
    article_ranker: ArticleRanker,
}

impl ComponentRegistry {
    /// 構成情報と依存をまとめて初期化する。
    ///
    /// # Errors
    /// Telemetry の初期化や類義語辞書の読み込みが失敗した場合はエラーを返す。
    pub fn build(config: Config) -> Result<Self> {
        let telemetry = Telemetry::new()?;
        Self::with_telemetry(config, telemetry)
    }

    /// 既存の Telemetry を使って組み立てる。グローバルなサブスクライバは設定しない。
    ///
    /// # Errors
    /// 類義語辞書の読み込みに失敗した場合。
    pub fn with_telemetry(config: Config, telemetry: Telemetry) -> Result<Self> {
        let config = Arc::new(config);
        let extractor = build_extractor(&config)?;
        let locations = LocationCatalog::new(config.locations(), &extractor);

        let updater = ProfileUpdater::new(extractor.clone(), locations.clone());
        let analyzer =
            ActivityAnalyzer::new(extractor.clone(), locations, config.recommendation_size());
        let category_ranker = CategoryRanker::new(config.tfidf_stopwords(), extractor.stemmer())
            .with_known_categories(config.categories());
        let article_ranker = ArticleRanker::new(extractor.clone(), config.scoring_weights());

        info!(
            locations = config.locations().len(),
            categories = config.categories().len(),
            recommendation_size = config.recommendation_size().get(),
            "personalization components initialized"
        );

        Ok(Self {
            config,
            telemetry,
            extractor,
            updater,
            analyzer,
            category_ranker,
            article_ranker,
        })
    }

    /// コラボレータを受け取ってフィードサービスを作る。
    #[must_use]
    pub fn feed_service(&self, collaborators: Collaborators) -> FeedService {
        FeedService::new(self, collaborators)
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<Metrics> {
        self.telemetry.metrics_arc()
    }

    #[must_use]
    pub fn extractor(&self) -> &KeywordExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn updater(&self) -> &ProfileUpdater {
        &self.updater
    }

    #[must_use]
    pub fn analyzer(&self) -> &ActivityAnalyzer {
        &self.analyzer
    }

    #[must_use]
    pub fn category_ranker(&self) -> &CategoryRanker {
        &self.category_ranker
    }

    #[must_use]
    pub fn article_ranker(&self) -> &ArticleRanker {
        &self.article_ranker
    }
}

fn build_extractor(config: &Config) -> Result<KeywordExtractor> {
    let thesaurus = match config.thesaurus_path() {
        Some(path) => Thesaurus::from_path(path)
            .with_context(|| format!("failed to load thesaurus from {}", path.display()))?,
        None => Thesaurus::builtin(),
    };
    let stopwords = config
        .extraction_stopwords()
        .map_or_else(Stopwords::extraction_default, Stopwords::from_words);

    Ok(KeywordExtractor::builder()
        .with_stopwords(stopwords)
        .with_thesaurus(Arc::new(thesaurus))
        .with_synonym_bounds(SynonymBounds {
            max_synsets: config.synonym_synsets(),
            max_lemmas: config.synonym_lemmas(),
        })
        .build())
}
