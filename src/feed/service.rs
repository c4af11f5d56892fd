use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::{ArticleArchive, ArticleSource, ProfileStore, RetrievalQuery};
use crate::app::ComponentRegistry;
use crate::config::Config;
use crate::model::{
    ArticleCollection, ArticleSignal, CandidateArticle, InteractionEvent, InteractionKind, InterestProfile,
    Preferences, ProfileDelta,
};
use crate::observability::metrics::Metrics;
use crate::profile::ProfileUpdater;
use crate::ranking::ArticleRanker;
use crate::recommend::{ActivityAnalyzer, CategoryRanker, Recommendation};

const EXPLORE_NOTE: &str = "Explore recommendation";

/// 外部コラボレータ一式。
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn ProfileStore>,
    pub archive: Arc<dyn ArticleArchive>,
    pub source: Arc<dyn ArticleSource>,
}

/// 行動記録からフィード提供までを束ねる呼び出し側の実装。
///
/// コアの各部品は同期・純粋で、ここだけがコラボレータとの非同期 I/O を持つ。
#[derive(Clone)]
pub struct FeedService {
    config: Arc<Config>,
    metrics: Arc<Metrics>,
    updater: ProfileUpdater,
    analyzer: ActivityAnalyzer,
    category_ranker: CategoryRanker,
    ranker: ArticleRanker,
    store: Arc<dyn ProfileStore>,
    archive: Arc<dyn ArticleArchive>,
    source: Arc<dyn ArticleSource>,
}

impl FeedService {
    #[must_use]
    pub fn new(registry: &ComponentRegistry, collaborators: Collaborators) -> Self {
        Self {
            config: registry.config(),
            metrics: registry.metrics(),
            updater: registry.updater().clone(),
            analyzer: registry.analyzer().clone(),
            category_ranker: registry.category_ranker().clone(),
            ranker: registry.article_ranker().clone(),
            store: collaborators.store,
            archive: collaborators.archive,
            source: collaborators.source,
        }
    }

    /// 記事へのインタラクションをプロファイルに反映する。
    ///
    /// 既読は読了時間の共有に同意したユーザーのみ記録する。反映しなかった場合は `None`。
    /// いいね・保存は記事 ID をユーザーのコレクションにも追加する。
    ///
    /// # Errors
    /// 嗜好の読み込み、増分の保存、コレクションへの追加に失敗した場合。
    pub async fn record_interaction(
        &self,
        user_id: &str,
        kind: InteractionKind,
        article: &CandidateArticle,
    ) -> Result<Option<ProfileDelta>> {
        if kind == InteractionKind::Read {
            let preferences = self
                .store
                .load_preferences(user_id)
                .await
                .context("failed to load preferences")?;
            if !preferences.share_read_time {
                debug!(user_id, "read-time sharing disabled; ignoring read event");
                self.metrics.interactions_skipped.inc();
                return Ok(None);
            }
        }

        let weight = kind.weight(&self.config.interaction_weights());
        let event = InteractionEvent::article(kind, ArticleSignal::from(article), weight);
        let delta = self.apply_event(user_id, &event).await?;

        if let Some(collection) = kind.collection()
            && !article.article_id.is_empty()
        {
            self.store
                .add_to_collection(user_id, collection, &article.article_id)
                .await
                .context("failed to record article in collection")?;
            debug!(
                user_id,
                collection = collection.as_str(),
                article_id = %article.article_id,
                "recorded article in collection"
            );
        }
        Ok(delta)
    }

    /// いいねした記事を追加順で返す。保管庫から消えた記事は飛ばす。
    ///
    /// # Errors
    /// コレクションか記事の読み込みに失敗した場合。
    pub async fn liked_articles(&self, user_id: &str) -> Result<Vec<CandidateArticle>> {
        self.collection_articles(user_id, ArticleCollection::Liked)
            .await
    }

    /// 保存した記事を追加順で返す。保管庫から消えた記事は飛ばす。
    ///
    /// # Errors
    /// コレクションか記事の読み込みに失敗した場合。
    pub async fn saved_articles(&self, user_id: &str) -> Result<Vec<CandidateArticle>> {
        self.collection_articles(user_id, ArticleCollection::Saved)
            .await
    }

    /// 保存済みから外す。プロファイルの重みは戻さない。
    ///
    /// # Errors
    /// ストアの操作に失敗した場合。
    pub async fn remove_saved_article(&self, user_id: &str, article_id: &str) -> Result<bool> {
        self.store
            .remove_from_collection(user_id, ArticleCollection::Saved, article_id)
            .await
            .context("failed to remove saved article")
    }

    /// 保管庫の記事 ID を指定してインタラクションを記録する。
    ///
    /// # Errors
    /// 記事が見つからない場合、または [`FeedService::record_interaction`] が失敗した場合。
    pub async fn record_article_interaction(
        &self,
        user_id: &str,
        kind: InteractionKind,
        article_id: &str,
    ) -> Result<Option<ProfileDelta>> {
        let article = self
            .archive
            .find_article(article_id)
            .await
            .context("failed to look up article")?
            .ok_or_else(|| anyhow!("article not found: {article_id}"))?;
        self.record_interaction(user_id, kind, &article).await
    }

    /// 検索語をタイトルだけの疑似記事として記録する。
    ///
    /// # Errors
    /// 増分の保存に失敗した場合。
    pub async fn record_search(&self, user_id: &str, query: &str) -> Result<Option<ProfileDelta>> {
        let weight = InteractionKind::Search.weight(&self.config.interaction_weights());
        self.apply_event(user_id, &InteractionEvent::search(query, weight))
            .await
    }

    /// 嗜好を丸ごと保存し、自由記述のキーワードをシグナルとしても反映する。
    ///
    /// # Errors
    /// 嗜好か増分の保存に失敗した場合。
    pub async fn save_preferences(&self, user_id: &str, preferences: &Preferences) -> Result<()> {
        self.store
            .save_preferences(user_id, preferences)
            .await
            .context("failed to save preferences")?;
        if !preferences.keywords.trim().is_empty() {
            let weight = InteractionKind::Preference.weight(&self.config.interaction_weights());
            let event = InteractionEvent::preference_text(preferences.keywords.clone(), weight);
            self.apply_event(user_id, &event).await?;
        }
        Ok(())
    }

    /// # Errors
    /// ストアの操作に失敗した場合。
    pub async fn reset_profile(&self, user_id: &str) -> Result<()> {
        self.store
            .reset_profile(user_id)
            .await
            .context("failed to reset profile")
    }

    /// 全ユーザーのプロファイルを設定の減衰係数で縮める。処理したユーザー数を返す。
    ///
    /// # Errors
    /// ユーザー一覧の取得か減衰の適用に失敗した場合。
    pub async fn apply_decay(&self) -> Result<usize> {
        let factor = self.config.decay_factor();
        let user_ids = self
            .store
            .user_ids()
            .await
            .context("failed to list users")?;
        for user_id in &user_ids {
            self.store
                .scale_profile(user_id, factor)
                .await
                .with_context(|| format!("failed to decay profile for {user_id}"))?;
        }
        self.metrics.decay_runs.inc();
        info!(users = user_ids.len(), factor = factor.get(), "applied profile decay");
        Ok(user_ids.len())
    }

    /// 取得条件を決める。
    ///
    /// カテゴリは行動履歴と嗜好から、無ければ TF-IDF 類似度、それも無ければ既定カテゴリ。
    ///
    /// # Errors
    /// TF-IDF 用のコーパス取得に失敗した場合。
    pub async fn recommend(
        &self,
        profile: &InterestProfile,
        preferences: &Preferences,
    ) -> Result<Recommendation> {
        let mut recommendation = self.analyzer.analyze(profile, preferences);
        if !recommendation.categories.is_empty() {
            return Ok(recommendation);
        }

        let corpus = self
            .archive
            .category_corpus()
            .await
            .context("failed to build category corpus")?;
        let mut ranked = self
            .category_ranker
            .rank_categories(&recommendation.keywords, &corpus);
        ranked.truncate(self.analyzer.top_n());
        if ranked.is_empty() {
            self.metrics.default_category_fallbacks.inc();
            ranked = self.config.default_categories().to_vec();
            ranked.truncate(self.analyzer.top_n());
        } else {
            self.metrics.category_fallbacks.inc();
        }
        debug!(categories = ?ranked, "filled empty category recommendation");
        recommendation.categories = ranked;
        Ok(recommendation)
    }

    /// "for you" フィードを組み立てる。
    ///
    /// 推薦 → カテゴリ別取得 → 保管 → 採点・並べ替え の順。採点後に記事が残らなければ
    /// 未ランクのトレンド記事を返す。
    ///
    /// # Errors
    /// プロファイル・嗜好の読み込み、コーパス取得、保管に失敗した場合。
    /// カテゴリ単位の取得失敗はログに残してスキップする。
    #[allow(clippy::cast_precision_loss)]
    pub async fn personalized_feed(&self, user_id: &str) -> Result<Vec<CandidateArticle>> {
        let _timer = self.metrics.feed_duration.start_timer();
        let policy = self.config.feed_policy();

        let profile = self
            .store
            .load_profile(user_id)
            .await
            .context("failed to load profile")?;
        let preferences = self
            .store
            .load_preferences(user_id)
            .await
            .context("failed to load preferences")?;
        let recommendation = self.recommend(&profile, &preferences).await?;

        let query = RetrievalQuery::new(
            recommendation.categories.clone(),
            preferences.keywords.clone(),
            recommendation.locations.clone(),
            policy.article_limit,
        );
        let candidates = self.retrieve(&query).await;
        let candidates = self
            .archive
            .record_articles(candidates)
            .await
            .context("failed to archive candidate articles")?;

        let mut articles = {
            let _rank_timer = self.metrics.rank_duration.start_timer();
            self.metrics.articles_ranked.inc_by(candidates.len() as f64);
            self.ranker
                .rank_with_locations(candidates, &profile, &recommendation.locations)
        };
        if policy.drop_zero_scores {
            articles.retain(|article| article.score.unwrap_or_default() > 0.0);
        }

        if articles.is_empty() {
            warn!(user_id, "no ranked articles; falling back to trending");
            self.metrics.feed_fallbacks.inc();
            articles = self.trending_or_empty(policy.article_limit.get()).await;
        } else if preferences.experimental_opt_in && policy.explore_limit > 0 {
            let mut explore = self.trending_or_empty(policy.explore_limit).await;
            for article in &mut explore {
                article.append_explanation(EXPLORE_NOTE);
                article.score = Some(0.0);
            }
            self.metrics.explore_articles.inc_by(explore.len() as f64);
            articles.extend(explore);
        }

        if !policy.expose_scores {
            for article in &mut articles {
                article.score = None;
            }
        }

        self.metrics.feeds_served.inc();
        info!(
            user_id,
            categories = ?recommendation.categories,
            articles = articles.len(),
            "served personalized feed"
        );
        Ok(articles)
    }

    /// カテゴリ指定なしのトレンド記事。
    ///
    /// # Errors
    /// 取得か保管に失敗した場合。
    pub async fn explore(&self, limit: usize) -> Result<Vec<CandidateArticle>> {
        let raw = self
            .source
            .trending(limit)
            .await
            .context("failed to fetch trending articles")?;
        let articles = raw.into_iter().take(limit).map(|article| article.into_trending()).collect();
        self.archive
            .record_articles(articles)
            .await
            .context("failed to archive trending articles")
    }

    async fn trending_or_empty(&self, limit: usize) -> Vec<CandidateArticle> {
        match self.explore(limit).await {
            Ok(articles) => articles,
            Err(error) => {
                warn!(error = %error, "trending retrieval failed");
                self.metrics.retrieval_failures.inc();
                Vec::new()
            }
        }
    }

    /// カテゴリごとに並行取得する。失敗したカテゴリは飛ばす。
    async fn retrieve(&self, query: &RetrievalQuery) -> Vec<CandidateArticle> {
        let per_category = query.per_category_limit();
        let fetches = query.categories.iter().map(|category| async move {
            (category, self.source.fetch(category, query).await)
        });

        let mut candidates = Vec::new();
        for (category, result) in join_all(fetches).await {
            match result {
                Ok(raw) => candidates.extend(
                    raw.into_iter()
                        .take(per_category)
                        .map(|article| article.normalize(category, query.keyword_filter())),
                ),
                Err(error) => {
                    warn!(category = %category, error = %error, "candidate retrieval failed");
                    self.metrics.retrieval_failures.inc();
                }
            }
        }
        candidates
    }

    async fn collection_articles(
        &self,
        user_id: &str,
        collection: ArticleCollection,
    ) -> Result<Vec<CandidateArticle>> {
        let ids = self
            .store
            .collection(user_id, collection)
            .await
            .with_context(|| format!("failed to load {} articles", collection.as_str()))?;

        let mut articles = Vec::with_capacity(ids.len());
        for article_id in &ids {
            match self
                .archive
                .find_article(article_id)
                .await
                .context("failed to look up article")?
            {
                Some(article) => articles.push(article),
                None => debug!(user_id, article_id = %article_id, "collection entry no longer archived"),
            }
        }
        Ok(articles)
    }

    async fn apply_event(
        &self,
        user_id: &str,
        event: &InteractionEvent,
    ) -> Result<Option<ProfileDelta>> {
        let delta = self.updater.delta(event);
        if delta.is_empty() {
            self.metrics.interactions_skipped.inc();
            return Ok(None);
        }
        self.store
            .increment(user_id, &delta)
            .await
            .context("failed to store profile increment")?;
        self.metrics.profile_updates.inc();
        debug!(user_id, kind = event.kind.as_str(), "recorded interaction");
        Ok(Some(delta))
    }
}
