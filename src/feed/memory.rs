//! プロセス内で完結するコラボレータ実装。組み込み用途とテスト用。
use anyhow::Result;
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use super::{ArticleArchive, ArticleSource, ProfileStore, RetrievalQuery};
use crate::config::DecayFactor;
use crate::model::{
    ArticleCollection, CandidateArticle, InterestProfile, Preferences, ProfileDelta, RawArticle, TRENDING_CATEGORY,
};
use crate::profile::decay_in_place;
use crate::recommend::CategoryCorpus;

/// ユーザーごとのプロファイルと嗜好を保持する。書き込みロック 1 回で増分を適用する。
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<FxHashMap<String, InterestProfile>>,
    preferences: RwLock<FxHashMap<String, Preferences>>,
    collections: RwLock<FxHashMap<(String, ArticleCollection), Vec<String>>>,
}

impl InMemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のプロファイルを登録する。
    pub async fn insert_profile(&self, user_id: &str, profile: InterestProfile) {
        self.profiles
            .write()
            .await
            .insert(user_id.to_string(), profile);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load_profile(&self, user_id: &str) -> Result<InterestProfile> {
        Ok(self
            .profiles
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn increment(&self, user_id: &str, delta: &ProfileDelta) -> Result<()> {
        self.profiles
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .merge(delta);
        Ok(())
    }

    async fn scale_profile(&self, user_id: &str, factor: DecayFactor) -> Result<()> {
        if let Some(profile) = self.profiles.write().await.get_mut(user_id) {
            decay_in_place(profile, factor);
        }
        Ok(())
    }

    async fn reset_profile(&self, user_id: &str) -> Result<()> {
        if let Some(profile) = self.profiles.write().await.get_mut(user_id) {
            profile.reset();
        }
        Ok(())
    }

    async fn load_preferences(&self, user_id: &str) -> Result<Preferences> {
        Ok(self
            .preferences
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_preferences(&self, user_id: &str, preferences: &Preferences) -> Result<()> {
        self.preferences
            .write()
            .await
            .insert(user_id.to_string(), preferences.clone());
        Ok(())
    }

    async fn user_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.profiles.read().await.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn add_to_collection(
        &self,
        user_id: &str,
        collection: ArticleCollection,
        article_id: &str,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        let ids = collections
            .entry((user_id.to_string(), collection))
            .or_default();
        if !ids.iter().any(|id| id == article_id) {
            ids.push(article_id.to_string());
        }
        Ok(())
    }

    async fn collection(
        &self,
        user_id: &str,
        collection: ArticleCollection,
    ) -> Result<Vec<String>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&(user_id.to_string(), collection))
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_from_collection(
        &self,
        user_id: &str,
        collection: ArticleCollection,
        article_id: &str,
    ) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(ids) = collections.get_mut(&(user_id.to_string(), collection)) else {
            return Ok(false);
        };
        let before = ids.len();
        ids.retain(|id| id != article_id);
        Ok(ids.len() != before)
    }
}

#[derive(Debug, Default)]
struct ArchiveState {
    articles: Vec<CandidateArticle>,
    by_title: FxHashMap<String, usize>,
}

/// タイトル完全一致で重複排除する記事保管庫。
#[derive(Debug, Default)]
pub struct InMemoryArticleArchive {
    state: RwLock<ArchiveState>,
}

impl InMemoryArticleArchive {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.articles.is_empty()
    }
}

#[async_trait]
impl ArticleArchive for InMemoryArticleArchive {
    async fn record_articles(
        &self,
        articles: Vec<CandidateArticle>,
    ) -> Result<Vec<CandidateArticle>> {
        let mut state = self.state.write().await;
        let mut recorded = Vec::with_capacity(articles.len());
        for mut article in articles {
            let existing_id = state
                .by_title
                .get(&article.title)
                .and_then(|idx| state.articles.get(*idx))
                .map(|existing| existing.article_id.clone());
            if let Some(article_id) = existing_id {
                article.article_id = article_id;
            } else {
                let idx = state.articles.len();
                state.by_title.insert(article.title.clone(), idx);
                let mut stored = article.clone();
                stored.score = None;
                state.articles.push(stored);
            }
            recorded.push(article);
        }
        Ok(recorded)
    }

    async fn find_article(&self, article_id: &str) -> Result<Option<CandidateArticle>> {
        Ok(self
            .state
            .read()
            .await
            .articles
            .iter()
            .find(|article| article.article_id == article_id)
            .cloned())
    }

    async fn category_corpus(&self) -> Result<CategoryCorpus> {
        let state = self.state.read().await;
        Ok(state
            .articles
            .iter()
            .filter(|article| article.category != TRENDING_CATEGORY)
            .map(|article| (article.category.as_str(), article.text()))
            .collect())
    }
}

/// 事前に与えた記事を返す取得元。
#[derive(Debug, Default, Clone)]
pub struct StaticArticleSource {
    by_category: FxHashMap<String, Vec<RawArticle>>,
    trending: Vec<RawArticle>,
}

impl StaticArticleSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: &str, articles: Vec<RawArticle>) -> Self {
        self.by_category
            .entry(category.to_string())
            .or_default()
            .extend(articles);
        self
    }

    #[must_use]
    pub fn with_trending(mut self, articles: Vec<RawArticle>) -> Self {
        self.trending.extend(articles);
        self
    }
}

#[async_trait]
impl ArticleSource for StaticArticleSource {
    async fn fetch(&self, category: &str, query: &RetrievalQuery) -> Result<Vec<RawArticle>> {
        Ok(self
            .by_category
            .get(category)
            .map(|articles| {
                articles
                    .iter()
                    .take(query.per_category_limit())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn trending(&self, limit: usize) -> Result<Vec<RawArticle>> {
        Ok(self.trending.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collections_behave_like_sets() {
        let store = InMemoryProfileStore::new();
        for id in ["a1", "a2", "a1"] {
            store
                .add_to_collection("u1", ArticleCollection::Saved, id)
                .await
                .expect("add");
        }
        assert_eq!(
            store.collection("u1", ArticleCollection::Saved).await.expect("list"),
            vec!["a1", "a2"]
        );
        assert!(store.collection("u1", ArticleCollection::Liked).await.expect("list").is_empty());
        assert!(store.collection("u2", ArticleCollection::Saved).await.expect("list").is_empty());

        assert!(
            store
                .remove_from_collection("u1", ArticleCollection::Saved, "a1")
                .await
                .expect("remove")
        );
        assert!(
            !store
                .remove_from_collection("u1", ArticleCollection::Saved, "a1")
                .await
                .expect("remove again")
        );
        assert_eq!(
            store.collection("u1", ArticleCollection::Saved).await.expect("list"),
            vec!["a2"]
        );
    }

    #[tokio::test]
    async fn archive_keeps_one_article_per_title() {
        let archive = InMemoryArticleArchive::new();
        let first = archive
            .record_articles(vec![CandidateArticle::new("Same", "a", "science", "S")])
            .await
            .expect("record first");
        let second = archive
            .record_articles(vec![CandidateArticle::new("Same", "b", "science", "S")])
            .await
            .expect("record second");

        assert_eq!(archive.len().await, 1);
        assert_eq!(first[0].article_id, second[0].article_id);
        assert_eq!(second[0].description, "b");
    }

    #[tokio::test]
    async fn corpus_skips_trending_articles() {
        let archive = InMemoryArticleArchive::new();
        archive
            .record_articles(vec![
                CandidateArticle::new("Rover lands", "mars", "science", "S"),
                RawArticle::default().into_trending(),
            ])
            .await
            .expect("record");

        let corpus = archive.category_corpus().await.expect("corpus");
        assert_eq!(corpus.iter().collect::<Vec<_>>(), vec![("science", "Rover lands mars")]);
    }

    #[tokio::test]
    async fn store_applies_increments_and_decay() {
        let store = InMemoryProfileStore::new();
        let mut delta = ProfileDelta::default();
        delta.keywords.add("goal", 2.0);
        store.increment("u1", &delta).await.expect("increment");
        store.increment("u1", &delta).await.expect("increment");
        store
            .scale_profile("u1", DecayFactor::new(0.5).expect("valid factor"))
            .await
            .expect("scale");

        let profile = store.load_profile("u1").await.expect("load");
        assert!((profile.keywords.get("goal") - 2.0).abs() < f64::EPSILON);
        assert_eq!(store.user_ids().await.expect("ids"), vec!["u1"]);
    }

    #[tokio::test]
    async fn unknown_user_gets_defaults() {
        let store = InMemoryProfileStore::new();
        assert!(store.load_profile("nobody").await.expect("load").is_cold_start());
        assert_eq!(
            store.load_preferences("nobody").await.expect("load").categories,
            vec!["general"]
        );
    }
}
