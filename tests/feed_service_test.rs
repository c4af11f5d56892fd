use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use feed_personalizer::app::ComponentRegistry;
use feed_personalizer::config::{Config, FeedPolicy};
use feed_personalizer::feed::{
    ArticleArchive, ArticleSource, Collaborators, FeedService, InMemoryArticleArchive,
    InMemoryProfileStore, ProfileStore, RetrievalQuery, StaticArticleSource,
};
use feed_personalizer::model::{
    CandidateArticle, InteractionKind, InterestProfile, Preferences, RawArticle,
};
use feed_personalizer::observability::Telemetry;
use prometheus::Registry;

fn raw(title: &str, description: &str, source: &str) -> RawArticle {
    serde_json::from_value(serde_json::json!({
        "title": title,
        "description": description,
        "url": format!("https://news.example/{}", title.to_lowercase().replace(' ', "-")),
        "source": { "id": null, "name": source },
    }))
    .expect("raw article")
}

fn source() -> StaticArticleSource {
    StaticArticleSource::new()
        .with_category(
            "technology",
            vec![
                raw("AI breakthrough", "new ai chip", "TechSite"),
                raw("Cloud outage", "servers down for hours", "Wire"),
            ],
        )
        .with_category("sports", vec![raw("Sports recap", "soccer match", "SportsSite")])
        .with_category("general", vec![raw("Weather update", "rain expected", "Wire")])
        .with_trending(vec![
            raw("Trending one", "viral story", "Wire"),
            raw("Trending two", "another story", "Wire"),
        ])
}

struct Harness {
    service: FeedService,
    store: Arc<InMemoryProfileStore>,
    archive: Arc<InMemoryArticleArchive>,
    telemetry: Telemetry,
}

fn harness_with(config: Config, source: Arc<dyn ArticleSource>) -> Harness {
    let telemetry = Telemetry::with_registry(Arc::new(Registry::new())).expect("telemetry");
    let registry =
        ComponentRegistry::with_telemetry(config, telemetry.clone()).expect("component registry");
    let store = Arc::new(InMemoryProfileStore::new());
    let archive = Arc::new(InMemoryArticleArchive::new());
    let service = registry.feed_service(Collaborators {
        store: store.clone(),
        archive: archive.clone(),
        source,
    });
    Harness {
        service,
        store,
        archive,
        telemetry,
    }
}

fn harness() -> Harness {
    harness_with(Config::default(), Arc::new(source()))
}

fn tech_profile() -> InterestProfile {
    InterestProfile {
        categories: [("technology", 5.0)].into_iter().collect(),
        keywords: [("ai", 3.0)].into_iter().collect(),
        ..InterestProfile::default()
    }
}

fn no_category_preferences() -> Preferences {
    Preferences {
        categories: Vec::new(),
        ..Preferences::default()
    }
}

#[tokio::test]
async fn test_personalized_feed_ranks_and_drops_zero_scores() {
    let h = harness();
    h.store.insert_profile("u1", tech_profile()).await;

    let feed = h.service.personalized_feed("u1").await.expect("feed");

    let titles: Vec<&str> = feed.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["AI breakthrough", "Cloud outage"]);
    assert!(feed.iter().all(|a| a.score.is_none()));
    assert!(feed[0].explanation.starts_with(
        "Matched category 'technology' | Recommended based on your activity"
    ));
    assert!(feed[0].explanation.ends_with("Category match (5), Keyword match (ai)"));
}

#[tokio::test]
async fn test_personalized_feed_exposes_scores_when_configured() {
    let policy = FeedPolicy {
        expose_scores: true,
        drop_zero_scores: false,
        ..FeedPolicy::default()
    };
    let h = harness_with(Config::default().with_feed_policy(policy), Arc::new(source()));
    h.store.insert_profile("u1", tech_profile()).await;

    let feed = h.service.personalized_feed("u1").await.expect("feed");
    assert!((feed[0].score.expect("score") - 17.0).abs() < 1e-9);
    // "general" from the default preferences is fetched too
    assert!(feed.iter().any(|a| a.title == "Weather update" && a.score == Some(0.0)));
}

#[tokio::test]
async fn test_experimental_opt_in_mixes_trending() {
    let h = harness();
    h.store.insert_profile("u1", tech_profile()).await;
    h.store
        .save_preferences(
            "u1",
            &Preferences {
                experimental_opt_in: true,
                ..Preferences::default()
            },
        )
        .await
        .expect("save preferences");

    let feed = h.service.personalized_feed("u1").await.expect("feed");
    let explore: Vec<&CandidateArticle> =
        feed.iter().filter(|a| a.category == "explore").collect();
    assert_eq!(explore.len(), 2);
    assert_eq!(
        explore[0].explanation,
        "Trending article | Explore recommendation"
    );
    assert_eq!(feed.last().map(|a| a.title.as_str()), Some("Trending two"));
}

#[tokio::test]
async fn test_cold_start_falls_back_to_trending() {
    let h = harness();
    let feed = h.service.personalized_feed("new-user").await.expect("feed");

    let titles: Vec<&str> = feed.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Trending one", "Trending two"]);
    assert!(feed.iter().all(|a| a.explanation == "Trending article"));
    assert!(
        h.telemetry
            .render_prometheus()
            .contains("feed_trending_fallback_total 1")
    );
}

#[tokio::test]
async fn test_like_then_feed_uses_new_signal() {
    let h = harness();
    let sports = CandidateArticle::new("Derby day", "soccer match tonight", "sports", "SportsSite");

    let delta = h
        .service
        .record_interaction("u1", InteractionKind::Like, &sports)
        .await
        .expect("record like")
        .expect("delta applied");
    assert!((delta.categories.get("sports") - 3.0).abs() < f64::EPSILON);

    let profile = h.store.load_profile("u1").await.expect("profile");
    assert!((profile.keywords.get("soccer") - 3.0).abs() < f64::EPSILON);

    let feed = h.service.personalized_feed("u1").await.expect("feed");
    assert_eq!(feed[0].title, "Sports recap");
}

#[tokio::test]
async fn test_read_requires_read_time_consent() {
    let h = harness();
    let article = CandidateArticle::new("Cloud outage", "servers down", "technology", "Wire");

    let skipped = h
        .service
        .record_interaction("u1", InteractionKind::Read, &article)
        .await
        .expect("record read");
    assert!(skipped.is_none());
    assert!(h.store.load_profile("u1").await.expect("profile").is_cold_start());

    h.store
        .save_preferences(
            "u1",
            &Preferences {
                share_read_time: true,
                ..Preferences::default()
            },
        )
        .await
        .expect("save preferences");
    let recorded = h
        .service
        .record_interaction("u1", InteractionKind::Read, &article)
        .await
        .expect("record read");
    assert!(recorded.is_some());
}

#[tokio::test]
async fn test_record_article_interaction_by_id() {
    let h = harness();
    let stored = h
        .archive
        .record_articles(vec![CandidateArticle::new(
            "Rover lands",
            "mars rover touches down",
            "science",
            "SpaceWire",
        )])
        .await
        .expect("archive");

    h.service
        .record_article_interaction("u1", InteractionKind::Save, &stored[0].article_id)
        .await
        .expect("save interaction");
    let profile = h.store.load_profile("u1").await.expect("profile");
    assert!((profile.sources.get("SpaceWire") - 1.0).abs() < f64::EPSILON);

    let missing = h
        .service
        .record_article_interaction("u1", InteractionKind::Save, "does-not-exist")
        .await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_liked_and_saved_collections() {
    let h = harness();
    let stored = h
        .archive
        .record_articles(vec![
            CandidateArticle::new("Rover lands", "mars rover touches down", "science", "SpaceWire"),
            CandidateArticle::new("Chip shortage", "factories slow down", "technology", "T"),
        ])
        .await
        .expect("archive");
    let rover = &stored[0].article_id;
    let chips = &stored[1].article_id;

    for _ in 0..2 {
        h.service
            .record_article_interaction("u1", InteractionKind::Like, rover)
            .await
            .expect("like");
    }
    h.service
        .record_article_interaction("u1", InteractionKind::Save, chips)
        .await
        .expect("save");
    h.service
        .record_article_interaction("u1", InteractionKind::Save, rover)
        .await
        .expect("save");

    let liked = h.service.liked_articles("u1").await.expect("liked");
    assert_eq!(
        liked.iter().map(|a| a.title.as_str()).collect::<Vec<_>>(),
        vec!["Rover lands"]
    );
    let saved = h.service.saved_articles("u1").await.expect("saved");
    assert_eq!(
        saved.iter().map(|a| a.title.as_str()).collect::<Vec<_>>(),
        vec!["Chip shortage", "Rover lands"]
    );

    assert!(h.service.remove_saved_article("u1", chips).await.expect("remove"));
    assert!(!h.service.remove_saved_article("u1", chips).await.expect("remove again"));
    let saved = h.service.saved_articles("u1").await.expect("saved");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].article_id, *rover);

    // profile weights stay after removal
    let profile = h.store.load_profile("u1").await.expect("profile");
    assert!((profile.sources.get("T") - 1.0).abs() < f64::EPSILON);
    assert!(h.service.liked_articles("u2").await.expect("liked").is_empty());
}

#[tokio::test]
async fn test_read_does_not_touch_collections() {
    let h = harness();
    h.store
        .save_preferences(
            "u1",
            &Preferences {
                share_read_time: true,
                ..Preferences::default()
            },
        )
        .await
        .expect("save preferences");
    let article = CandidateArticle::new("Cloud outage", "servers down", "technology", "Wire");
    h.service
        .record_interaction("u1", InteractionKind::Read, &article)
        .await
        .expect("read");
    assert!(h.service.liked_articles("u1").await.expect("liked").is_empty());
    assert!(h.service.saved_articles("u1").await.expect("saved").is_empty());
}

#[tokio::test]
async fn test_search_and_preferences_feed_keywords() {
    let h = harness();
    h.service
        .record_search("u1", "electric cars in Germany")
        .await
        .expect("search");
    h.service
        .save_preferences(
            "u1",
            &Preferences {
                keywords: "robots".to_string(),
                locations: vec!["UK".to_string()],
                ..Preferences::default()
            },
        )
        .await
        .expect("save preferences");

    let profile = h.store.load_profile("u1").await.expect("profile");
    assert!(profile.categories.is_empty());
    assert!((profile.locations.get("Germany") - 1.0).abs() < f64::EPSILON);
    assert!((profile.keywords.get("robot") - 1.0).abs() < f64::EPSILON);

    let preferences = h.store.load_preferences("u1").await.expect("preferences");
    let recommendation = h
        .service
        .recommend(&profile, &preferences)
        .await
        .expect("recommendation");
    assert_eq!(recommendation.categories, vec!["general"]);
    assert_eq!(recommendation.locations, vec!["Germany", "UK"]);
}

#[tokio::test]
async fn test_recommend_uses_tfidf_then_defaults() {
    let h = harness();
    let profile = InterestProfile {
        keywords: [("soccer", 2.0)].into_iter().collect(),
        ..InterestProfile::default()
    };

    // empty archive: configured defaults
    let recommendation = h
        .service
        .recommend(&profile, &no_category_preferences())
        .await
        .expect("recommendation");
    assert_eq!(recommendation.categories, vec!["general"]);

    h.archive
        .record_articles(vec![
            CandidateArticle::new("Cup final", "soccer fans celebrate", "sports", "S"),
            CandidateArticle::new("Chip shortage", "factories slow down", "technology", "T"),
        ])
        .await
        .expect("archive");
    let recommendation = h
        .service
        .recommend(&profile, &no_category_preferences())
        .await
        .expect("recommendation");
    assert_eq!(recommendation.categories, vec!["sports", "technology"]);
}

#[tokio::test]
async fn test_decay_and_reset() {
    let h = harness();
    h.store.insert_profile("u1", tech_profile()).await;
    h.store.insert_profile("u2", tech_profile()).await;

    assert_eq!(h.service.apply_decay().await.expect("decay"), 2);
    let profile = h.store.load_profile("u2").await.expect("profile");
    assert!((profile.categories.get("technology") - 4.75).abs() < 1e-9);

    h.service.reset_profile("u1").await.expect("reset");
    assert!(h.store.load_profile("u1").await.expect("profile").is_cold_start());
}

struct FlakySource {
    inner: StaticArticleSource,
}

#[async_trait]
impl ArticleSource for FlakySource {
    async fn fetch(&self, category: &str, query: &RetrievalQuery) -> Result<Vec<RawArticle>> {
        if category == "general" {
            bail!("upstream returned 503");
        }
        self.inner.fetch(category, query).await
    }

    async fn trending(&self, _limit: usize) -> Result<Vec<RawArticle>> {
        bail!("trending endpoint unavailable")
    }
}

#[tokio::test]
async fn test_failed_categories_are_skipped() {
    let h = harness_with(
        Config::default(),
        Arc::new(FlakySource { inner: source() }),
    );
    h.store.insert_profile("u1", tech_profile()).await;

    let feed = h.service.personalized_feed("u1").await.expect("feed");
    assert_eq!(feed[0].title, "AI breakthrough");
    assert!(
        h.telemetry
            .render_prometheus()
            .contains("feed_retrieval_failures_total 1")
    );

    // nothing ranks and trending also fails: empty feed, not an error
    let empty = h.service.personalized_feed("nobody").await.expect("feed");
    assert!(empty.is_empty());
}
