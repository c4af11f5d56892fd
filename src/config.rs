use std::{env, num::NonZeroUsize, path::PathBuf};

use thiserror::Error;

use crate::text::StopwordLanguage;

const DEFAULT_LOCATIONS: &str = "USA,China,India,Russia,UK,Germany";
const DEFAULT_CATEGORIES: &str = "business,entertainment,general,health,science,sports,technology";
const DEFAULT_FALLBACK_CATEGORIES: &str = "general";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    scoring_weights: ScoringWeights,
    decay_factor: DecayFactor,
    recommendation_size: NonZeroUsize,
    locations: Vec<String>,
    categories: Vec<String>,
    default_categories: Vec<String>,
    tfidf_stopwords: StopwordLanguage,
    extraction_stopwords: Option<Vec<String>>,
    thesaurus_path: Option<PathBuf>,
    synonym_synsets: usize,
    synonym_lemmas: usize,
    interaction_weights: InteractionWeights,
    feed_policy: FeedPolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// 記事スコアリングの係数。
///
/// カテゴリ・ソース一致は粗いが確度の高いシグナルなので、個別キーワードより大きく重み付けする。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub category: f64,
    pub source: f64,
    pub keyword: f64,
}

impl ScoringWeights {
    /// 係数を検証して構築する。負数・非有限値は `None`。
    #[must_use]
    pub fn new(category: f64, source: f64, keyword: f64) -> Option<Self> {
        [category, source, keyword]
            .iter()
            .all(|value| value.is_finite() && *value >= 0.0)
            .then_some(Self {
                category,
                source,
                keyword,
            })
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category: 2.5,
            source: 2.0,
            keyword: 1.5,
        }
    }
}

/// プロファイル減衰係数。値域は (0, 1]。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DecayFactor(f64);

impl DecayFactor {
    pub const DEFAULT: f64 = 0.95;

    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0 && value <= 1.0).then_some(Self(value))
    }

    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// 2回分の減衰を1回にまとめた係数（`f * g`）。
    #[must_use]
    pub fn compose(self, other: Self) -> Self {
        // (0,1] is closed under multiplication
        Self(self.0 * other.0)
    }
}

impl Default for DecayFactor {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// インタラクション種別ごとの加算重み。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionWeights {
    pub read: f64,
    pub save: f64,
    pub like: f64,
    pub search: f64,
    pub preference: f64,
}

impl Default for InteractionWeights {
    fn default() -> Self {
        Self {
            read: 1.0,
            save: 1.0,
            like: 3.0,
            search: 1.0,
            preference: 1.0,
        }
    }
}

/// "for you" フィードの組み立て方針。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedPolicy {
    pub article_limit: NonZeroUsize,
    pub explore_limit: usize,
    pub drop_zero_scores: bool,
    pub expose_scores: bool,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            article_limit: NonZeroUsize::new(20).unwrap_or(NonZeroUsize::MIN),
            explore_limit: 5,
            drop_zero_scores: true,
            expose_scores: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring_weights: ScoringWeights::default(),
            decay_factor: DecayFactor::default(),
            recommendation_size: NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN),
            locations: split_csv(DEFAULT_LOCATIONS),
            categories: split_csv(DEFAULT_CATEGORIES),
            default_categories: split_csv(DEFAULT_FALLBACK_CATEGORIES),
            tfidf_stopwords: StopwordLanguage::English,
            extraction_stopwords: None,
            thesaurus_path: None,
            synonym_synsets: 2,
            synonym_lemmas: 2,
            interaction_weights: InteractionWeights::default(),
            feed_policy: FeedPolicy::default(),
        }
    }
}

impl Config {
    /// 環境変数からパーソナライズ設定を読み込み、検証する。
    ///
    /// すべての値に既定値があるため必須変数はない。係数や減衰率が壊れている場合は
    /// 起動時に失敗させ、リクエスト単位では設定が正しいことを前提とする。
    ///
    /// # Errors
    /// 数値・真偽値のパースや値域検証に失敗した場合は [`ConfigError::Invalid`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = ScoringWeights::default();
        let scoring_weights = ScoringWeights {
            category: parse_non_negative_f64("FEED_CATEGORY_COEFF", defaults.category)?,
            source: parse_non_negative_f64("FEED_SOURCE_COEFF", defaults.source)?,
            keyword: parse_non_negative_f64("FEED_KEYWORD_COEFF", defaults.keyword)?,
        };

        let raw_decay = parse_f64("FEED_DECAY_FACTOR", DecayFactor::DEFAULT)?;
        let decay_factor = DecayFactor::new(raw_decay).ok_or_else(|| ConfigError::Invalid {
            name: "FEED_DECAY_FACTOR",
            source: anyhow::anyhow!("decay factor must be in (0, 1], got {raw_decay}"),
        })?;

        let recommendation_size = parse_non_zero_usize("FEED_RECOMMENDATION_SIZE", 5)?;

        let locations = parse_csv("FEED_LOCATIONS", DEFAULT_LOCATIONS);
        let categories = parse_csv("FEED_CATEGORIES", DEFAULT_CATEGORIES);
        let default_categories = parse_csv("FEED_DEFAULT_CATEGORIES", DEFAULT_FALLBACK_CATEGORIES);
        if default_categories.is_empty() {
            return Err(ConfigError::Invalid {
                name: "FEED_DEFAULT_CATEGORIES",
                source: anyhow::anyhow!("at least one fallback category is required"),
            });
        }

        let tfidf_raw = env::var("FEED_TFIDF_STOPWORDS").unwrap_or_else(|_| "en".to_string());
        let tfidf_stopwords =
            StopwordLanguage::from_code(&tfidf_raw).ok_or_else(|| ConfigError::Invalid {
                name: "FEED_TFIDF_STOPWORDS",
                source: anyhow::anyhow!("unsupported stopword language: {tfidf_raw}"),
            })?;
        let extraction_stopwords = env::var("FEED_EXTRACTION_STOPWORDS")
            .ok()
            .map(|raw| split_csv(&raw.to_lowercase()));
        let thesaurus_path = env::var("FEED_THESAURUS_PATH").ok().map(PathBuf::from);

        // Synonym expansion bounds
        let synonym_synsets = parse_usize("FEED_SYNONYM_SYNSETS", 2)?;
        let synonym_lemmas = parse_usize("FEED_SYNONYM_LEMMAS", 2)?;

        let weight_defaults = InteractionWeights::default();
        let interaction_weights = InteractionWeights {
            read: parse_non_negative_f64("FEED_READ_WEIGHT", weight_defaults.read)?,
            save: parse_non_negative_f64("FEED_SAVE_WEIGHT", weight_defaults.save)?,
            like: parse_non_negative_f64("FEED_LIKE_WEIGHT", weight_defaults.like)?,
            search: parse_non_negative_f64("FEED_SEARCH_WEIGHT", weight_defaults.search)?,
            preference: parse_non_negative_f64(
                "FEED_PREFERENCE_WEIGHT",
                weight_defaults.preference,
            )?,
        };

        // Feed assembly
        let feed_policy = FeedPolicy {
            article_limit: parse_non_zero_usize("FEED_ARTICLE_LIMIT", 20)?,
            explore_limit: parse_usize("FEED_EXPLORE_LIMIT", 5)?,
            drop_zero_scores: parse_bool("FEED_DROP_ZERO_SCORES", true)?,
            expose_scores: parse_bool("FEED_EXPOSE_SCORES", false)?,
        };

        Ok(Self {
            scoring_weights,
            decay_factor,
            recommendation_size,
            locations,
            categories,
            default_categories,
            tfidf_stopwords,
            extraction_stopwords,
            thesaurus_path,
            synonym_synsets,
            synonym_lemmas,
            interaction_weights,
            feed_policy,
        })
    }

    #[must_use]
    pub fn scoring_weights(&self) -> ScoringWeights {
        self.scoring_weights
    }

    #[must_use]
    pub fn decay_factor(&self) -> DecayFactor {
        self.decay_factor
    }

    #[must_use]
    pub fn recommendation_size(&self) -> NonZeroUsize {
        self.recommendation_size
    }

    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn default_categories(&self) -> &[String] {
        &self.default_categories
    }

    #[must_use]
    pub fn tfidf_stopwords(&self) -> StopwordLanguage {
        self.tfidf_stopwords
    }

    #[must_use]
    pub fn extraction_stopwords(&self) -> Option<&[String]> {
        self.extraction_stopwords.as_deref()
    }

    #[must_use]
    pub fn thesaurus_path(&self) -> Option<&std::path::Path> {
        self.thesaurus_path.as_deref()
    }

    #[must_use]
    pub fn synonym_synsets(&self) -> usize {
        self.synonym_synsets
    }

    #[must_use]
    pub fn synonym_lemmas(&self) -> usize {
        self.synonym_lemmas
    }

    #[must_use]
    pub fn interaction_weights(&self) -> InteractionWeights {
        self.interaction_weights
    }

    #[must_use]
    pub fn feed_policy(&self) -> FeedPolicy {
        self.feed_policy
    }

    /// 係数だけを差し替えたコピーを返す。A/B 比較やテストで使う。
    #[must_use]
    pub fn with_scoring_weights(mut self, weights: ScoringWeights) -> Self {
        self.scoring_weights = weights;
        self
    }

    #[must_use]
    pub fn with_feed_policy(mut self, policy: FeedPolicy) -> Self {
        self.feed_policy = policy;
        self
    }
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let parsed = parse_usize(name, default)?;
    NonZeroUsize::new(parsed).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("must be greater than zero"),
    })
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<usize>()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })
}

fn parse_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<f64>()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })
}

fn parse_non_negative_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let value = parse_f64(name, default)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("value must be a finite, non-negative number: {value}"),
        });
    }
    Ok(value)
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("invalid boolean value: {raw}"),
        }),
    }
}

fn parse_csv(name: &'static str, default: &str) -> Vec<String> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    split_csv(&raw)
}

fn split_csv(raw: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !values.iter().any(|existing| existing == value) {
            values.push(value.to_string());
        }
    }
    values
}
