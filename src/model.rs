//! パーソナライズの型付きデータモデル。
//!
//! 外部から来る緩い形のデータは境界で一度だけ既定値へ補正し、以降は型で扱う。
mod article;
mod interaction;
mod preferences;
mod profile;
mod weights;

pub use article::{CandidateArticle, RawArticle, RawSource, TRENDING_CATEGORY};
pub use interaction::{
    ArticleCollection, ArticleSignal, InteractionEvent, InteractionKind, InteractionSubject,
};
pub use preferences::Preferences;
pub use profile::{InterestProfile, ProfileDelta};
pub use weights::WeightMap;
