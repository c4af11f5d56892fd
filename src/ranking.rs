//! 候補記事のスコアリングと並べ替え。
mod explanation;
mod scorer;

pub use explanation::format_weight;
pub use scorer::{ArticleRanker, ScoreBreakdown};
