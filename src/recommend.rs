//! 取得条件の推薦。
//!
//! 行動履歴と明示的な嗜好から推薦リストを作る [`ActivityAnalyzer`] と、
//! カテゴリのシグナルが無いときに TF-IDF 類似度でカテゴリを並べる [`CategoryRanker`]。
mod analyzer;
mod category;

pub use analyzer::{ActivityAnalyzer, Recommendation};
pub use category::{CategoryCorpus, CategoryRanker};
