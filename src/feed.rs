//! フィード組み立てのオーケストレーション。
//!
//! 永続化と記事取得は外部コラボレータとして trait で受け取る。
mod memory;
mod query;
mod service;
mod traits;

pub use memory::{InMemoryArticleArchive, InMemoryProfileStore, StaticArticleSource};
pub use query::RetrievalQuery;
pub use service::{Collaborators, FeedService};
pub use traits::{ArticleArchive, ArticleSource, ProfileStore};
