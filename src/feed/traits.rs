//! 外部コラボレータの境界。

use anyhow::Result;
use async_trait::async_trait;

use super::RetrievalQuery;
use crate::config::DecayFactor;
use crate::model::{
    ArticleCollection, CandidateArticle, InterestProfile, Preferences, ProfileDelta, RawArticle,
};
use crate::recommend::CategoryCorpus;

/// ProfileStore - プロファイルと嗜好の永続化層
///
/// 同一ユーザーへの同時更新で増分が失われないよう、`increment` はフィールド単位で
/// アトミックに適用されなければならない。
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// プロファイルを取得する。未登録ならコールドスタートの空プロファイル。
    async fn load_profile(&self, user_id: &str) -> Result<InterestProfile>;

    /// 増分をアトミックに加算する
    async fn increment(&self, user_id: &str, delta: &ProfileDelta) -> Result<()>;

    /// 全次元の重みに減衰係数を掛ける
    async fn scale_profile(&self, user_id: &str, factor: DecayFactor) -> Result<()>;

    async fn reset_profile(&self, user_id: &str) -> Result<()>;

    /// 嗜好を取得する。未登録なら既定値。
    async fn load_preferences(&self, user_id: &str) -> Result<Preferences>;

    /// 嗜好を丸ごと置き換える
    async fn save_preferences(&self, user_id: &str, preferences: &Preferences) -> Result<()>;

    /// プロファイルを持つ全ユーザー
    async fn user_ids(&self) -> Result<Vec<String>>;

    /// コレクションに記事 ID を追加する。既にあれば何もしない。
    async fn add_to_collection(
        &self,
        user_id: &str,
        collection: ArticleCollection,
        article_id: &str,
    ) -> Result<()>;

    /// コレクションの記事 ID を追加順で返す
    async fn collection(&self, user_id: &str, collection: ArticleCollection)
    -> Result<Vec<String>>;

    /// コレクションから記事 ID を取り除く。取り除いたら `true`。
    async fn remove_from_collection(
        &self,
        user_id: &str,
        collection: ArticleCollection,
        article_id: &str,
    ) -> Result<bool>;
}

/// ArticleArchive - 取得済み記事の保管庫
#[async_trait]
pub trait ArticleArchive: Send + Sync {
    /// 記事を保存し、タイトルが完全一致する既存記事があればその ID に揃えて返す。
    async fn record_articles(&self, articles: Vec<CandidateArticle>)
    -> Result<Vec<CandidateArticle>>;

    async fn find_article(&self, article_id: &str) -> Result<Option<CandidateArticle>>;

    /// カテゴリごとの記事テキストを連結したコーパスを作る
    async fn category_corpus(&self) -> Result<CategoryCorpus>;
}

/// ArticleSource - ニュース取得クライアント
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// 1 カテゴリ分の候補記事を取得する
    async fn fetch(&self, category: &str, query: &RetrievalQuery) -> Result<Vec<RawArticle>>;

    /// カテゴリ指定なしのトレンド記事を取得する
    async fn trending(&self, limit: usize) -> Result<Vec<RawArticle>>;
}
