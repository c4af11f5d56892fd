use tracing::debug;

use super::explanation::{ACTIVITY_NOTE, locations_note, match_note};
use crate::config::ScoringWeights;
use crate::model::{CandidateArticle, InterestProfile};
use crate::text::KeywordExtractor;

/// 1 記事分のスコア内訳。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// プロファイル上のカテゴリ重み（一致した場合のみ）。
    pub category_match: Option<f64>,
    pub source_match: Option<f64>,
    /// 説明文に載せる最初の一致キーワード。
    pub keyword_match: Option<String>,
    /// 一致したキーワード重みの合計（重複なし）。
    pub keyword_sum: f64,
    pub total: f64,
}

/// プロファイルに対して候補記事を採点し、スコア降順の安定ソートで並べる。
#[derive(Debug, Clone)]
pub struct ArticleRanker {
    extractor: KeywordExtractor,
    weights: ScoringWeights,
}

impl ArticleRanker {
    #[must_use]
    pub fn new(extractor: KeywordExtractor, weights: ScoringWeights) -> Self {
        Self { extractor, weights }
    }

    #[must_use]
    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// ```text
    /// score = category_coeff * categories[category]
    ///       + source_coeff   * sources[source]
    ///       + keyword_coeff  * Σ keywords[k]  (k ∈ extract(title + description))
    /// ```
    #[must_use]
    pub fn score(&self, article: &CandidateArticle, profile: &InterestProfile) -> ScoreBreakdown {
        let category = profile.categories.get(&article.category);
        let source = profile.sources.get(&article.source);

        let mut keyword_sum = 0.0;
        let mut keyword_match = None;
        for keyword in self.extractor.extract(&article.text()) {
            let weight = profile.keywords.get(&keyword);
            if weight > 0.0 {
                keyword_sum += weight;
                keyword_match.get_or_insert(keyword);
            }
        }

        let total = self.weights.category * category
            + self.weights.source * source
            + self.weights.keyword * keyword_sum;

        ScoreBreakdown {
            category_match: (category > 0.0).then_some(category),
            source_match: (source > 0.0).then_some(source),
            keyword_match,
            keyword_sum,
            total,
        }
    }

    #[must_use]
    pub fn rank(
        &self,
        articles: Vec<CandidateArticle>,
        profile: &InterestProfile,
    ) -> Vec<CandidateArticle> {
        self.rank_with_locations(articles, profile, &[])
    }

    /// 採点・説明付けを行い、スコア降順に並べる。同点は入力順を保つ。
    ///
    /// 推薦地域が与えられれば説明文に `Locations: ..` を加える。
    #[must_use]
    pub fn rank_with_locations(
        &self,
        articles: Vec<CandidateArticle>,
        profile: &InterestProfile,
        locations: &[String],
    ) -> Vec<CandidateArticle> {
        let locations = locations_note(locations);
        let mut ranked: Vec<CandidateArticle> = articles
            .into_iter()
            .map(|mut article| {
                let breakdown = self.score(&article, profile);
                debug!(
                    article_id = %article.article_id,
                    category = %article.category,
                    score = breakdown.total,
                    "scored article"
                );
                article.append_explanation(ACTIVITY_NOTE);
                if let Some(note) = &locations {
                    article.append_explanation(note);
                }
                if let Some(note) = match_note(&breakdown) {
                    article.append_explanation(&note);
                }
                article.score = Some(breakdown.total);
                article
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| {
            b.score
                .unwrap_or_default()
                .total_cmp(&a.score.unwrap_or_default())
        });
        ranked
    }
}
