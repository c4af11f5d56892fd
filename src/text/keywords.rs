//! キーワード抽出器。
//!
//! トークナイズ → ストップワード除去 → 品詞フィルタ（名詞・動詞）→ 語幹化 → 類義語展開
//! の順で処理し、初出順・重複なしのキーワード列を返す。
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::warn;

use super::stemmer::{Stemmer, SuffixStemmer};
use super::stopwords::Stopwords;
use super::tagger::{LexiconTagger, PosTagger};
use super::thesaurus::{SynonymBounds, Thesaurus, lemma_key};
use super::tokenizer::tokenize;

/// 状態を持たないキーワード抽出器。部品は `Arc` で共有するため `clone` は安価。
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stopwords: Arc<Stopwords>,
    stemmer: Arc<dyn Stemmer>,
    tagger: Arc<dyn PosTagger>,
    thesaurus: Arc<Thesaurus>,
    bounds: SynonymBounds,
}

/// Builder pattern for constructing `KeywordExtractor`.
#[derive(Debug, Default)]
pub struct KeywordExtractorBuilder {
    stopwords: Option<Arc<Stopwords>>,
    stemmer: Option<Arc<dyn Stemmer>>,
    tagger: Option<Arc<dyn PosTagger>>,
    thesaurus: Option<Arc<Thesaurus>>,
    bounds: Option<SynonymBounds>,
}

impl KeywordExtractorBuilder {
    #[must_use]
    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = Some(Arc::new(stopwords));
        self
    }

    #[must_use]
    pub fn with_stemmer(mut self, stemmer: Arc<dyn Stemmer>) -> Self {
        self.stemmer = Some(stemmer);
        self
    }

    #[must_use]
    pub fn with_tagger(mut self, tagger: Arc<dyn PosTagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    #[must_use]
    pub fn with_thesaurus(mut self, thesaurus: Arc<Thesaurus>) -> Self {
        self.thesaurus = Some(thesaurus);
        self
    }

    #[must_use]
    pub fn with_synonym_bounds(mut self, bounds: SynonymBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// 未設定の部品は既定実装で埋める。
    #[must_use]
    pub fn build(self) -> KeywordExtractor {
        KeywordExtractor {
            stopwords: self
                .stopwords
                .unwrap_or_else(|| Arc::new(Stopwords::extraction_default())),
            stemmer: self.stemmer.unwrap_or_else(|| Arc::new(SuffixStemmer)),
            tagger: self.tagger.unwrap_or_else(|| Arc::new(LexiconTagger)),
            thesaurus: self
                .thesaurus
                .unwrap_or_else(|| Arc::new(Thesaurus::builtin())),
            bounds: self.bounds.unwrap_or_default(),
        }
    }
}

/// 初出順を保った重複排除バッファ。
struct KeywordSink<'a> {
    stopwords: &'a Stopwords,
    seen: FxHashSet<String>,
    keywords: Vec<String>,
}

impl KeywordSink<'_> {
    fn push(&mut self, keyword: String) -> bool {
        if keyword.is_empty() || self.stopwords.contains(&keyword) || self.seen.contains(&keyword)
        {
            return false;
        }
        self.seen.insert(keyword.clone());
        self.keywords.push(keyword);
        true
    }
}

impl KeywordExtractor {
    #[must_use]
    pub fn builder() -> KeywordExtractorBuilder {
        KeywordExtractorBuilder::default()
    }

    /// 既定のストップワード・語幹化器・タガー・組み込み辞書で構築する。
    #[must_use]
    pub fn new_default() -> Self {
        Self::builder().build()
    }

    /// テキストからキーワードを抽出する。
    ///
    /// 品詞タグ付けに失敗しても処理は止めず、全トークンを内容語として扱う。
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<String> {
        let tokens: Vec<String> = tokenize(text)
            .into_iter()
            .filter(|token| !self.stopwords.contains(token))
            .collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let content = self.content_tokens(tokens);
        let mut sink = KeywordSink {
            stopwords: &self.stopwords,
            seen: FxHashSet::default(),
            keywords: Vec::with_capacity(content.len() * 2),
        };

        for token in &content {
            let stem = self.stemmer.stem(token);
            if !sink.push(stem.clone()) {
                continue;
            }
            for lemma in self.synonyms(token, &stem) {
                sink.push(self.stemmer.stem(&lemma));
            }
        }

        sink.keywords
    }

    /// 語幹化器で単語を照合キーへ正規化する。
    #[must_use]
    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase())
    }

    #[must_use]
    pub fn stemmer(&self) -> Arc<dyn Stemmer> {
        Arc::clone(&self.stemmer)
    }

    #[must_use]
    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    #[must_use]
    pub fn synonym_bounds(&self) -> SynonymBounds {
        self.bounds
    }

    fn content_tokens(&self, tokens: Vec<String>) -> Vec<String> {
        match self.tagger.tag(&tokens) {
            Ok(tags) if tags.len() == tokens.len() => tokens
                .into_iter()
                .zip(tags)
                .filter_map(|(token, tag)| tag.is_content().then_some(token))
                .collect(),
            Ok(tags) => {
                warn!(
                    tokens = tokens.len(),
                    tags = tags.len(),
                    "pos tagger returned misaligned tags; keeping all tokens"
                );
                tokens
            }
            Err(error) => {
                warn!(error = %error, "pos tagging failed; keeping all tokens");
                tokens
            }
        }
    }

    /// 原形で引けなければ語幹で引き直す。
    fn synonyms(&self, token: &str, stem: &str) -> Vec<String> {
        let mut candidates = self.thesaurus.candidates(token, self.bounds);
        if candidates.is_empty() && stem != token {
            candidates = self.thesaurus.candidates(stem, self.bounds);
        }
        candidates.into_iter().map(lemma_key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::stemmer::IdentityStemmer;
    use crate::text::tagger::{PosTag, TaggingError};

    #[derive(Debug)]
    struct FailingTagger;

    impl PosTagger for FailingTagger {
        fn tag(&self, _tokens: &[String]) -> Result<Vec<PosTag>, TaggingError> {
            Err(TaggingError::Unavailable("model not loaded".to_string()))
        }
    }

    #[derive(Debug)]
    struct ShortTagger;

    impl PosTagger for ShortTagger {
        fn tag(&self, _tokens: &[String]) -> Result<Vec<PosTag>, TaggingError> {
            Ok(vec![PosTag::Adjective])
        }
    }

    fn plain_extractor() -> KeywordExtractor {
        KeywordExtractor::builder()
            .with_thesaurus(Arc::new(Thesaurus::empty()))
            .build()
    }

    #[test]
    fn extracts_nouns_and_verbs_in_first_seen_order() {
        let keywords = plain_extractor().extract("The new AI chip launched quickly in Germany");
        assert_eq!(keywords, vec!["ai", "chip", "launch", "germany"]);
    }

    #[test]
    fn inflections_collapse_to_one_key() {
        let keywords = plain_extractor().extract("running runs ran");
        assert_eq!(keywords, vec!["run"]);
    }

    #[test]
    fn synonyms_are_appended_after_their_token() {
        let keywords = KeywordExtractor::new_default().extract("AI breakthrough");
        assert_eq!(
            keywords,
            vec!["ai", "artificial-intelligence", "breakthrough", "discovery"]
        );
    }

    #[test]
    fn synonym_lookup_falls_back_to_stem() {
        let keywords = KeywordExtractor::new_default().extract("chips");
        assert_eq!(keywords, vec!["chip", "microchip"]);
    }

    #[test]
    fn tagging_failure_keeps_every_token() {
        let extractor = KeywordExtractor::builder()
            .with_tagger(Arc::new(FailingTagger))
            .with_stemmer(Arc::new(IdentityStemmer))
            .with_thesaurus(Arc::new(Thesaurus::empty()))
            .build();
        assert_eq!(extractor.extract("very new quickly"), vec!["very", "new", "quickly"]);
    }

    #[test]
    fn misaligned_tags_keep_every_token() {
        let extractor = KeywordExtractor::builder()
            .with_tagger(Arc::new(ShortTagger))
            .with_thesaurus(Arc::new(Thesaurus::empty()))
            .build();
        assert_eq!(extractor.extract("big markets"), vec!["big", "market"]);
    }

    #[test]
    fn empty_and_stopword_only_text_yield_nothing() {
        let extractor = KeywordExtractor::new_default();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("the and of with").is_empty());
    }

    #[test]
    fn custom_stopwords_are_never_returned() {
        let extractor = KeywordExtractor::builder()
            .with_stopwords(Stopwords::from_words(["chip", "microchip"]))
            .build();
        assert_eq!(extractor.extract("chip market"), vec!["market", "marketplace"]);
    }
}
