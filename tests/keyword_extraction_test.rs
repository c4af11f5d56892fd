use std::collections::HashSet;

use feed_personalizer::text::{KeywordExtractor, Stopwords, Thesaurus};
use proptest::prelude::*;
use std::sync::Arc;

const VOCABULARY: &[&str] = &[
    "the", "a", "and", "of", "with", "AI", "chip", "chips", "launched", "running", "ran", "runs",
    "match", "matches", "soccer", "football", "election", "votes", "USA", "Germany", "new",
    "quickly", "market", "markets", "film", "movie", "is", "by", "breakthrough", "2024",
    "state-of-the-art", "e_mail", "--", "!",
];

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 0..24).prop_map(|words| words.join(" "))
}

#[test]
fn test_extract_breakthrough_headline() {
    let extractor = KeywordExtractor::new_default();
    let keywords = extractor.extract("AI breakthrough new ai chip");
    assert_eq!(
        keywords,
        vec![
            "ai",
            "artificial-intelligence",
            "breakthrough",
            "discovery",
            "chip",
            "microchip"
        ]
    );
}

#[test]
fn test_extract_without_thesaurus_keeps_only_content_stems() {
    let extractor = KeywordExtractor::builder()
        .with_thesaurus(Arc::new(Thesaurus::empty()))
        .build();
    assert_eq!(
        extractor.extract("Sports recap: the soccer matches were thrilling"),
        vec!["sport", "recap", "soccer", "match", "thrill"]
    );
}

#[test]
fn test_plural_and_singular_share_keywords() {
    let extractor = KeywordExtractor::new_default();
    assert_eq!(extractor.extract("buildings"), extractor.extract("building"));
    assert_eq!(extractor.extract("Council hearings"), vec!["council", "hear"]);
    assert_eq!(extractor.extract("Senate hearing"), vec!["senate", "hear"]);
}

#[test]
fn test_extract_empty_inputs() {
    let extractor = KeywordExtractor::new_default();
    assert!(extractor.extract("").is_empty());
    assert!(extractor.extract("   ").is_empty());
    assert!(extractor.extract("the of and a").is_empty());
}

proptest! {
    #[test]
    fn prop_keywords_are_distinct(text in sentence()) {
        let keywords = KeywordExtractor::new_default().extract(&text);
        let distinct: HashSet<&String> = keywords.iter().collect();
        prop_assert_eq!(distinct.len(), keywords.len());
    }

    #[test]
    fn prop_keywords_never_contain_stopwords(text in sentence()) {
        let extractor = KeywordExtractor::new_default();
        for keyword in extractor.extract(&text) {
            prop_assert!(!extractor.stopwords().contains(&keyword), "stopword {keyword}");
            prop_assert!(!keyword.is_empty());
        }
    }

    #[test]
    fn prop_custom_stopwords_are_respected(text in sentence()) {
        let extractor = KeywordExtractor::builder()
            .with_stopwords(Stopwords::from_words(["chip", "match", "ai", "market"]))
            .build();
        for keyword in extractor.extract(&text) {
            prop_assert!(!["chip", "match", "ai", "market"].contains(&keyword.as_str()));
        }
    }

    #[test]
    fn prop_arbitrary_text_never_panics(text in "\\PC{0,120}") {
        let keywords = KeywordExtractor::new_default().extract(&text);
        let distinct: HashSet<&String> = keywords.iter().collect();
        prop_assert_eq!(distinct.len(), keywords.len());
    }
}
