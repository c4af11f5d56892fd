//! 軽量な品詞タガー。
//!
//! 閉じた語類（代名詞・限定詞・前置詞・接続詞・助動詞）と頻出形容詞・副詞の辞書、
//! それに接尾辞規則で判定し、未知語は名詞とみなす。
use std::fmt::Debug;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// 粗い品詞分類。キーワードとして残すのは名詞と動詞のみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Modal,
    Numeral,
}

impl PosTag {
    #[must_use]
    pub fn is_content(self) -> bool {
        matches!(self, Self::Noun | Self::Verb)
    }
}

#[derive(Debug, Error)]
pub enum TaggingError {
    #[error("part-of-speech tagger unavailable: {0}")]
    Unavailable(String),
    #[error("unsupported token: {0:?}")]
    UnsupportedToken(String),
}

/// トークン列に品詞を付与する。戻り値の長さは入力と一致しなければならない。
pub trait PosTagger: Send + Sync + Debug {
    /// # Errors
    /// タガーが利用できない、または扱えないトークンを含む場合。
    fn tag(&self, tokens: &[String]) -> Result<Vec<PosTag>, TaggingError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconTagger;

static LEXICON: Lazy<FxHashMap<&'static str, PosTag>> = Lazy::new(|| {
    let groups: [(&[&str], PosTag); 8] = [
        (
            &[
                "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "he",
                "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself",
                "we", "us", "our", "ours", "ourselves", "they", "them", "their", "theirs",
                "themselves", "who", "whom", "whose", "which", "what", "whatever", "whoever",
                "someone", "anyone", "everyone", "nobody", "something", "anything", "everything",
                "nothing",
            ],
            PosTag::Pronoun,
        ),
        (
            &[
                "this", "that", "these", "those", "some", "any", "each", "every", "either",
                "neither", "no", "all", "both", "few", "many", "much", "more", "most", "several",
                "such", "another", "other",
            ],
            PosTag::Determiner,
        ),
        (
            &[
                "about", "above", "across", "after", "against", "along", "amid", "among",
                "around", "as", "before", "behind", "below", "beneath", "beside", "between",
                "beyond", "despite", "down", "during", "except", "from", "inside", "into",
                "like", "near", "off", "onto", "out", "outside", "over", "past", "per", "since",
                "than", "through", "throughout", "toward", "towards", "under", "until", "unlike",
                "up", "upon", "via", "within",
            ],
            PosTag::Preposition,
        ),
        (
            &[
                "but", "nor", "so", "yet", "because", "although", "though", "while", "whereas",
                "if", "unless", "whether", "when", "where", "why", "how",
            ],
            PosTag::Conjunction,
        ),
        (
            &[
                "can", "could", "may", "might", "must", "shall", "should", "will", "would",
            ],
            PosTag::Modal,
        ),
        (
            &[
                "very", "also", "just", "now", "then", "not", "here", "there", "soon", "still",
                "already", "again", "ever", "never", "always", "often", "sometimes", "too",
                "almost", "even", "only", "perhaps", "quite", "rather", "once", "today",
                "tonight", "yesterday", "tomorrow", "ago", "away",
            ],
            PosTag::Adverb,
        ),
        (
            &[
                "new", "old", "big", "small", "large", "little", "good", "bad", "great", "high",
                "low", "long", "short", "latest", "top", "major", "minor", "key", "early", "late",
                "young", "full", "free", "real", "recent", "huge", "global", "local", "national",
                "international", "public", "private", "social", "political", "economic", "best",
                "worst", "first", "last", "next", "final", "main", "own", "same", "different",
                "important", "possible", "likely", "former", "current", "strong", "weak", "hot",
                "cold", "hard", "easy", "fast", "slow", "open", "close", "certain", "clear",
                "whole", "annual", "daily", "weekly", "monthly",
            ],
            PosTag::Adjective,
        ),
        (
            &[
                "has", "have", "had", "having", "do", "does", "did", "doing", "get", "gets",
                "got", "make", "makes", "say", "says", "see", "sees", "take", "takes", "go",
                "goes", "come", "comes", "run", "runs", "ran", "win", "wins", "won", "lose",
                "loses", "lost", "launch", "launches", "announce", "announces", "reveal",
                "reveals", "rise", "rises", "fall", "falls", "hit", "hits", "beat", "beats",
            ],
            PosTag::Verb,
        ),
    ];

    let mut lexicon = FxHashMap::default();
    for (words, tag) in groups {
        for word in words {
            lexicon.entry(*word).or_insert(tag);
        }
    }
    lexicon
});

// -ly words that are nouns, not adverbs.
const LY_NOUNS: &[&str] = &[
    "family", "supply", "reply", "italy", "july", "rally", "ally", "assembly", "anomaly",
    "monopoly", "belly", "jelly", "bully", "holly", "lily", "butterfly", "dragonfly",
];

impl LexiconTagger {
    fn tag_one(token: &str) -> Result<PosTag, TaggingError> {
        if token.is_empty() {
            return Err(TaggingError::UnsupportedToken(token.to_string()));
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            return Ok(PosTag::Numeral);
        }
        if let Some(tag) = LEXICON.get(token) {
            return Ok(*tag);
        }
        if token.len() > 4 && token.ends_with("ly") && !LY_NOUNS.contains(&token) {
            return Ok(PosTag::Adverb);
        }
        if token.len() > 5
            && ["ous", "ful", "less", "ical", "ish"]
                .iter()
                .any(|suffix| token.ends_with(suffix))
        {
            return Ok(PosTag::Adjective);
        }
        if token.len() > 4 && (token.ends_with("ing") || token.ends_with("ed")) {
            return Ok(PosTag::Verb);
        }
        Ok(PosTag::Noun)
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<PosTag>, TaggingError> {
        tokens.iter().map(|token| Self::tag_one(token)).collect()
    }
}
