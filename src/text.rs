//! キーワード抽出のためのテキスト処理。
//!
//! トークナイズ、ストップワード除去、品詞フィルタ、語幹化、類義語展開を
//! 注入可能な部品として提供する。
mod keywords;
mod stemmer;
mod stopwords;
mod tagger;
mod thesaurus;
mod tokenizer;

pub use keywords::{KeywordExtractor, KeywordExtractorBuilder};
pub use stemmer::{IdentityStemmer, Stemmer, SuffixStemmer};
pub use stopwords::{StopwordLanguage, Stopwords};
pub use tagger::{LexiconTagger, PosTag, PosTagger, TaggingError};
pub use thesaurus::{SynonymBounds, Thesaurus, ThesaurusError};
pub use tokenizer::tokenize;

pub(crate) use tokenizer::analyze_terms;
