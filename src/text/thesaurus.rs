//! 類義語辞書。
//!
//! 見出し語を `fst::Map` で索引し、値を同義語集合（synset）のポスティング番号にする。
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use fst::{Map, MapBuilder};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThesaurusError {
    #[error("failed to read thesaurus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse thesaurus: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to build thesaurus index: {0}")]
    Index(#[from] fst::Error),
}

/// 類義語展開の上限。出力の爆発を防ぐため synset 数と各 synset の語数を絞る。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynonymBounds {
    pub max_synsets: usize,
    pub max_lemmas: usize,
}

impl Default for SynonymBounds {
    fn default() -> Self {
        Self {
            max_synsets: 2,
            max_lemmas: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThesaurusFile {
    #[serde(default)]
    synsets: Vec<Vec<String>>,
}

/// ニュース向けの組み込み synset。各 synset の先頭語が代表語。
const BUILTIN_SYNSETS: &[&[&str]] = &[
    &["ai", "artificial_intelligence", "machine_intelligence"],
    &["chip", "microchip", "microprocessor"],
    &["computer", "computing_machine", "pc"],
    &["software", "software_program", "program"],
    &["internet", "net", "web"],
    &["phone", "telephone", "smartphone"],
    &["robot", "automaton", "bot"],
    &["breakthrough", "discovery", "find"],
    &["launch", "release", "unveil"],
    &["research", "study", "inquiry"],
    &["science", "scientific_discipline"],
    &["soccer", "association_football", "football"],
    &["football", "football_game"],
    &["match", "game", "contest"],
    &["team", "squad"],
    &["player", "participant"],
    &["win", "victory", "triumph"],
    &["election", "vote", "ballot"],
    &["government", "administration", "authorities"],
    &["economy", "economic_system"],
    &["market", "marketplace", "mart"],
    &["stock", "share", "equity"],
    &["company", "firm", "corporation"],
    &["film", "movie", "picture"],
    &["movie", "film", "motion_picture"],
    &["music", "song", "melody"],
    &["car", "automobile", "auto"],
    &["doctor", "physician", "medico"],
    &["health", "wellness"],
    &["disease", "illness", "sickness"],
    &["vaccine", "vaccinum"],
    &["climate", "clime"],
    &["usa", "united_states", "america"],
    &["uk", "united_kingdom", "britain"],
    &["germany", "deutschland"],
    &["china", "prc"],
    &["india", "bharat"],
    &["russia", "russian_federation"],
];

/// synset 一覧と、見出し語から synset 番号への索引。
#[derive(Debug)]
pub struct Thesaurus {
    synsets: Vec<Vec<String>>,
    index: Map<Vec<u8>>,
    postings: Vec<SmallVec<[u32; 4]>>,
}

impl Thesaurus {
    /// synset 列から辞書を構築する。空の語・空の synset は無視する。
    ///
    /// # Errors
    /// 索引の構築に失敗した場合。
    pub fn from_synsets<I, S, L>(synsets: I) -> Result<Self, ThesaurusError>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let synsets: Vec<Vec<String>> = synsets
            .into_iter()
            .map(|synset| {
                synset
                    .into_iter()
                    .map(|lemma| lemma.as_ref().trim().to_string())
                    .filter(|lemma| !lemma.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|synset| !synset.is_empty())
            .collect();

        // BTreeMap keeps keys sorted for the fst builder
        let mut by_key: BTreeMap<String, SmallVec<[u32; 4]>> = BTreeMap::new();
        for (idx, synset) in synsets.iter().enumerate() {
            let Ok(idx) = u32::try_from(idx) else {
                break;
            };
            for lemma in synset {
                let entry = by_key.entry(lemma_key(lemma)).or_default();
                if !entry.contains(&idx) {
                    entry.push(idx);
                }
            }
        }

        let mut buffer = Vec::new();
        let mut postings = Vec::with_capacity(by_key.len());
        {
            let mut builder = MapBuilder::new(&mut buffer)?;
            for (posting, (key, synset_ids)) in (0_u64..).zip(by_key) {
                builder.insert(key.as_bytes(), posting)?;
                postings.push(synset_ids);
            }
            builder.finish()?;
        }
        let index = Map::new(buffer)?;

        Ok(Self {
            synsets,
            index,
            postings,
        })
    }

    /// 組み込みのニュース向け辞書。
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_synsets(BUILTIN_SYNSETS.iter().map(|synset| synset.iter()))
            .expect("built-in synsets are well-formed")
    }

    /// 類義語展開を行わない空の辞書。
    #[must_use]
    pub fn empty() -> Self {
        Self::from_synsets(std::iter::empty::<Vec<String>>())
            .expect("empty thesaurus index builds")
    }

    /// `synsets: [[lemma, ...], ...]` 形式の YAML から構築する。
    ///
    /// # Errors
    /// YAML の構文エラー、または索引の構築に失敗した場合。
    pub fn from_yaml_str(raw: &str) -> Result<Self, ThesaurusError> {
        let file: ThesaurusFile = serde_yaml::from_str(raw)?;
        Self::from_synsets(file.synsets)
    }

    /// YAML ファイルから読み込む。
    ///
    /// # Errors
    /// ファイルが読めない、または [`Thesaurus::from_yaml_str`] が失敗した場合。
    pub fn from_path(path: &Path) -> Result<Self, ThesaurusError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ThesaurusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.synsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.synsets.is_empty()
    }

    /// `word` を含む synset から、上限内の語を登録順で返す。
    #[must_use]
    pub fn candidates(&self, word: &str, bounds: SynonymBounds) -> Vec<&str> {
        let Some(posting) = self.index.get(lemma_key(word).as_bytes()) else {
            return Vec::new();
        };
        let Some(synset_ids) = usize::try_from(posting)
            .ok()
            .and_then(|posting| self.postings.get(posting))
        else {
            return Vec::new();
        };

        synset_ids
            .iter()
            .take(bounds.max_synsets)
            .filter_map(|id| self.synsets.get(*id as usize))
            .flat_map(|synset| synset.iter().take(bounds.max_lemmas))
            .map(String::as_str)
            .collect()
    }
}

/// 見出し語の正規化。WordNet 風の `_` 区切りと空白をハイフンに揃える。
pub(crate) fn lemma_key(lemma: &str) -> String {
    lemma
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '-' } else { c })
        .collect()
}
