//! TF-IDF によるカテゴリ順位付け。
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use sprs::CsVec;
use tracing::debug;

use crate::text::{Stemmer, StopwordLanguage, Stopwords, analyze_terms};

/// カテゴリ → そのカテゴリの既知記事を連結したテキスト。挿入順を保つ。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCorpus {
    documents: Vec<(String, String)>,
}

impl CategoryCorpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のカテゴリなら空白区切りで連結する。
    pub fn append(&mut self, category: &str, text: &str) {
        if let Some((_, document)) = self.documents.iter_mut().find(|(name, _)| name == category)
        {
            if !document.is_empty() {
                document.push(' ');
            }
            document.push_str(text);
        } else {
            self.documents.push((category.to_string(), text.to_string()));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.documents
            .iter()
            .map(|(category, text)| (category.as_str(), text.as_str()))
    }
}

impl<C: AsRef<str>, T: AsRef<str>> FromIterator<(C, T)> for CategoryCorpus {
    fn from_iter<I: IntoIterator<Item = (C, T)>>(iter: I) -> Self {
        let mut corpus = Self::new();
        for (category, text) in iter {
            corpus.append(category.as_ref(), text.as_ref());
        }
        corpus
    }
}

/// ユーザーのキーワード集合とカテゴリ文書のコサイン類似度でカテゴリを並べる。
#[derive(Debug, Clone)]
pub struct CategoryRanker {
    stopwords: Arc<Stopwords>,
    stemmer: Arc<dyn Stemmer>,
    known: Option<Arc<FxHashSet<String>>>,
}

impl CategoryRanker {
    #[must_use]
    pub fn new(language: StopwordLanguage, stemmer: Arc<dyn Stemmer>) -> Self {
        Self {
            stopwords: Arc::new(Stopwords::for_language(language)),
            stemmer,
            known: None,
        }
    }

    /// 推薦してよいカテゴリを限定する。空なら制限しない。
    ///
    /// IDF はコーパス全体で計算し、順位付けの後で既知カテゴリ以外を落とす。
    #[must_use]
    pub fn with_known_categories<S: AsRef<str>>(mut self, categories: &[S]) -> Self {
        let known: FxHashSet<String> = categories
            .iter()
            .map(|category| category.as_ref().to_string())
            .collect();
        self.known = (!known.is_empty()).then(|| Arc::new(known));
        self
    }

    /// 類似度の高い順にカテゴリ名を返す。同点はコーパスの順序を保つ。
    ///
    /// コーパスかキーワード集合が空なら空を返す。既定カテゴリの補完は呼び出し側の責務。
    #[must_use]
    pub fn rank_categories(&self, keywords: &[String], corpus: &CategoryCorpus) -> Vec<String> {
        let query = keywords
            .iter()
            .map(|keyword| keyword.trim())
            .filter(|keyword| !keyword.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if corpus.is_empty() || query.is_empty() {
            return Vec::new();
        }

        let documents: Vec<Vec<String>> = corpus.iter().map(|(_, text)| self.terms(text)).collect();
        let space = VectorSpace::fit(&documents);
        let query_vector = space.transform(&self.terms(&query));

        let mut scored: Vec<(&str, f64)> = corpus
            .iter()
            .zip(&documents)
            .filter(|((category, _), _)| self.is_known(category))
            .map(|((category, _), terms)| (category, query_vector.dot(&space.transform(terms))))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        debug!(
            categories = scored.len(),
            vocabulary = space.vocabulary.len(),
            "ranked categories by tf-idf similarity"
        );
        scored
            .into_iter()
            .map(|(category, _)| category.to_string())
            .collect()
    }

    fn is_known(&self, category: &str) -> bool {
        self.known
            .as_ref()
            .is_none_or(|known| known.contains(category))
    }

    fn terms(&self, text: &str) -> Vec<String> {
        analyze_terms(text)
            .into_iter()
            .filter(|term| !self.stopwords.contains(term))
            .map(|term| self.stemmer.stem(&term))
            .collect()
    }
}

/// コーパスに適合させた語彙と IDF。
struct VectorSpace {
    vocabulary: FxHashMap<String, usize>,
    idf: Vec<f64>,
}

impl VectorSpace {
    #[allow(clippy::cast_precision_loss)]
    fn fit(documents: &[Vec<String>]) -> Self {
        let mut vocabulary: FxHashMap<String, usize> = FxHashMap::default();
        let mut doc_freq: Vec<usize> = Vec::new();
        for terms in documents {
            let mut seen_in_doc: Vec<usize> = Vec::new();
            for term in terms {
                let next = vocabulary.len();
                let idx = *vocabulary.entry(term.clone()).or_insert(next);
                if idx == doc_freq.len() {
                    doc_freq.push(0);
                }
                if !seen_in_doc.contains(&idx) {
                    seen_in_doc.push(idx);
                    doc_freq[idx] += 1;
                }
            }
        }

        // IDF(t) = ln((N + 1) / (DF(t) + 1)) + 1
        let n = documents.len() as f64;
        let idf = doc_freq
            .iter()
            .map(|df| ((n + 1.0) / (*df as f64 + 1.0)).ln() + 1.0)
            .collect();
        Self { vocabulary, idf }
    }

    /// 生の出現回数 × IDF を L2 正規化した疎ベクトル。語彙外の語は無視する。
    fn transform(&self, terms: &[String]) -> CsVec<f64> {
        let mut counts: FxHashMap<usize, f64> = FxHashMap::default();
        for term in terms {
            if let Some(idx) = self.vocabulary.get(term) {
                *counts.entry(*idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        entries.sort_unstable_by_key(|(idx, _)| *idx);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        let (indices, data): (Vec<usize>, Vec<f64>) = entries
            .into_iter()
            .map(|(idx, w)| (idx, if norm > 0.0 { w / norm } else { 0.0 }))
            .unzip();
        CsVec::new(self.idf.len(), indices, data)
    }
}
