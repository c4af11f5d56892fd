//! 決定的な英語語幹化。
//!
//! "running" / "runs" / "ran" のような語形を一つのキーにまとめる。辞書を持たない
//! 接尾辞規則と、少数の不規則動詞・複数形の表で構成する。
use std::fmt::Debug;

/// 語を照合キーへ正規化する。入力は小文字化済みであることを前提とする。
pub trait Stemmer: Send + Sync + Debug {
    fn stem(&self, word: &str) -> String;
}

/// 何もしない正規化。語幹化を無効にしたい構成向け。
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }
}

/// 接尾辞規則ベースの語幹化器。
#[derive(Debug, Default, Clone, Copy)]
pub struct SuffixStemmer;

const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("ran", "run"),
    ("went", "go"),
    ("gone", "go"),
    ("did", "do"),
    ("done", "do"),
    ("made", "make"),
    ("said", "say"),
    ("took", "take"),
    ("taken", "take"),
    ("began", "begin"),
    ("begun", "begin"),
    ("won", "win"),
    ("lost", "lose"),
    ("held", "hold"),
    ("told", "tell"),
    ("bought", "buy"),
    ("sold", "sell"),
    ("paid", "pay"),
    ("led", "lead"),
    ("met", "meet"),
    ("brought", "bring"),
    ("thought", "think"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("wrote", "write"),
    ("written", "write"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("risen", "rise"),
    ("struck", "strike"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
];

// Words whose trailing "s" is not a plural marker.
const KEEP_TRAILING_S: &[&str] = &[
    "news",
    "series",
    "species",
    "physics",
    "politics",
    "economics",
    "mathematics",
    "lens",
    "gas",
    "bias",
    "chaos",
    "texas",
    "paris",
    "always",
];

impl Stemmer for SuffixStemmer {
    /// 規則が当たらなくなるまで繰り返し適用する。結果は不動点なので `stem(stem(w)) == stem(w)`。
    fn stem(&self, word: &str) -> String {
        let mut current = word.to_string();
        // suffix rules always shorten the word and irregular bases are never forms themselves
        while let Some(next) = stem_step(&current) {
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

fn stem_step(word: &str) -> Option<String> {
    if let Some((_, base)) = IRREGULAR_FORMS.iter().find(|(form, _)| *form == word) {
        return Some((*base).to_string());
    }
    if word.len() <= 3
        || KEEP_TRAILING_S.contains(&word)
        || !word.chars().all(|c| c.is_ascii_lowercase() || c == '-')
    {
        return None;
    }
    strip_suffix(word)
}

fn strip_suffix(word: &str) -> Option<String> {
    if word.len() > 4
        && let Some(base) = word.strip_suffix("ies")
    {
        return Some(format!("{base}y"));
    }
    if let Some(base) = word.strip_suffix("sses") {
        return Some(format!("{base}ss"));
    }
    if word.len() > 5
        && let Some(base) = word.strip_suffix("ing")
        && has_vowel(base)
    {
        return Some(undouble(base));
    }
    if word.len() > 4
        && let Some(base) = word.strip_suffix("ed")
        && has_vowel(base)
        && !base.ends_with('e')
    {
        return Some(undouble(base));
    }
    if word.len() > 4
        && let Some(base) = word.strip_suffix("es")
        && ["ch", "sh", "x", "z", "ss"]
            .iter()
            .any(|ending| base.ends_with(ending))
    {
        return Some(base.to_string());
    }
    if word.ends_with('s')
        && !["ss", "us", "is"].iter().any(|ending| word.ends_with(ending))
    {
        return Some(word[..word.len() - 1].to_string());
    }
    None
}

fn has_vowel(base: &str) -> bool {
    base.chars().any(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
}

/// "runn" -> "run", "stopp" -> "stop". l/s/z の重複は語幹の一部として残す。
fn undouble(base: &str) -> String {
    let bytes = base.as_bytes();
    let len = bytes.len();
    if len >= 2 {
        let last = bytes[len - 1];
        if last == bytes[len - 2]
            && last.is_ascii_alphabetic()
            && !matches!(last, b'a' | b'e' | b'i' | b'o' | b'u' | b'l' | b's' | b'z')
        {
            return base[..len - 1].to_string();
        }
    }
    base.to_string()
}
