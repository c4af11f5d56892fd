use serde::{Deserialize, Deserializer, Serialize};

/// ユーザーが明示的に設定した嗜好。行動シグナルとは独立して丸ごと保存される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(deserialize_with = "distinct_list")]
    pub categories: Vec<String>,
    pub keywords: String,
    #[serde(deserialize_with = "distinct_list")]
    pub locations: Vec<String>,
    pub share_read_time: bool,
    pub experimental_opt_in: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            categories: vec!["general".to_string()],
            keywords: String::new(),
            locations: Vec::new(),
            share_read_time: false,
            experimental_opt_in: false,
        }
    }
}

impl Preferences {
    /// 登録時の嗜好。カテゴリ未指定なら `general`。
    #[must_use]
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories = dedup(categories.into_iter().map(Into::into));
        if categories.is_empty() {
            Self::default()
        } else {
            Self {
                categories,
                ..Self::default()
            }
        }
    }
}

fn dedup(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn distinct_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(dedup(values.into_iter()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_registration() {
        let prefs = Preferences::default();
        assert_eq!(prefs.categories, vec!["general"]);
        assert!(prefs.keywords.is_empty());
        assert!(!prefs.share_read_time);
        assert!(!prefs.experimental_opt_in);
    }

    #[test]
    fn stored_document_without_new_flags_still_loads() {
        let prefs: Preferences = serde_json::from_str(
            r#"{"categories": ["sports", "sports", "health"], "keywords": "f1", "locations": null}"#,
        )
        .expect("parse preferences");
        assert_eq!(prefs.categories, vec!["sports", "health"]);
        assert!(prefs.locations.is_empty());
        assert!(!prefs.experimental_opt_in);
    }

    #[test]
    fn empty_registration_categories_fall_back_to_general() {
        assert_eq!(
            Preferences::with_categories(Vec::<String>::new()).categories,
            vec!["general"]
        );
        assert_eq!(
            Preferences::with_categories(["science"]).categories,
            vec!["science"]
        );
    }
}
