//! 説明文（explanation trail）の組み立て。
use super::ScoreBreakdown;

pub(crate) const ACTIVITY_NOTE: &str = "Recommended based on your activity";

/// 重みを表示用に整形する。整数値は小数点なし、それ以外は小数第 2 位まで。
#[must_use]
pub fn format_weight(weight: f64) -> String {
    if weight.fract().abs() < f64::EPSILON && weight.abs() < 1e15 {
        format!("{weight:.0}")
    } else {
        let formatted = format!("{weight:.2}");
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub(crate) fn locations_note(locations: &[String]) -> Option<String> {
    (!locations.is_empty()).then(|| format!("Locations: {}", locations.join(", ")))
}

/// 一致したシグナルを固定順（カテゴリ、ソース、キーワード 1 件）で並べる。
pub(crate) fn match_note(breakdown: &ScoreBreakdown) -> Option<String> {
    let mut parts = Vec::with_capacity(3);
    if let Some(weight) = breakdown.category_match {
        parts.push(format!("Category match ({})", format_weight(weight)));
    }
    if let Some(weight) = breakdown.source_match {
        parts.push(format!("Source match ({})", format_weight(weight)));
    }
    if let Some(keyword) = &breakdown.keyword_match {
        parts.push(format!("Keyword match ({keyword})"));
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}
