//! 挿入順を保つ重みマップ。
use std::fmt;

use rustc_hash::FxHashMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 名前 → 非負の重み。
///
/// 反復順は初回挿入順で固定なので、同点の並べ替えが決定的になる。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightMap {
    entries: Vec<(String, f64)>,
    index: FxHashMap<String, usize>,
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

impl WeightMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 未登録のキーは 0。
    #[must_use]
    pub fn get(&self, key: &str) -> f64 {
        self.index
            .get(key)
            .and_then(|idx| self.entries.get(*idx))
            .map_or(0.0, |(_, weight)| *weight)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// `delta` を加算する。空キー、0 以下、非有限の増分は無視する。
    pub fn add(&mut self, key: &str, delta: f64) {
        if key.is_empty() || !(delta.is_finite() && delta > 0.0) {
            return;
        }
        if let Some(idx) = self.index.get(key) {
            self.entries[*idx].1 += delta;
        } else {
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), delta));
        }
    }

    /// 値をそのまま設定する。負数・非有限値は 0 に補正する。
    pub fn set(&mut self, key: &str, weight: f64) {
        if key.is_empty() {
            return;
        }
        let weight = sanitize(weight);
        if let Some(idx) = self.index.get(key) {
            self.entries[*idx].1 = weight;
        } else {
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), weight));
        }
    }

    /// すべての重みに `factor` を掛ける。
    pub fn scale(&mut self, factor: f64) {
        for (_, weight) in &mut self.entries {
            *weight *= factor;
        }
    }

    /// 別のマップの重みをすべて加算する。
    pub fn merge(&mut self, other: &Self) {
        for (key, weight) in other.iter() {
            self.add(key, weight);
        }
    }

    /// 重み降順の安定ソート。同点は挿入順。
    #[must_use]
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries
            .iter()
            .map(|(key, weight)| (key.as_str(), *weight))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl<K: AsRef<str>> FromIterator<(K, f64)> for WeightMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, weight) in iter {
            map.set(key.as_ref(), weight);
        }
        map
    }
}

impl Serialize for WeightMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, weight) in &self.entries {
            map.serialize_entry(key, weight)?;
        }
        map.end()
    }
}

struct WeightMapVisitor;

impl<'de> Visitor<'de> for WeightMapVisitor {
    type Value = WeightMap;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of names to numeric weights")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = WeightMap::new();
        while let Some((key, weight)) = access.next_entry::<String, Option<f64>>()? {
            map.set(&key, weight.unwrap_or(0.0));
        }
        Ok(map)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(WeightMap::new())
    }
}

impl<'de> Deserialize<'de> for WeightMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WeightMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates_and_keeps_insertion_order() {
        let mut map = WeightMap::new();
        map.add("tech", 1.0);
        map.add("sports", 2.0);
        map.add("tech", 3.0);
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("tech", 4.0), ("sports", 2.0)]);
    }

    #[test]
    fn add_ignores_invalid_increments() {
        let mut map = WeightMap::new();
        map.add("tech", -1.0);
        map.add("tech", f64::NAN);
        map.add("", 1.0);
        map.add("tech", 0.0);
        assert!(map.is_empty());
        assert!((map.get("missing") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ranked_is_stable_for_ties() {
        let map: WeightMap = [("a", 1.0), ("b", 3.0), ("c", 1.0), ("d", 3.0)]
            .into_iter()
            .collect();
        let keys: Vec<&str> = map.ranked().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn deserialization_repairs_bad_weights() {
        let map: WeightMap =
            serde_json::from_str(r#"{"tech": 2.5, "bad": -3, "missing": null}"#).expect("parse");
        assert!((map.get("tech") - 2.5).abs() < f64::EPSILON);
        assert!((map.get("bad") - 0.0).abs() < f64::EPSILON);
        assert!(map.contains("missing"));

        let null_map: WeightMap = serde_json::from_str("null").expect("parse null");
        assert!(null_map.is_empty());
    }

    #[test]
    fn serializes_in_insertion_order() {
        let map: WeightMap = [("z", 1.0), ("a", 2.0)].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&map).expect("serialize"),
            r#"{"z":1.0,"a":2.0}"#
        );
    }
}
