//! Key/value metadata types

use chrono::{DateTime, Utc};

use crate::texture_pipeline::common::error::{ConversionError, Result};

/// A typed metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
    Timestamp(DateTime<Utc>),
}

impl MetadataValue {
    /// Type tag written ahead of the value bytes.
    pub fn tag(&self) -> u8 {
        match self {
            MetadataValue::String(_) => 1,
            MetadataValue::I32(_) => 2,
            MetadataValue::I64(_) => 3,
            MetadataValue::F32(_) => 4,
            MetadataValue::F64(_) => 5,
            MetadataValue::F32Array(_) => 6,
            MetadataValue::F64Array(_) => 7,
            MetadataValue::Timestamp(_) => 8,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<i32> for MetadataValue {
    fn from(value: i32) -> Self {
        MetadataValue::I32(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::I64(value)
    }
}

impl From<f32> for MetadataValue {
    fn from(value: f32) -> Self {
        MetadataValue::F32(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::F64(value)
    }
}

impl From<Vec<f32>> for MetadataValue {
    fn from(value: Vec<f32>) -> Self {
        MetadataValue::F32Array(value)
    }
}

impl From<Vec<f64>> for MetadataValue {
    fn from(value: Vec<f64>) -> Self {
        MetadataValue::F64Array(value)
    }
}

impl From<DateTime<Utc>> for MetadataValue {
    fn from(value: DateTime<Utc>) -> Self {
        MetadataValue::Timestamp(value)
    }
}

/// Insertion-ordered map of unique string keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataMap {
    entries: Vec<(String, MetadataValue)>,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Checks that every entry, and the entry count, can be encoded.
    pub fn validate(&self) -> Result<()> {
        check_encoded_len("metadata entry count", self.entries.len())?;
        for (key, value) in &self.entries {
            if key.is_empty() {
                return Err(ConversionError::InvalidMetadata(
                    "empty metadata key".to_string(),
                ));
            }
            check_encoded_len("metadata key length", key.len())?;
            let value_len = match value {
                MetadataValue::String(s) => s.len(),
                MetadataValue::F32Array(v) => v.len(),
                MetadataValue::F64Array(v) => v.len(),
                _ => 0,
            };
            check_encoded_len("metadata value length", value_len).map_err(|_| {
                ConversionError::InvalidMetadata(format!(
                    "value of '{}' is too large to encode",
                    key
                ))
            })?;
        }
        Ok(())
    }
}

/// Lengths and counts are written as `u32`.
fn check_encoded_len(what: &str, len: usize) -> Result<()> {
    if u32::try_from(len).is_err() {
        return Err(ConversionError::InvalidMetadata(format!(
            "{} {} does not fit in 32 bits",
            what, len
        )));
    }
    Ok(())
}

impl<K: Into<String>, V: Into<MetadataValue>> FromIterator<(K, V)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = MetadataMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<MetadataValue>> Extend<(K, V)> for MetadataMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_replaces() {
        let mut map = MetadataMap::new();
        map.insert("b", 1i32);
        map.insert("a", "text");
        let previous = map.insert("b", 2.5f64);

        assert_eq!(previous, Some(MetadataValue::I32(1)));
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&MetadataValue::F64(2.5)));
    }

    #[test]
    fn test_empty_key_fails_validation() {
        let map: MetadataMap = [("", 1i64)].into_iter().collect();
        assert!(matches!(
            map.validate(),
            Err(ConversionError::InvalidMetadata(_))
        ));
    }

    #[test]
    fn test_encoded_lengths_must_fit_u32() {
        assert!(check_encoded_len("metadata entry count", u32::MAX as usize).is_ok());
        assert!(matches!(
            check_encoded_len("metadata entry count", u32::MAX as usize + 1),
            Err(ConversionError::InvalidMetadata(_))
        ));
    }

    #[test]
    fn test_tags_are_distinct() {
        let values: Vec<MetadataValue> = vec![
            "s".into(),
            1i32.into(),
            1i64.into(),
            1f32.into(),
            1f64.into(),
            vec![1f32].into(),
            vec![1f64].into(),
            Utc::now().into(),
        ];
        let mut tags: Vec<u8> = values.iter().map(MetadataValue::tag).collect();
        tags.dedup();
        assert_eq!(tags, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
