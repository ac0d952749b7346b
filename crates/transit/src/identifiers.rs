//! Type-safe identifiers for lines.
//!
//! Identifiers use Arc<str> so that every computed position can carry its
//! line id without allocating.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Unique identifier of a transit line.
///
/// Schedule data in the wild uses both integers (`"id": 7`) and strings
/// (`"id": "7A"`), so both convert into the same textual form.
#[derive(Clone, Debug)]
pub struct LineIdentifier(Arc<str>);

impl LineIdentifier {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for LineIdentifier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for LineIdentifier {}

impl Hash for LineIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for LineIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LineIdentifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for LineIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<String> for LineIdentifier {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for LineIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u32> for LineIdentifier {
    fn from(n: u32) -> Self {
        Self::new(n.to_string())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::LineIdentifier;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawIdentifier {
        Number(u64),
        Text(String),
    }

    impl<'de> Deserialize<'de> for LineIdentifier {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Ok(match RawIdentifier::deserialize(deserializer)? {
                RawIdentifier::Number(n) => LineIdentifier::new(n.to_string()),
                RawIdentifier::Text(s) => LineIdentifier::new(s),
            })
        }
    }

    impl Serialize for LineIdentifier {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = LineIdentifier::new("12");
        let id2 = LineIdentifier::from(12u32);
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0)); // Clone shares Arc
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(LineIdentifier::new("1"), 42);

        assert_eq!(map.get(&LineIdentifier::from(1u32)), Some(&42));
    }

    #[test]
    fn test_identifier_display() {
        let id = LineIdentifier::new("ferry_2");
        assert_eq!(format!("{}", id), "ferry_2");
        assert_eq!(format!("[{:<9}]", id), "[ferry_2  ]");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_identifier_from_json_number_or_string() {
        let ids: Vec<LineIdentifier> = serde_json::from_str(r#"[3, "3", "3A"]"#).unwrap();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2].as_str(), "3A");
    }
}
