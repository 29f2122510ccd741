//! Attribute keys and dotted-path resolution.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

/// Separator between path segments in a dotted key.
pub const PATH_SEPARATOR: char = '.';

/// A string or integer key into the attribute mapping.
///
/// Integer keys address the same entry as their decimal string form, so
/// `Key::from(1)` and `Key::from("1")` are interchangeable for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(String),
    Index(i64),
}

impl Key {
    /// The top-level map key this key is stored under.
    pub fn as_map_key(&self) -> Cow<'_, str> {
        match self {
            Key::Name(name) => Cow::Borrowed(name.as_str()),
            Key::Index(index) => Cow::Owned(index.to_string()),
        }
    }

    /// Path segments obtained by splitting on `.`.
    ///
    /// An integer key never contains a separator and yields one segment.
    pub fn segments(&self) -> Vec<Cow<'_, str>> {
        match self {
            Key::Name(name) => name.split(PATH_SEPARATOR).map(Cow::Borrowed).collect(),
            Key::Index(index) => vec![Cow::Owned(index.to_string())],
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(name.clone())
    }
}

impl From<i64> for Key {
    fn from(index: i64) -> Self {
        Key::Index(index)
    }
}

impl From<i32> for Key {
    fn from(index: i32) -> Self {
        Key::Index(i64::from(index))
    }
}

impl From<u32> for Key {
    fn from(index: u32) -> Self {
        Key::Index(i64::from(index))
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        // Lengths past i64::MAX cannot occur for in-memory maps.
        Key::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

/// Resolve one path segment against a nested value.
///
/// Objects are looked up by key. Arrays are looked up by index, but only when
/// the segment is the canonical decimal form of that index (`"01"` is a
/// string key, not index 1). Scalars have no children.
pub(crate) fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => canonical_index(segment).and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Parse `segment` as an integer key when it is written canonically.
pub(crate) fn canonical_integer(segment: &str) -> Option<i64> {
    let parsed = segment.parse::<i64>().ok()?;
    (parsed.to_string() == segment).then_some(parsed)
}

fn canonical_index(segment: &str) -> Option<usize> {
    canonical_integer(segment).and_then(|index| usize::try_from(index).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn name_keys_split_on_dots() {
        let key = Key::from("user.address.city");
        let segments: Vec<String> = key.segments().into_iter().map(Cow::into_owned).collect();
        assert_eq!(segments, vec!["user", "address", "city"]);
    }

    #[test]
    fn empty_segments_are_kept() {
        let key = Key::from("a..b");
        assert_eq!(key.segments().len(), 3);
        assert_eq!(Key::from("").segments(), vec![Cow::Borrowed("")]);
    }

    #[test]
    fn integer_keys_use_decimal_form() {
        assert_eq!(Key::from(7).as_map_key(), "7");
        assert_eq!(Key::from(-3_i64).segments(), vec![Cow::<str>::Owned("-3".to_string())]);
        assert_eq!(Key::from(12usize).to_string(), "12");
    }

    #[test]
    fn child_resolves_objects_and_arrays() {
        let value = json!({"tags": ["a", "b"], "name": "x"});
        assert_eq!(child(&value, "name"), Some(&json!("x")));

        let tags = child(&value, "tags").expect("tags present");
        assert_eq!(child(tags, "1"), Some(&json!("b")));
        assert_eq!(child(tags, "2"), None);
        assert_eq!(child(tags, "01"), None);
        assert_eq!(child(tags, "-1"), None);
        assert_eq!(child(&json!("scalar"), "0"), None);
    }

    #[test]
    fn canonical_integers_reject_padding() {
        assert_eq!(canonical_integer("42"), Some(42));
        assert_eq!(canonical_integer("-5"), Some(-5));
        assert_eq!(canonical_integer("042"), None);
        assert_eq!(canonical_integer("+1"), None);
        assert_eq!(canonical_integer("1.0"), None);
    }
}
