//! Typed records backed by an [`Attributes`] container.

use serde_json::{Map, Value};

use crate::container::Attributes;
use crate::error::Result;
use crate::key::Key;

/// A record type that wraps an attribute container and declares which keys
/// must be present when it is built.
///
/// ```
/// use ledc_attributes::{AttributeRecord, Attributes};
/// use serde_json::json;
///
/// struct Order(Attributes);
///
/// impl AttributeRecord for Order {
///     const REQUIRED_KEYS: &'static [&'static str] = &["order_no", "buyer.id"];
///
///     fn from_attributes(attributes: Attributes) -> Self {
///         Order(attributes)
///     }
///
///     fn attributes(&self) -> &Attributes {
///         &self.0
///     }
///
///     fn attributes_mut(&mut self) -> &mut Attributes {
///         &mut self.0
///     }
/// }
///
/// let json = json!({"order_no": "A1", "buyer": {"id": 9}});
/// let order = Order::try_from_value(json).unwrap();
/// assert_eq!(order.get("buyer.id"), Some(&json!(9)));
/// assert!(Order::try_from_value(json!({"order_no": "A1"})).is_err());
/// ```
pub trait AttributeRecord: Sized {
    /// Dotted paths that must resolve after construction.
    const REQUIRED_KEYS: &'static [&'static str] = &[];

    fn from_attributes(attributes: Attributes) -> Self;

    fn attributes(&self) -> &Attributes;

    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Build the record from a mapping, validating [`Self::REQUIRED_KEYS`].
    fn try_from_map(map: Map<String, Value>) -> Result<Self> {
        Attributes::with_required_keys(map, Self::REQUIRED_KEYS.iter().copied())
            .map(Self::from_attributes)
    }

    /// Build the record from any JSON value; non-objects start out empty.
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::try_from_map(map),
            _ => Self::try_from_map(Map::new()),
        }
    }

    fn get<K: Into<Key>>(&self, key: K) -> Option<&Value> {
        self.attributes().get(key)
    }

    fn has<K: Into<Key>>(&self, key: K) -> bool {
        self.attributes().has(key)
    }

    fn set<K: Into<Key>>(&mut self, key: K, value: Value) -> &mut Self {
        self.attributes_mut().set(key, value);
        self
    }

    fn to_json(&self) -> Result<String> {
        self.attributes().to_json()
    }
}
