//! The domain payload an action hands over to its responder.

use serde_json::{Map, Value};

use crate::identifier::Identifier;

/// Immutable carrier of a domain result: its type, status and values.
///
/// The type selects the responder and is fixed at construction. Every
/// `with_*` method returns a new payload and leaves `self` untouched:
///
/// ```rust
/// use adroit::DomainPayload;
///
/// let original = DomainPayload::new("user");
/// let updated = original.with_value("name", "alice").with_status("found");
///
/// assert_eq!(original.value("name"), None);
/// assert_eq!(updated.value("name"), Some(&serde_json::json!("alice")));
/// ```
#[derive(Clone, Debug)]
pub struct DomainPayload {
    payload_type: Identifier,
    status: Option<Value>,
    values: Map<String, Value>,
}

impl DomainPayload {
    pub fn new(payload_type: impl Into<Identifier>) -> Self {
        Self {
            payload_type: payload_type.into(),
            status: None,
            values: Map::new(),
        }
    }

    /// Creates a payload pre-filled with `values`.
    pub fn from_values<I, K, V>(payload_type: impl Into<Identifier>, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::new(payload_type).with_values(values)
    }

    pub fn payload_type(&self) -> &Identifier {
        &self.payload_type
    }

    pub fn status(&self) -> Option<&Value> {
        self.status.as_ref()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value for `key`, or `default` when the key is absent.
    pub fn value_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.values.get(key).unwrap_or(default)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn with_value(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut new = self.clone();
        new.values.insert(key.into(), value.into());
        new
    }

    /// Sets every given pair, overwriting existing keys.
    pub fn with_values<I, K, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut new = self.clone();
        new.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        new
    }

    pub fn with_status(&self, status: impl Into<Value>) -> Self {
        let mut new = self.clone();
        new.status = Some(status.into());
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn with_value_leaves_the_original_untouched() {
        let original = DomainPayload::new("test").with_value("k", "before");
        let updated = original.with_value("k", "after");

        assert_eq!(original.value("k"), Some(&json!("before")));
        assert_eq!(updated.value("k"), Some(&json!("after")));
    }

    #[test]
    fn with_values_merges_into_a_copy() {
        let original = DomainPayload::from_values("test", [("a", 1), ("b", 2)]);
        let updated = original.with_values([("b", 3), ("c", 4)]);

        assert_eq!(original.values().len(), 2);
        assert_eq!(original.value("b"), Some(&json!(2)));
        assert_eq!(updated.value("a"), Some(&json!(1)));
        assert_eq!(updated.value("b"), Some(&json!(3)));
        assert_eq!(updated.value("c"), Some(&json!(4)));
    }

    #[test]
    fn with_status_keeps_the_type() {
        let original = DomainPayload::new("order");
        let updated = original.with_status(json!({"code": "created"}));

        assert_eq!(original.status(), None);
        assert_eq!(updated.status(), Some(&json!({"code": "created"})));
        assert_eq!(updated.payload_type(), &Identifier::from("order"));
    }

    #[test]
    fn absent_keys_fall_back_to_the_default() {
        let payload = DomainPayload::new("test");
        let default = json!("fallback");

        assert_eq!(payload.value("missing"), None);
        assert_eq!(payload.value_or("missing", &default), &default);
    }
}
