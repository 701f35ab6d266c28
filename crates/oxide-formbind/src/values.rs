//! Submitted form values.

use std::collections::HashMap;

/// Values submitted with a form, keyed by field name.
///
/// A key may carry several values, e.g. for checkbox groups; their order is
/// kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: HashMap<String, Vec<String>>,
}

impl FormValues {
    /// Creates an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to a key.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Replaces all values of a key.
    pub fn set<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Builder method to append a value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Returns the first value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value of a key.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns whether the key was submitted.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates over keys and their values in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Returns the number of submitted keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (key, value) in iter {
            values.add(key, value);
        }
        values
    }
}

impl From<HashMap<String, Vec<String>>> for FormValues {
    fn from(values: HashMap<String, Vec<String>>) -> Self {
        Self { values }
    }
}

impl From<HashMap<String, String>> for FormValues {
    fn from(values: HashMap<String, String>) -> Self {
        values.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_values_keep_order() {
        let values: FormValues = [("Tags", "b"), ("Tags", "a"), ("Name", "Foo")]
            .into_iter()
            .collect();
        assert_eq!(values.get_all("Tags"), ["b".to_string(), "a".to_string()]);
        assert_eq!(values.get("Tags"), Some("b"));
        assert_eq!(values.get("Name"), Some("Foo"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_missing_key() {
        let values = FormValues::new();
        assert!(values.is_empty());
        assert_eq!(values.get("x"), None);
        assert!(values.get_all("x").is_empty());
    }

    #[test]
    fn test_set_replaces() {
        let mut values = FormValues::new().with("Age", "1");
        values.set("Age", ["14"]);
        assert_eq!(values.get_all("Age"), ["14".to_string()]);
    }

    #[test]
    fn test_from_single_valued_map() {
        let mut map = HashMap::new();
        map.insert("Name".to_string(), "Foo".to_string());
        let values = FormValues::from(map);
        assert!(values.contains_key("Name"));
        assert_eq!(values.get("Name"), Some("Foo"));
    }
}
