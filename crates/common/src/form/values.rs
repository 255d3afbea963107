use std::collections::BTreeMap;
use std::fmt;

/// Ordered list of form key/value pairs.
///
/// Unlike a map, `Values` keeps insertion order and allows repeated keys, so
/// the encoded output is stable and mirrors the order fields were appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values {
    pairs: Vec<(String, String)>,
}

impl Values {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Appends a pair.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Replaces the value of the first pair with `key`, or appends one.
    ///
    /// O(n) in the number of pairs.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// All values stored under `key`, in insertion order.
    #[must_use]
    pub fn get(&self, key: &str) -> Vec<&str> {
        self.pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str()).collect()
    }

    /// Returns `true` when nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterates pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Moves every pair of `other` to the end of this list.
    pub fn append(&mut self, other: Self) {
        self.pairs.extend(other.pairs);
    }

    /// Consumes the list, returning the raw pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Groups values by key for order-insensitive comparisons.
    ///
    /// Repeated keys keep their relative order inside each group.
    #[must_use]
    pub fn to_grouped(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in &self.pairs {
            grouped.entry(key.clone()).or_default().push(value.clone());
        }
        grouped
    }

    /// `application/x-www-form-urlencoded` rendering.
    ///
    /// Square brackets in keys are left literal so nested keys stay readable
    /// (`card[number]=...`).
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.pairs {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(&escape(key).replace("%5B", "[").replace("%5D", "]"));
            out.push('=');
            out.push_str(&escape(value));
        }
        out
    }
}

fn escape(input: &str) -> String {
    url::form_urlencoded::byte_serialize(input.as_bytes()).collect()
}

impl fmt::Display for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        values.extend(iter);
        values
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Values {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}
