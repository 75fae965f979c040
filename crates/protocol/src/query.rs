//! Ordered raw query-pair model.
//!
//! Pairs are kept as the raw percent-encoded text found in the URL. The
//! rewrite contract requires untouched keys to survive byte-for-byte and in
//! their original position, which rules out a decode/re-encode round trip.

/// An ordered set of query pairs with unique keys.
///
/// A pair's value is `None` when the key appeared without `=` (a bare key),
/// so serialization reproduces the original query exactly. Setting a key
/// overwrites its value in place; setting an absent key appends it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryPairs {
    /// Creates an empty pair set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string (without the leading `?`).
    pub fn parse(raw: &str) -> Self {
        let mut pairs: Vec<(String, Option<String>)> = Vec::new();
        for piece in raw.split('&') {
            if piece.is_empty() {
                continue;
            }
            let (key, value) = match piece.split_once('=') {
                Some((key, value)) => (key.to_string(), Some(value.to_string())),
                None => (piece.to_string(), None),
            };
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                // Keys are unique within a URL; last occurrence wins.
                Some(existing) => existing.1 = value,
                None => pairs.push((key, value)),
            }
        }
        Self { pairs }
    }

    /// Returns the value for `key`. Bare keys read as the empty string.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Sets `key` to `value`, in place when present, appended otherwise.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// True when no pairs are present.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates pairs in order; bare keys read as the empty string.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref().unwrap_or("")))
    }

    /// Serializes back to a raw query string (without the leading `?`).
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.pairs {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(key);
            if let Some(value) = value {
                out.push('=');
                out.push_str(value);
            }
        }
        out
    }
}
