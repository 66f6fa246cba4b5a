//! Name normalisation and comma separated key lists.

use serde::{Deserialize, Serialize};

/// Lowercase a name and strip all whitespace, so "Half Buried" and
/// "halfburied" compare equal.
pub fn make_compare_ready(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Turn a key such as `body` or `meleeCombat` into a label ("Body",
/// "Melee Combat").
pub fn display_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                out.push(' ');
            }
            out.push(c);
        }
    }
    out
}

/// Split a comma separated list into compare-ready keys, dropping empties.
pub fn split_stat_string(text: &str) -> Vec<String> {
    text.split(',')
        .map(make_compare_ready)
        .filter(|s| !s.is_empty())
        .collect()
}

/// A list of compare-ready keys.
///
/// Deserializes from either a comma separated string (`"body, speed"`) or an
/// array of strings. An empty list is a wildcard wherever it is used as a
/// filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawKeyList", into = "Vec<String>")]
pub struct KeyList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeyList {
    Text(String),
    List(Vec<String>),
}

impl From<RawKeyList> for KeyList {
    fn from(raw: RawKeyList) -> Self {
        match raw {
            RawKeyList::Text(text) => Self(split_stat_string(&text)),
            RawKeyList::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl From<KeyList> for Vec<String> {
    fn from(list: KeyList) -> Self {
        list.0
    }
}

impl<'a> FromIterator<&'a str> for KeyList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(make_compare_ready)
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

impl KeyList {
    /// Parse a comma separated list.
    pub fn parse(text: &str) -> Self {
        Self(split_stat_string(text))
    }

    /// Returns true if the list holds no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the keys.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The keys as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns true if `key` (normalised) is in the list.
    pub fn contains(&self, key: &str) -> bool {
        let key = make_compare_ready(key);
        self.0.iter().any(|k| *k == key)
    }

    /// Returns true if any key in this list appears in `subject`.
    pub fn intersects<S: AsRef<str>>(&self, subject: &[S]) -> bool {
        self.0
            .iter()
            .any(|k| subject.iter().any(|s| make_compare_ready(s.as_ref()) == *k))
    }
}

impl std::fmt::Display for KeyList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_ready_strips_and_lowercases() {
        assert_eq!(make_compare_ready("Half Buried"), "halfburied");
        assert_eq!(make_compare_ready(" Over-Burdened "), "over-burdened");
    }

    #[test]
    fn keys_become_labels() {
        assert_eq!(display_key("body"), "Body");
        assert_eq!(display_key("meleeCombat"), "Melee Combat");
        assert_eq!(display_key(""), "");
    }

    #[test]
    fn split_drops_empty_terms() {
        assert_eq!(split_stat_string("Body, Speed,,  "), vec!["body", "speed"]);
        assert!(split_stat_string("").is_empty());
    }

    #[test]
    fn key_list_from_string_or_array() {
        let a: KeyList = serde_json::from_str("\"Melee Combat, dodge\"").unwrap();
        let b: KeyList = serde_json::from_str("[\"meleecombat\", \"Dodge\"]").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn key_list_matching() {
        let list = KeyList::parse("sword, axe");
        assert!(list.contains("Sword"));
        assert!(!list.contains("spear"));
        assert!(list.intersects(&["Great Axe", "axe"]));
        assert!(!list.intersects::<&str>(&[]));
    }
}
