use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sentinel tag carried by every entry; filtering on it shows the whole pad
pub const ALL_TAG: &str = "all";

/// Parse comma-separated tags, filtering empty ones
pub fn parse_tags(tags_str: &str) -> Vec<String> {
    tags_str
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn is_sentinel(tag: &str) -> bool {
    tag.eq_ignore_ascii_case(ALL_TAG)
}

/// Unordered set of unique tags that always contains [`ALL_TAG`]
///
/// The sentinel is inserted by every constructor, including deserialization,
/// and no mutating operation can take it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        let mut set = BTreeSet::new();
        set.insert(ALL_TAG.to_string());
        Self(set)
    }

    /// Insert a tag; returns false if it was empty or already present
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || is_sentinel(tag) {
            return false;
        }
        self.0.insert(tag.to_string())
    }

    /// Remove a user tag; removing the sentinel is a no-op
    pub fn remove(&mut self, tag: &str) -> bool {
        if is_sentinel(tag) {
            return false;
        }
        self.0.remove(tag)
    }

    /// Drop every user tag, leaving exactly the sentinel
    pub fn clear(&mut self) {
        self.0.retain(|t| t == ALL_TAG);
    }

    pub fn contains(&self, tag: &str) -> bool {
        if is_sentinel(tag) {
            return true;
        }
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Tags other than the sentinel
    pub fn user_tags(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|t| *t != ALL_TAG)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", vec![])]
    #[case(",,", vec![])]
    #[case("rust", vec!["rust"])]
    #[case(",rust,testing,", vec!["rust", "testing"])]
    #[case("  rust  ,  testing  ", vec!["rust", "testing"])]
    #[case("rust,,testing", vec!["rust", "testing"])]
    fn test_parse_tags(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_tags(input), expected);
    }

    #[test]
    fn test_new_contains_only_sentinel() {
        let tags = TagSet::new();
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec![ALL_TAG]);
        assert!(!tags.is_empty());
    }

    #[rstest]
    #[case("all")]
    #[case("ALL")]
    #[case("All")]
    fn test_remove_sentinel_is_noop(#[case] tag: &str) {
        let mut tags: TagSet = ["news"].into_iter().collect();
        assert!(!tags.remove(tag));
        assert!(tags.contains(ALL_TAG));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_clear_leaves_sentinel() {
        let mut tags: TagSet = ["news", "rust", "video"].into_iter().collect();
        tags.clear();
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec![ALL_TAG]);
        tags.clear();
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_insert_dedups_and_trims() {
        let mut tags = TagSet::new();
        assert!(tags.insert(" rust "));
        assert!(!tags.insert("rust"));
        assert!(!tags.insert("   "));
        assert!(!tags.insert("All"));
        assert_eq!(tags.user_tags().collect::<Vec<_>>(), vec!["rust"]);
    }

    #[test]
    fn test_deserialize_restores_sentinel() {
        let tags: TagSet = serde_json::from_str(r#"["rust","news"]"#).unwrap();
        assert!(tags.contains(ALL_TAG));
        assert_eq!(tags.len(), 3);

        let empty: TagSet = serde_json::from_str("[]").unwrap();
        assert_eq!(empty, TagSet::new());
    }

    #[test]
    fn test_serialize_is_plain_array() {
        let tags: TagSet = ["rust"].into_iter().collect();
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"["all","rust"]"#);
    }
}
