use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A set of opaque style tags attached to an event.
///
/// The lane index ignores these entirely; styling layers consume the
/// derived `style_key` — the sorted, dot-joined tag list — as a cache key.
/// The key is kept in step with the tag set on every mutation, so reading
/// it is free.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeSet<String>", into = "BTreeSet<String>")]
pub struct StyleClasses {
    tags: BTreeSet<String>,
    key: String,
}

impl StyleClasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Returns false if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let added = self.tags.insert(tag.into());
        if added {
            self.rebuild_key();
        }
        added
    }

    /// Remove a tag. Returns false if it was not present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let removed = self.tags.remove(tag);
        if removed {
            self.rebuild_key();
        }
        removed
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// The sorted, dot-joined tag list.
    pub fn style_key(&self) -> &str {
        &self.key
    }

    fn rebuild_key(&mut self) {
        self.key = self
            .tags
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".");
    }
}

impl From<BTreeSet<String>> for StyleClasses {
    fn from(tags: BTreeSet<String>) -> Self {
        let mut classes = Self { tags, key: String::new() };
        classes.rebuild_key();
        classes
    }
}

impl From<StyleClasses> for BTreeSet<String> {
    fn from(classes: StyleClasses) -> Self {
        classes.tags
    }
}

impl FromIterator<String> for StyleClasses {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<BTreeSet<_>>())
    }
}

impl<'a> FromIterator<&'a str> for StyleClasses {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(String::from).collect()
    }
}
