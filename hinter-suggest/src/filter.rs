//! Class filters for lookups.

use std::collections::HashSet;

/// A set of class names to include in, or exclude from, a lookup.
///
/// An empty set means "no filtering". What that implies is up to the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet(HashSet<String>);

impl FilterSet {
    /// Test whether `class` is in the set.
    pub fn contains(&self, class: &str) -> bool {
        self.0.contains(class)
    }

    /// True if no class was given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of distinct classes in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the classes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FilterSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
