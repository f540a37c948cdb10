//! Saved vendors.
//!
//! An insertion-ordered set of vendor ids. Toggling twice restores the
//! original set; a vendor appears at most once.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::VendorId;

/// The vendors a user has saved, in the order they were saved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Favorites(Vec<VendorId>);

impl Favorites {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add the vendor if absent, remove it if present.
    ///
    /// Returns `true` when the vendor is saved afterwards.
    pub fn toggle(&mut self, id: &VendorId) -> bool {
        if let Some(pos) = self.0.iter().position(|v| v == id) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(id.clone());
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: &VendorId) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VendorId> {
        self.0.iter()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<VendorId> for Favorites {
    fn from_iter<I: IntoIterator<Item = VendorId>>(iter: I) -> Self {
        let mut favorites = Self::new();
        for id in iter {
            if !favorites.contains(&id) {
                favorites.0.push(id);
            }
        }
        favorites
    }
}

// The vendor service may hand back duplicates; collapse them on the way in.
impl<'de> Deserialize<'de> for Favorites {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids = Vec::<VendorId>::deserialize(deserializer)?;
        Ok(ids.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut favorites = Favorites::new();
        let id = VendorId::new("v1");
        assert!(favorites.toggle(&id));
        assert!(favorites.contains(&id));
        assert!(!favorites.toggle(&id));
        assert!(!favorites.contains(&id));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_double_toggle_restores_original() {
        let mut favorites: Favorites = ["a", "b", "c"].into_iter().map(VendorId::from).collect();
        let original = favorites.clone();
        for id in ["b", "z"] {
            let id = VendorId::from(id);
            favorites.toggle(&id);
            favorites.toggle(&id);
            assert_eq!(
                favorites.iter().collect::<std::collections::BTreeSet<_>>(),
                original.iter().collect::<std::collections::BTreeSet<_>>()
            );
        }
    }

    #[test]
    fn test_no_duplicates() {
        let favorites: Favorites = serde_json::from_str(r#"["a","b","a"]"#).unwrap();
        assert_eq!(favorites.len(), 2);
        assert_eq!(serde_json::to_string(&favorites).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut favorites = Favorites::new();
        for id in ["c", "a", "b"] {
            favorites.toggle(&VendorId::from(id));
        }
        let order: Vec<&str> = favorites.iter().map(VendorId::as_str).collect();
        assert_eq!(order, ["c", "a", "b"]);
        favorites.clear();
        assert!(favorites.is_empty());
    }
}
