//! Ordered attribute list with case-insensitive names.

/// Attribute list of an element, declaration or stylesheet reference.
///
/// Pairs keep their insertion order for serialization. Lookup ignores ASCII
/// case, and each case-folded name is bound at most once: [`Attributes::set`]
/// overwrites an existing binding in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Value bound to `name`, compared case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Bind `name` to `value`, replacing an existing binding of the same
    /// case-folded name. The original spelling of the first binding is kept.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self
            .pairs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            slot.1 = value;
        } else {
            self.pairs.push((name, value));
        }
    }

    /// Remove the binding for `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .pairs
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.pairs.remove(index).1)
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.set(name, value);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut attrs = Attributes::new();
        attrs.set("HREF", "a.html");
        assert_eq!(attrs.get("href"), Some("a.html"));
        assert!(attrs.contains("Href"));
    }

    #[test]
    fn test_set_overwrites_case_folded_binding() {
        let mut attrs = Attributes::new();
        attrs.set("Class", "one");
        attrs.set("class", "two");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.entries().next(), Some(("Class", "two")));
    }

    #[test]
    fn test_remove() {
        let mut attrs: Attributes = [("id", "x"), ("title", "t")].into_iter().collect();
        assert_eq!(attrs.remove("ID").as_deref(), Some("x"));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.remove("id"), None);
    }
}
