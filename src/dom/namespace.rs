//! Namespace table
//!
//! One flat prefix -> value table per parse run. Only `xmlns:prefix`
//! attributes feed it; later declarations of a prefix replace earlier ones.

use std::collections::HashMap;

/// Prefix -> namespace value bindings collected during a parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable<'a> {
    bindings: HashMap<&'a str, &'a str>,
}

impl<'a> NamespaceTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `value`
    pub fn declare(&mut self, prefix: &'a str, value: &'a str) {
        self.bindings.insert(prefix, value);
    }

    /// Resolve a prefix to its bound value
    pub fn resolve(&self, prefix: &str) -> Option<&'a str> {
        self.bindings.get(prefix).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All bindings, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.bindings.iter().map(|(&prefix, &value)| (prefix, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_resolve() {
        let mut table = NamespaceTable::new();
        table.declare("svg", "http://www.w3.org/2000/svg");
        assert_eq!(table.resolve("svg"), Some("http://www.w3.org/2000/svg"));
        assert_eq!(table.resolve("xlink"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_redeclare_replaces() {
        let mut table = NamespaceTable::new();
        table.declare("ns", "http://example.com/ns1");
        table.declare("ns", "http://example.com/ns2");
        assert_eq!(table.resolve("ns"), Some("http://example.com/ns2"));
        assert_eq!(table.iter().count(), 1);
    }
}
