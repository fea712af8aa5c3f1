// identity.rs - Identity registry and canonical pair keys

use std::collections::HashMap;

/// Index of an identity inside its registry (first-seen order)
pub type IdentityId = usize;

/// Strip a MAF source name down to its identity: everything before the first '.'
///
/// `hg19.chr1` becomes `hg19`; a name without a dot is used whole.
pub fn strip_name(name: &str) -> &str {
    match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Deduplicates identities for one input stream.
///
/// Ids are handed out in first-seen order and are stable for the lifetime of
/// the registry, so they double as row/column indices of the emitted matrix.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    names: Vec<String>,
    index: HashMap<String, IdentityId>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw source name, returning the id of its stripped identity
    pub fn register(&mut self, raw_name: &str) -> IdentityId {
        let identity = strip_name(raw_name);
        if let Some(&id) = self.index.get(identity) {
            return id;
        }
        let id = self.names.len();
        self.names.push(identity.to_string());
        self.index.insert(identity.to_string(), id);
        id
    }

    /// Look up an already registered identity (not a raw name)
    pub fn get(&self, identity: &str) -> Option<IdentityId> {
        self.index.get(identity).copied()
    }

    pub fn name(&self, id: IdentityId) -> Option<&str> {
        self.names.get(id).map(|s| s.as_str())
    }

    /// Identities in first-seen order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn ids(&self) -> std::ops::Range<IdentityId> {
        0..self.names.len()
    }
}

/// Unordered pair of two distinct identities.
///
/// The smaller id is always stored first, so `(a, b)` and `(b, a)` produce the
/// same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    lo: IdentityId,
    hi: IdentityId,
}

impl PairKey {
    /// Returns `None` when both sides are the same identity
    pub fn new(a: IdentityId, b: IdentityId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { lo: a, hi: b }),
            std::cmp::Ordering::Greater => Some(Self { lo: b, hi: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> IdentityId {
        self.lo
    }

    pub fn second(&self) -> IdentityId {
        self.hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_name() {
        assert_eq!(strip_name("hg19.chr1"), "hg19");
        assert_eq!(strip_name("mm10.chrX.part2"), "mm10");
        assert_eq!(strip_name("panTro4"), "panTro4");
        assert_eq!(strip_name(".leading"), "");
    }

    #[test]
    fn test_registry_deduplicates_stripped_names() {
        let mut registry = IdentityRegistry::new();
        let a = registry.register("hg19.chr1");
        let b = registry.register("mm10.chr2");
        let c = registry.register("hg19.chr7");

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(a, c);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), &["hg19".to_string(), "mm10".to_string()]);
        assert_eq!(registry.get("mm10"), Some(1));
        assert_eq!(registry.get("mm10.chr2"), None);
        assert_eq!(registry.name(1), Some("mm10"));
        assert_eq!(registry.name(5), None);
    }

    #[test]
    fn test_pair_key_is_canonical() {
        let k1 = PairKey::new(3, 1).unwrap();
        let k2 = PairKey::new(1, 3).unwrap();
        assert_eq!(k1, k2);
        assert_eq!(k1.first(), 1);
        assert_eq!(k1.second(), 3);
        assert!(PairKey::new(2, 2).is_none());
    }
}
