//! Chromosome naming conventions and the canonical, ordered chromosome lists.

use std::fmt;

/// Chromosomes drawn by default, in lane order.
pub const CHROMOSOMES: [&str; 25] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "M", "X", "Y",
];

pub const CHR_PREFIX: &str = "chr";

/// How a dataset spells its chromosome keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingConvention {
    /// `1`, `2`, ... `X`
    NumericBare,
    /// `chr1`, `chr2`, ... `chrX`
    Prefixed,
}

impl NamingConvention {
    pub fn other(self) -> Self {
        match self {
            NamingConvention::NumericBare => NamingConvention::Prefixed,
            NamingConvention::Prefixed => NamingConvention::NumericBare,
        }
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingConvention::NumericBare => write!(f, "numeric-bare"),
            NamingConvention::Prefixed => write!(f, "prefixed"),
        }
    }
}

/// Classify a sample chromosome value. Anything that is not an integer
/// counts as prefixed, so a bare `X` is ambiguous and callers fall back to
/// the other convention when filtering comes up empty.
pub fn resolve(sample: &str) -> NamingConvention {
    match sample.trim().parse::<i64>() {
        Ok(_) => NamingConvention::NumericBare,
        Err(_) => NamingConvention::Prefixed,
    }
}

/// The pair of parallel canonical lists. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLists {
    bare: Vec<String>,
    prefixed: Vec<String>,
}

impl Default for CanonicalLists {
    fn default() -> Self {
        Self::from_bare(CHROMOSOMES.iter().map(|c| c.to_string()).collect())
    }
}

impl CanonicalLists {
    /// Build both forms from the bare keys.
    pub fn from_bare(bare: Vec<String>) -> Self {
        let prefixed = bare.iter().map(|c| format!("{}{}", CHR_PREFIX, c)).collect();
        CanonicalLists { bare, prefixed }
    }

    /// Caller guarantees both lists are parallel.
    pub(crate) fn from_parts(bare: Vec<String>, prefixed: Vec<String>) -> Self {
        CanonicalLists { bare, prefixed }
    }

    pub fn list(&self, convention: NamingConvention) -> &[String] {
        match convention {
            NamingConvention::NumericBare => &self.bare,
            NamingConvention::Prefixed => &self.prefixed,
        }
    }

    pub fn len(&self) -> usize {
        self.bare.len()
    }

    /// Label of the `i`-th canonical chromosome in `convention`.
    pub fn label(&self, i: usize, convention: NamingConvention) -> Option<&str> {
        self.list(convention).get(i).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(resolve("7"), NamingConvention::NumericBare);
        assert_eq!(resolve("chr7"), NamingConvention::Prefixed);
        assert_eq!(resolve("X"), NamingConvention::Prefixed);
        assert_eq!(resolve(""), NamingConvention::Prefixed);
    }

    #[test]
    fn test_default_lists() {
        let lists = CanonicalLists::default();
        let prefixed = lists.list(NamingConvention::Prefixed);
        assert_eq!(prefixed.len(), 25);
        for key in ["chrX", "chrY", "chrM", "chr1", "chr22"] {
            assert!(prefixed.iter().any(|c| c == key), "{} missing", key);
        }
        assert_eq!(lists.list(NamingConvention::NumericBare)[22], "M");
        assert_eq!(lists.label(0, NamingConvention::Prefixed), Some("chr1"));
    }
}
