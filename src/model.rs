//! The in-memory interval table and the canonical-chromosome gate.

use crate::chrom::{CanonicalLists, NamingConvention};
use crate::error::{Error, Result};
use log::debug;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Payload carried by an interval row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain interval (regions of homozygosity).
    Empty,
    /// Cytoband name and stain class.
    Stain { name: String, class: String },
    /// UPD site classification.
    Site(String),
    /// Coverage reading, already clamped.
    Coverage(f64),
}

/// One row of annotation; `end` is exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub value: Value,
}

impl Interval {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64, value: Value) -> Self {
        Interval {
            chrom: chrom.into(),
            start,
            end,
            value,
        }
    }

    /// A single coverage sample spanning one base.
    pub fn point(chrom: impl Into<String>, pos: u64, coverage: f64) -> Self {
        Self::new(chrom, pos, pos + 1, Value::Coverage(coverage))
    }

    pub fn width(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn coverage(&self) -> Option<f64> {
        match self.value {
            Value::Coverage(c) => Some(c),
            _ => None,
        }
    }
}

/// One line of the semicolon annotation format. Description keys are lower case.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub chrom: String,
    pub start: u64,
    pub stop: u64,
    pub desc: FxHashMap<String, String>,
}

/// Anything keyed by a chromosome.
pub trait Located {
    fn chrom(&self) -> &str;
}

impl Located for Interval {
    fn chrom(&self) -> &str {
        &self.chrom
    }
}

impl Located for RegionRecord {
    fn chrom(&self) -> &str {
        &self.chrom
    }
}

/// Keep records whose chromosome is in `canonical`, in their original order.
pub fn filter<T: Located + Clone>(records: &[T], canonical: &[String]) -> Vec<T> {
    records
        .iter()
        .filter(|r| canonical.iter().any(|c| c == r.chrom()))
        .cloned()
        .collect()
}

/// Filter under `primary`, then under the other convention if nothing survived.
/// Returns the kept records together with the convention that produced them.
pub fn filter_with_fallback<T: Located + Clone>(
    records: &[T],
    primary: NamingConvention,
    lists: &CanonicalLists,
    source: &Path,
) -> Result<(Vec<T>, NamingConvention)> {
    for convention in [primary, primary.other()] {
        let kept = filter(records, lists.list(convention));
        debug!(
            "{} of {} records kept as {}",
            kept.len(),
            records.len(),
            convention
        );
        if !kept.is_empty() {
            return Ok((kept, convention));
        }
    }
    Err(Error::EmptyResult {
        path: source.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cov(chrom: &str, pos: u64) -> Interval {
        Interval::point(chrom, pos, 1.0)
    }

    #[test]
    fn test_filter_keeps_order_and_duplicates() {
        let records = vec![cov("chr1", 1), cov("chrERR", 2), cov("chr2", 3), cov("chr1", 1)];
        let canonical = vec!["chr1".to_string(), "chr2".to_string()];
        let kept = filter(&records, &canonical);
        assert_eq!(kept, vec![cov("chr1", 1), cov("chr2", 3), cov("chr1", 1)]);
    }

    #[test]
    fn test_filtered_keys_are_canonical() {
        let lists = CanonicalLists::default();
        let records = vec![
            cov("chr1", 1),
            cov("chrUn_gl000220", 1),
            cov("chr17_ctg5_hap1", 1),
            cov("chrY", 1),
        ];
        let (kept, convention) =
            filter_with_fallback(&records, NamingConvention::Prefixed, &lists, &PathBuf::from("x"))
                .unwrap();
        assert_eq!(convention, NamingConvention::Prefixed);
        assert_eq!(kept.len(), 2);
        assert!(kept
            .iter()
            .all(|r| lists.list(convention).contains(&r.chrom)));
    }

    #[test]
    fn test_fallback_to_other_convention() {
        let lists = CanonicalLists::default();
        let records = vec![cov("X", 1), cov("Y", 2)];
        let (kept, convention) =
            filter_with_fallback(&records, NamingConvention::Prefixed, &lists, &PathBuf::from("x"))
                .unwrap();
        assert_eq!(convention, NamingConvention::NumericBare);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_empty_after_both_conventions() {
        let lists = CanonicalLists::default();
        let records = vec![cov("scaffold_1", 1)];
        let err = filter_with_fallback(&records, NamingConvention::NumericBare, &lists, &PathBuf::from("x"))
            .unwrap_err();
        assert!(matches!(err, Error::EmptyResult { .. }));
    }

    #[test]
    fn test_width() {
        assert_eq!(cov("1", 10).width(), 1);
        assert_eq!(Interval::new("1", 5, 3, Value::Empty).width(), 0);
    }
}
