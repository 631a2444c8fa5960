//! Line parsers for the three input formats: tab-separated interval tables,
//! fixed-step coverage tracks and semicolon-annotated UPD regions.

use crate::chrom::{resolve, NamingConvention};
use crate::error::{Error, Result};
use crate::layout::CHROM_END_POS;
use crate::model::{Interval, RegionRecord, Value};
use log::debug;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Coverage readings above this are drawn at this height.
pub const WIG_MAX: f64 = 70.0;

/// Lines inspected when looking for the fixedStep header.
pub const DECLARATION_LOOKAHEAD: usize = 12;

pub const DEFAULT_SEPARATOR: &str = " ";

/// Column layout of a tab-separated interval table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// chrom, start, end
    Roh,
    /// chrom, start, end, name, gStain
    Ideogram,
    /// chrom, start, end, updType
    UpdSites,
}

impl TableFormat {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            TableFormat::Roh => &["chrom", "start", "end"],
            TableFormat::Ideogram => &["chrom", "start", "end", "name", "gStain"],
            TableFormat::UpdSites => &["chrom", "start", "end", "updType"],
        }
    }
}

/// Read a whole input file.
pub fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn line_context(source: &Path, line_no: usize) -> String {
    format!("{}:{}", source.display(), line_no)
}

fn parse_position(token: &str, source: &Path, line_no: usize) -> Result<u64> {
    token.trim().parse::<u64>().map_err(|_| {
        Error::format(
            line_context(source, line_no),
            format!("expected a non-negative position, got {:?}", token),
        )
    })
}

/// Parse a tab-separated table. The first line is a header and is always
/// skipped; blank lines are ignored.
pub fn parse_table(text: &str, format: TableFormat, source: &Path) -> Result<Vec<Interval>> {
    let columns = format.columns();
    let mut records = Vec::new();

    for (idx, line) in text.lines().enumerate().skip(1) {
        let line_no = idx + 1;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < columns.len() {
            return Err(Error::format(
                line_context(source, line_no),
                format!(
                    "expected {} columns ({}), found {}",
                    columns.len(),
                    columns.join(", "),
                    parts.len()
                ),
            ));
        }

        let start = parse_position(parts[1], source, line_no)?;
        let end = parse_position(parts[2], source, line_no)?;
        let value = match format {
            TableFormat::Roh => Value::Empty,
            TableFormat::Ideogram => Value::Stain {
                name: parts[3].trim().to_string(),
                class: parts[4].trim().to_string(),
            },
            TableFormat::UpdSites => Value::Site(parts[3].trim().to_string()),
        };
        records.push(Interval::new(parts[0].trim(), start, end, value));
    }

    debug!("Parsed {} records from {:?}", records.len(), source);
    Ok(records)
}

/// Split `key=value` tokens into a map with lower-cased keys. Empty tokens
/// (trailing separators) are skipped.
pub fn make_dict<'a, I>(tokens: I) -> std::result::Result<FxHashMap<String, String>, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut dict = FxHashMap::default();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.split_once('=') {
            Some((key, value)) => {
                dict.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
            None => return Err(format!("token {:?} is not on the form key=value", token)),
        }
    }
    Ok(dict)
}

/// Metadata of a `fixedStep chrom=<id> start=<pos> step=<n>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WigDeclaration {
    pub chrom: String,
    pub convention: NamingConvention,
    pub start: u64,
    pub step: u64,
}

/// Parse one declaration line. `Ok(None)` when the line is not a fixedStep line.
pub fn parse_declaration_line(line: &str, separator: &str) -> std::result::Result<Option<WigDeclaration>, String> {
    let mut tokens = line.trim().split(separator).filter(|t| !t.is_empty());
    match tokens.next() {
        Some(head) if head.eq_ignore_ascii_case("fixedstep") => {}
        _ => return Ok(None),
    }

    let fields = make_dict(tokens)?;
    let get = |key: &str| {
        fields
            .get(key)
            .ok_or_else(|| format!("declaration lacks {}=", key))
    };
    let chrom = get("chrom")?.clone();
    let start = get("start")?
        .parse::<u64>()
        .map_err(|_| "declaration start is not a non-negative integer".to_string())?;
    let step = get("step")?
        .parse::<u64>()
        .map_err(|_| "declaration step is not a non-negative integer".to_string())?;
    if step == 0 {
        return Err("declaration step must be positive".to_string());
    }

    Ok(Some(WigDeclaration {
        convention: resolve(&chrom),
        chrom,
        start,
        step,
    }))
}

/// Find the header declaration among the first [`DECLARATION_LOOKAHEAD`] lines.
/// Mitochondrial declarations are passed over.
pub fn parse_wig_declaration(text: &str, separator: &str, source: &Path) -> Result<WigDeclaration> {
    for (idx, line) in text.lines().take(DECLARATION_LOOKAHEAD).enumerate() {
        let declaration = parse_declaration_line(line, separator)
            .map_err(|msg| Error::format(line_context(source, idx + 1), msg))?;
        if let Some(decl) = declaration {
            if decl.chrom == "chrM" || decl.chrom == "M" {
                continue;
            }
            return Ok(decl);
        }
    }
    Err(Error::DeclarationNotFound {
        path: source.to_path_buf(),
        lookahead: DECLARATION_LOOKAHEAD,
    })
}

/// Zero samples framing a finished chromosome track: head, tail and the
/// shared genome-length end point.
fn close_track(records: &mut Vec<Interval>, chrom: &str, pos: u64) {
    records.push(Interval::point(chrom, 1, 0.0));
    records.push(Interval::point(chrom, pos + 1, 0.0));
    records.push(Interval::point(chrom, CHROM_END_POS, 0.0));
}

/// Parse a fixed-step coverage track. Every numeric line becomes one sample
/// at the running offset, which advances by `step`.
pub fn parse_coverage(text: &str, step: u64, separator: &str, source: &Path) -> Result<Vec<Interval>> {
    let mut records = Vec::new();
    let mut chrom: Option<String> = None;
    let mut pos = 0u64;
    let mut orphans = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        let reading = if trimmed == "NaN" {
            Some(0.0)
        } else {
            trimmed.parse::<f64>().ok().map(|v| if v.is_nan() { 0.0 } else { v })
        };

        match reading {
            Some(value) => {
                match chrom {
                    Some(ref c) => records.push(Interval::point(c.as_str(), pos, value.min(WIG_MAX))),
                    None => orphans += 1,
                }
                pos += step;
            }
            None => {
                let declaration = parse_declaration_line(trimmed, separator)
                    .map_err(|msg| Error::format(line_context(source, idx + 1), msg))?;
                if let Some(next) = declaration {
                    if let Some(ref previous) = chrom {
                        close_track(&mut records, previous, pos);
                    }
                    chrom = Some(next.chrom);
                    pos = 0;
                }
            }
        }
    }
    if let Some(ref last) = chrom {
        close_track(&mut records, last, pos);
    }

    if orphans > 0 {
        debug!("Skipped {} readings preceding the first declaration", orphans);
    }
    debug!("Parsed {} coverage samples from {:?}", records.len(), source);
    Ok(records)
}

/// Parse UPD regions: `<chrom> <start> <stop> <key=val;key=val;...>`.
pub fn parse_regions(text: &str, source: &Path) -> Result<Vec<RegionRecord>> {
    let mut records = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(Error::format(
                line_context(source, line_no),
                format!("expected <chrom> <start> <stop> <desc>, found {} fields", tokens.len()),
            ));
        }
        let start = parse_position(tokens[1], source, line_no)?;
        let stop = parse_position(tokens[2], source, line_no)?;
        let desc = tokens[3..].join(" ");
        let desc = make_dict(desc.split(';'))
            .map_err(|msg| Error::format(line_context(source, line_no), msg))?;

        records.push(RegionRecord {
            chrom: tokens[0].to_string(),
            start,
            stop,
            desc,
        });
    }

    debug!("Parsed {} regions from {:?}", records.len(), source);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const WIG_HEAD: &str = "123\n312312\n12321\n\nfixedStep chrom=1 start=1 step=10000\n";

    fn src() -> PathBuf {
        PathBuf::from("test.file")
    }

    #[test]
    fn test_make_dict() {
        let dict = make_dict(["a=1", "B=2", "c=3", ""]).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict["a"], "1");
        assert_eq!(dict["b"], "2");
        assert!(make_dict(["a=1", "broken"]).is_err());
    }

    #[test]
    fn test_parse_declaration_line() {
        let decl = parse_declaration_line("fixedStep chrom=1 start=1 step=10000", " ")
            .unwrap()
            .unwrap();
        assert_eq!(decl.convention, NamingConvention::NumericBare);
        assert_eq!(decl.start, 1);
        assert_eq!(decl.step, 10000);
        assert!(parse_declaration_line("12.5", " ").unwrap().is_none());
        assert!(parse_declaration_line("fixedStep chrom=1 start=1 step=0", " ").is_err());
    }

    #[test]
    fn test_parse_wig_declaration() {
        let decl = parse_wig_declaration(WIG_HEAD, " ", &src()).unwrap();
        assert_eq!(
            decl,
            WigDeclaration {
                chrom: "1".to_string(),
                convention: NamingConvention::NumericBare,
                start: 1,
                step: 10000,
            }
        );
    }

    #[test]
    fn test_parse_wig_declaration_skips_mitochondrial() {
        let text = "fixedStep chrom=chrM start=1 step=5\nfixedStep chrom=chr2 start=1 step=5\n";
        let decl = parse_wig_declaration(text, " ", &src()).unwrap();
        assert_eq!(decl.chrom, "chr2");
        assert_eq!(decl.convention, NamingConvention::Prefixed);
    }

    #[test]
    fn test_declaration_not_found() {
        let mut text = "1.0\n".repeat(DECLARATION_LOOKAHEAD);
        text.push_str("fixedStep chrom=1 start=1 step=10\n");
        let err = parse_wig_declaration(&text, " ", &src()).unwrap_err();
        assert!(matches!(err, Error::DeclarationNotFound { lookahead: 12, .. }));
    }

    #[test]
    fn test_parse_coverage() {
        let text = "fixedStep chrom=chr1 start=1 step=100\n1.5\nNaN\n9999.0\nfixedStep chrom=chr2 start=1 step=100\n3\n";
        let records = parse_coverage(text, 100, " ", &src()).unwrap();
        let summary: Vec<(&str, u64, f64)> = records
            .iter()
            .map(|r| (r.chrom.as_str(), r.start, r.coverage().unwrap()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("chr1", 0, 1.5),
                ("chr1", 100, 0.0),
                ("chr1", 200, WIG_MAX),
                ("chr1", 1, 0.0),
                ("chr1", 301, 0.0),
                ("chr1", CHROM_END_POS, 0.0),
                ("chr2", 0, 3.0),
                ("chr2", 1, 0.0),
                ("chr2", 101, 0.0),
                ("chr2", CHROM_END_POS, 0.0),
            ]
        );
        assert!(records.iter().all(|r| r.width() == 1));
    }

    #[test]
    fn test_coverage_clamp() {
        let text = "fixedStep chrom=5 start=1 step=10\n0.5\n0.5\n9999.0\n";
        let records = parse_coverage(text, 10, " ", &src()).unwrap();
        assert_eq!(records[2].coverage(), Some(70.0));
        assert_eq!(records[2].start, 20);
    }

    #[test]
    fn test_coverage_switches_only_on_fixed_step() {
        let text = "fixedStep chrom=chr1 start=1 step=10\n1\nvariableStep chrom=chr3 span=5\ntrack name=x chrom=chr4\n2\n";
        let records = parse_coverage(text, 10, " ", &src()).unwrap();
        assert!(records.iter().all(|r| r.chrom == "chr1"));
        assert_eq!(records[1].start, 10);
        assert_eq!(records[1].coverage(), Some(2.0));
    }

    #[test]
    fn test_coverage_rejects_bad_track_declaration() {
        let text = "fixedStep chrom=chr1 start=1 step=10\n1\nfixedStep chrom=chr2 start=1 step=0\n2\n";
        match parse_coverage(text, 10, " ", &src()).unwrap_err() {
            Error::Format { context, .. } => assert_eq!(context, "test.file:3"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_table() {
        let text = "#chrom\tstart\tend\tname\tgStain\nchr1\t0\t2300000\tp36.33\tgneg\nchr1\t2300000\t5400000\tp36.32\tgpos25\n";
        let records = parse_table(text, TableFormat::Ideogram, &src()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].start, 2300000);
        assert_eq!(
            records[1].value,
            Value::Stain {
                name: "p36.32".to_string(),
                class: "gpos25".to_string()
            }
        );
    }

    #[test]
    fn test_parse_table_short_line() {
        let text = "header\n1\t100\t200\tUPD_MATERNAL_ORIGIN\n2\t100\n";
        let err = parse_table(text, TableFormat::UpdSites, &src()).unwrap_err();
        match err {
            Error::Format { context, .. } => assert_eq!(context, "test.file:3"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_table_header_always_skipped() {
        let text = "1\t5\t10\n2\t5\t10\n";
        let records = parse_table(text, TableFormat::Roh, &src()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chrom, "2");
    }

    #[test]
    fn test_parse_regions() {
        let text = "16\t100\t2000\tORIGIN=PATERNAL;TYPE=ISODISOMY;LOW_SIZE=1\n\n17 1 50 origin=MATERNAL;type=HETERODISOMY;\n";
        let records = parse_regions(text, &src()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].desc["origin"], "PATERNAL");
        assert_eq!(records[0].desc["low_size"], "1");
        assert_eq!(records[1].stop, 50);
        assert_eq!(records[1].desc["type"], "HETERODISOMY");
    }

    #[test]
    fn test_parse_regions_errors() {
        assert!(parse_regions("16 100 2000\n", &src()).is_err());
        assert!(parse_regions("16 100 2000 ORIGIN\n", &src()).is_err());
    }
}
