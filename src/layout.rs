//! Draw geometry: stacked lanes, clamped x-ranges, bar collections and
//! disomy runs.

use crate::color::{tint, DisomyType, Origin, Rgb};
use crate::error::{Error, Result};
use crate::model::{Interval, RegionRecord};
use log::debug;
use rustc_hash::FxHashMap;

/// Added to the end of UPD calls so point-like calls stay visible.
pub const PADDING: u64 = 200_000;
/// Shared x extent of every image; chromosome 1 is 248,956,422 bp.
pub const CHROM_END_POS: u64 = 249_255_000;
pub const HEIGHT: f64 = 1.0;
pub const YBASE: f64 = 0.0;
pub const SPACE: f64 = 1.0;
/// Upper and lower disomy bands, leaving a thin gap at the lane middle.
pub const UPPER_BAND: (f64, f64) = (0.52, 0.48);
pub const LOWER_BAND: (f64, f64) = (0.0, 0.48);
/// Coverage y-axis upper bound.
pub const COVERAGE_Y_MAX: f64 = 75.0;

/// Horizontal lane of one chromosome in a combined plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub chrom: String,
    pub ybase: f64,
    pub center: f64,
}

/// Lanes for every chromosome of a canonical list, bottom to top.
#[derive(Debug, Clone, Default)]
pub struct LaneLayout {
    lanes: Vec<Lane>,
    index: FxHashMap<String, usize>,
}

impl LaneLayout {
    pub fn new(chromosomes: &[String]) -> Self {
        let mut layout = LaneLayout::default();
        let mut ybase = YBASE;
        for chrom in chromosomes {
            layout.index.insert(chrom.clone(), layout.lanes.len());
            layout.lanes.push(Lane {
                chrom: chrom.clone(),
                ybase,
                center: ybase + HEIGHT / 2.0,
            });
            ybase += HEIGHT + SPACE;
        }
        layout
    }

    pub fn get(&self, chrom: &str) -> Option<&Lane> {
        self.index.get(chrom).map(|&i| &self.lanes[i])
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Lowest and highest y covered by any lane.
    pub fn y_bounds(&self) -> (f64, f64) {
        match self.lanes.last() {
            Some(last) => (YBASE, last.ybase + HEIGHT),
            None => (YBASE, YBASE + HEIGHT),
        }
    }
}

/// `(start, width)` with `padding` added on the end side, clamped to
/// `[0, CHROM_END_POS]`.
pub fn x_range(start: u64, end: u64, padding: u64) -> (u64, u64) {
    let start = start.min(CHROM_END_POS);
    let end = end.saturating_add(padding).min(CHROM_END_POS);
    (start, end.saturating_sub(start))
}

/// Bars sharing one y-band; mirrors a broken horizontal bar collection.
#[derive(Debug, Clone, PartialEq)]
pub struct BarCollection {
    pub label: String,
    pub xranges: Vec<(u64, u64)>,
    /// `(ymin, height)`
    pub yrange: (f64, f64),
    pub colors: Vec<Rgb>,
}

impl BarCollection {
    fn new(label: &str, yrange: (f64, f64)) -> Self {
        BarCollection {
            label: label.to_string(),
            xranges: Vec::new(),
            yrange,
            colors: Vec::new(),
        }
    }

    fn push(&mut self, xrange: (u64, u64), color: Rgb) {
        self.xranges.push(xrange);
        self.colors.push(color);
    }
}

/// Group coloured intervals into one collection per chromosome, in order of
/// first appearance. Every collection gets `yrange(chrom)` as its band.
pub fn group_bars<F>(records: &[Interval], colors: &[Rgb], padding: u64, yrange: F) -> Vec<BarCollection>
where
    F: Fn(&str) -> (f64, f64),
{
    let mut collections: Vec<BarCollection> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();

    for (record, &color) in records.iter().zip(colors) {
        let slot = *index.entry(record.chrom.as_str()).or_insert_with(|| {
            collections.push(BarCollection::new(&record.chrom, yrange(&record.chrom)));
            collections.len() - 1
        });
        collections[slot].push(x_range(record.start, record.end, padding), color);
    }
    collections
}

/// A coverage curve, filled down to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: Rgb,
}

/// One curve per chromosome, points ordered by position. With `normalize`
/// every value becomes `round(value / mean)`.
pub fn coverage_series(records: &[Interval], normalize: bool, color: Rgb) -> Vec<AreaSeries> {
    let values: Vec<f64> = records.iter().map(|r| r.coverage().unwrap_or(0.0)).collect();
    let mean = if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    };

    let mut series: Vec<AreaSeries> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    for (record, &value) in records.iter().zip(&values) {
        let y = if !normalize {
            value
        } else if mean > 0.0 {
            (value / mean).round()
        } else {
            0.0
        };
        let slot = *index.entry(record.chrom.as_str()).or_insert_with(|| {
            series.push(AreaSeries {
                label: record.chrom.clone(),
                points: Vec::new(),
                color,
            });
            series.len() - 1
        });
        series[slot].points.push((record.start as f64, y));
    }

    for s in &mut series {
        s.points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    series
}

/// A single UPD region with both band colours resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBar {
    pub chrom: String,
    pub xrange: (u64, u64),
    pub upper: Rgb,
    pub lower: Rgb,
}

/// Resolve geometry and colours of one region.
pub fn region_bar(region: &RegionRecord) -> Result<RegionBar> {
    let field = |key: &str| {
        region.desc.get(key).ok_or_else(|| {
            Error::format(
                format!("{}:{}-{}", region.chrom, region.start, region.stop),
                format!("description lacks {}=", key.to_uppercase()),
            )
        })
    };
    let origin: Origin = field("origin")?.parse()?;
    let disomy_type: DisomyType = field("type")?.parse()?;

    Ok(RegionBar {
        chrom: region.chrom.clone(),
        xrange: x_range(region.start, region.stop, PADDING),
        upper: tint(disomy_type, origin),
        lower: origin.color(),
    })
}

/// Consecutive regions of one chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct DisomyRun {
    pub chrom: String,
    pub xranges: Vec<(u64, u64)>,
    pub upper: Vec<Rgb>,
    pub lower: Vec<Rgb>,
}

/// Merge regions into runs by emission adjacency: a run ends whenever the
/// chromosome differs from the previous region, whatever the positions.
pub fn compile_runs(bars: &[RegionBar]) -> Vec<DisomyRun> {
    let mut runs: Vec<DisomyRun> = Vec::new();
    for bar in bars {
        match runs.last_mut() {
            Some(run) if run.chrom == bar.chrom => {
                run.xranges.push(bar.xrange);
                run.upper.push(bar.upper);
                run.lower.push(bar.lower);
            }
            _ => runs.push(DisomyRun {
                chrom: bar.chrom.clone(),
                xranges: vec![bar.xrange],
                upper: vec![bar.upper],
                lower: vec![bar.lower],
            }),
        }
    }
    debug!("{} regions merged into {} runs", bars.len(), runs.len());
    runs
}

/// Upper tint band and lower origin band of a run, lifted to `ybase`.
pub fn run_bands(run: &DisomyRun, ybase: f64) -> [BarCollection; 2] {
    let upper = BarCollection {
        label: run.chrom.clone(),
        xranges: run.xranges.clone(),
        yrange: (ybase + UPPER_BAND.0, UPPER_BAND.1),
        colors: run.upper.clone(),
    };
    let lower = BarCollection {
        label: run.chrom.clone(),
        xranges: run.xranges.clone(),
        yrange: (ybase + LOWER_BAND.0, LOWER_BAND.1),
        colors: run.lower.clone(),
    };
    [upper, lower]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Label;
    use crate::model::Value;

    fn region(chrom: &str, start: u64, origin: &str, disomy: &str) -> RegionRecord {
        let mut desc = FxHashMap::default();
        desc.insert("origin".to_string(), origin.to_string());
        desc.insert("type".to_string(), disomy.to_string());
        RegionRecord {
            chrom: chrom.to_string(),
            start,
            stop: start + 1000,
            desc,
        }
    }

    #[test]
    fn test_lane_layout() {
        let chroms: Vec<String> = ["1", "2", "3"].iter().map(|c| c.to_string()).collect();
        let layout = LaneLayout::new(&chroms);
        assert_eq!(layout.get("1").unwrap().ybase, 0.0);
        assert_eq!(layout.get("2").unwrap().ybase, 2.0);
        assert_eq!(layout.get("3").unwrap().center, 4.5);
        assert_eq!(layout.y_bounds(), (0.0, 5.0));
        assert!(layout.get("chr1").is_none());
    }

    #[test]
    fn test_x_range() {
        assert_eq!(x_range(100, 300, 0), (100, 200));
        assert_eq!(x_range(100, 300, PADDING), (100, 200 + PADDING));
        assert_eq!(x_range(CHROM_END_POS - 10, CHROM_END_POS, PADDING), (CHROM_END_POS - 10, 10));
        assert_eq!(x_range(CHROM_END_POS + 5, CHROM_END_POS + 10, 0), (CHROM_END_POS, 0));
    }

    #[test]
    fn test_group_bars() {
        let records = vec![
            Interval::new("2", 0, 10, Value::Empty),
            Interval::new("1", 0, 10, Value::Empty),
            Interval::new("2", 20, 30, Value::Empty),
        ];
        let colors = vec![(1, 1, 1), (2, 2, 2), (3, 3, 3)];
        let groups = group_bars(&records, &colors, 0, |_| (0.0, HEIGHT));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "2");
        assert_eq!(groups[0].xranges, vec![(0, 10), (20, 10)]);
        assert_eq!(groups[0].colors, vec![(1, 1, 1), (3, 3, 3)]);
    }

    #[test]
    fn test_coverage_series_normalize() {
        let records = vec![
            Interval::point("1", 10, 4.0),
            Interval::point("1", 0, 2.0),
            Interval::point("2", 0, 0.0),
        ];
        let series = coverage_series(&records, true, (0, 0, 0));
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].points, vec![(0.0, 1.0), (10.0, 2.0)]);
        assert_eq!(series[1].points, vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_runs_follow_emission_order() {
        let bars: Vec<RegionBar> = [
            region("1", 0, "MATERNAL", "ISODISOMY"),
            region("1", 5000, "MATERNAL", "HETERODISOMY"),
            region("2", 0, "PATERNAL", "ISODISOMY"),
            region("1", 9000, "PATERNAL", "ISODISOMY"),
        ]
        .iter()
        .map(|r| region_bar(r).unwrap())
        .collect();
        let runs = compile_runs(&bars);
        let chroms: Vec<&str> = runs.iter().map(|r| r.chrom.as_str()).collect();
        assert_eq!(chroms, vec!["1", "2", "1"]);
        assert_eq!(runs[0].xranges, vec![(0, 1000 + PADDING), (5000, 1000 + PADDING)]);
        assert_eq!(runs[0].upper[1], Label::MaternalLight.color());
        assert_eq!(runs[0].lower[1], Label::Maternal.color());
    }

    #[test]
    fn test_region_bar_missing_origin() {
        let mut r = region("1", 0, "MATERNAL", "ISODISOMY");
        r.desc.remove("origin");
        assert!(matches!(region_bar(&r), Err(Error::Format { .. })));
        let r = region("1", 0, "GRANDPARENTAL", "ISODISOMY");
        assert!(matches!(region_bar(&r), Err(Error::UnknownLabel(_))));
    }

    #[test]
    fn test_run_bands() {
        let run = DisomyRun {
            chrom: "3".to_string(),
            xranges: vec![(0, 10)],
            upper: vec![(1, 2, 3)],
            lower: vec![(4, 5, 6)],
        };
        let [upper, lower] = run_bands(&run, 0.0);
        assert_eq!(upper.yrange, UPPER_BAND);
        assert_eq!(lower.yrange, LOWER_BAND);
        assert_eq!(lower.colors, vec![(4, 5, 6)]);

        let [lifted, _] = run_bands(&run, 4.0);
        assert!((lifted.yrange.0 - 4.52).abs() < 1e-9);
    }
}
