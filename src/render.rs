//! The per-input driver: parse, filter, lay out, colour, then emit one image
//! per chromosome or one combined image, and optionally placeholders.

use crate::canvas::{Figure, Renderer};
use crate::chrom::{resolve, CanonicalLists, NamingConvention};
use crate::color::{lookup, Label, Rgb};
use crate::config::{ImageSizes, Settings};
use crate::error::{Error, Result};
use crate::layout::{
    coverage_series, compile_runs, group_bars, region_bar, run_bands, BarCollection, LaneLayout,
    CHROM_END_POS, COVERAGE_Y_MAX, HEIGHT, PADDING, YBASE,
};
use crate::model::{filter_with_fallback, Interval, Located, Value};
use crate::parse::{
    parse_coverage, parse_regions, parse_table, parse_wig_declaration, read_input, TableFormat,
    DEFAULT_SEPARATOR,
};
use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Files written by one invocation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Emission {
    pub written: Vec<PathBuf>,
    pub placeholders: Vec<PathBuf>,
}

/// `<stem>_<label>.png` for an input file name.
pub fn png_filename(input: &Path, label: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}_{}.png", stem, label)
}

/// Output path of `label` for `input`, placed in `outd`.
pub fn outpath(outd: &Path, input: &Path, label: &str) -> PathBuf {
    outd.join(png_filename(input, label))
}

/// Create `outd` if it does not exist.
pub fn assure_dir(outd: &Path) -> Result<()> {
    if outd.as_os_str().is_empty() || outd.is_dir() {
        return Ok(());
    }
    info!("Creating output directory {:?}", outd);
    std::fs::create_dir_all(outd).map_err(|e| Error::io(outd, e))
}

/// Canonical labels, in `convention`, of chromosomes not yet printed. A
/// chromosome counts as printed under either naming convention.
pub fn missing_labels(lists: &CanonicalLists, convention: NamingConvention, printed: &[String]) -> Vec<String> {
    let printed: FxHashSet<&str> = printed.iter().map(String::as_str).collect();
    let bare = lists.list(NamingConvention::NumericBare);
    let prefixed = lists.list(NamingConvention::Prefixed);

    (0..lists.len())
        .filter(|&i| !printed.contains(bare[i].as_str()) && !printed.contains(prefixed[i].as_str()))
        .filter_map(|i| lists.label(i, convention).map(str::to_string))
        .collect()
}

/// Naming convention to try first for a set of records.
fn first_guess<T: Located>(records: &[T]) -> NamingConvention {
    records
        .first()
        .map(|r| resolve(r.chrom()))
        .unwrap_or(NamingConvention::Prefixed)
}

/// Drives plotting of every input kind against one renderer.
pub struct Plotter<'a, R: Renderer> {
    lists: &'a CanonicalLists,
    sizes: ImageSizes,
    renderer: R,
}

impl<'a, R: Renderer> Plotter<'a, R> {
    pub fn new(lists: &'a CanonicalLists, sizes: ImageSizes, renderer: R) -> Self {
        Plotter {
            lists,
            sizes,
            renderer,
        }
    }

    #[cfg(test)]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Cytoband ideogram, coloured by stain class.
    pub fn plot_ideogram(&mut self, input: &Path, settings: &Settings) -> Result<Emission> {
        info!("Plot ideograms from {:?}, combine: {}, outd: {:?}", input, settings.combine, settings.outd);
        self.plot_table(input, settings, TableFormat::Ideogram)
    }

    /// UPD sites, coloured by site class and padded.
    pub fn plot_upd_sites(&mut self, input: &Path, settings: &Settings) -> Result<Emission> {
        info!("Plot UPD sites from {:?}, combine: {}, euploid: {}", input, settings.combine, settings.euploid);
        self.plot_table(input, settings, TableFormat::UpdSites)
    }

    /// Regions of homozygosity in a single colour, padded.
    pub fn plot_roh(&mut self, input: &Path, settings: &Settings) -> Result<Emission> {
        info!("Plot RoH from {:?}, combine: {}, euploid: {}", input, settings.combine, settings.euploid);
        self.plot_table(input, settings, TableFormat::Roh)
    }

    fn plot_table(&mut self, input: &Path, settings: &Settings, format: TableFormat) -> Result<Emission> {
        let text = read_input(input)?;
        let records = parse_table(&text, format, input)?;
        let (records, convention) = filter_with_fallback(&records, first_guess(&records), self.lists, input)?;

        let colors = records
            .iter()
            .map(interval_color)
            .collect::<Result<Vec<Rgb>>>()?;
        debug!(
            "{} intervals covering {} bp",
            records.len(),
            records.iter().map(Interval::width).sum::<u64>()
        );
        let padding = match format {
            TableFormat::Ideogram => 0,
            TableFormat::UpdSites | TableFormat::Roh => PADDING,
        };

        assure_dir(&settings.outd)?;
        if settings.combine {
            let lanes = LaneLayout::new(self.lists.list(convention));
            let bars = group_bars(&records, &colors, padding, |chrom| {
                (lanes.get(chrom).map_or(YBASE, |l| l.ybase), HEIGHT)
            });
            let written = self.emit_combined(input, settings, &lanes, bars)?;
            return Ok(Emission {
                written: vec![written],
                placeholders: Vec::new(),
            });
        }

        let bars = group_bars(&records, &colors, padding, |_| (YBASE, HEIGHT));
        let figures = bars
            .into_iter()
            .map(|collection| {
                let label = collection.label.clone();
                (label, vec![collection])
            })
            .collect();
        self.emit_individual(input, settings, convention, figures, self.sizes.bar, (YBASE, HEIGHT))
    }

    /// Fixed-step coverage curves, one image per chromosome.
    pub fn plot_coverage(&mut self, input: &Path, settings: &Settings) -> Result<Emission> {
        let text = read_input(input)?;
        let header = parse_wig_declaration(&text, DEFAULT_SEPARATOR, input)?;
        let step = settings.step.unwrap_or(header.step);
        info!(
            "Plot coverage from {:?}, declared {}:{}, step: {}, outd: {:?}, combine: {}, normalize: {}, euploid: {}",
            input, header.chrom, header.start, step, settings.outd, settings.combine, settings.normalize, settings.euploid
        );

        let records = parse_coverage(&text, step, DEFAULT_SEPARATOR, input)?;
        let (records, convention) = filter_with_fallback(&records, header.convention, self.lists, input)?;

        if settings.combine {
            warn!("Combined coverage image is not supported, nothing written for {:?}", input);
            return Ok(Emission::default());
        }

        assure_dir(&settings.outd)?;
        let mut emission = Emission::default();
        let mut printed = Vec::new();
        for series in coverage_series(&records, settings.normalize, settings.color) {
            let mut figure = Figure::new(self.sizes.coverage, (0.0, CHROM_END_POS as f64), (0.0, COVERAGE_Y_MAX));
            let out = outpath(&settings.outd, input, &series.label);
            printed.push(series.label.clone());
            figure.areas.push(series);
            self.write(&figure, &out)?;
            emission.written.push(out);
        }
        if settings.euploid {
            emission.placeholders = self.emit_placeholders(input, &settings.outd, convention, &printed)?;
        }
        Ok(emission)
    }

    /// UPD regions: a tint band above an origin band, one run per chromosome stretch.
    pub fn plot_upd_regions(&mut self, input: &Path, settings: &Settings) -> Result<Emission> {
        info!("Plot UPD regions from {:?}, outd: {:?}, euploid: {}", input, settings.outd, settings.euploid);
        let text = read_input(input)?;
        let regions = parse_regions(&text, input)?;
        let (regions, convention) = filter_with_fallback(&regions, first_guess(&regions), self.lists, input)?;
        let bars = regions.iter().map(region_bar).collect::<Result<Vec<_>>>()?;
        let runs = compile_runs(&bars);

        assure_dir(&settings.outd)?;
        if settings.combine {
            let lanes = LaneLayout::new(self.lists.list(convention));
            let collections = runs
                .iter()
                .flat_map(|run| run_bands(run, lanes.get(&run.chrom).map_or(YBASE, |l| l.ybase)))
                .collect();
            let written = self.emit_combined(input, settings, &lanes, collections)?;
            return Ok(Emission {
                written: vec![written],
                placeholders: Vec::new(),
            });
        }

        // A chromosome split over several runs still lands in one image.
        let mut figures: Vec<(String, Vec<BarCollection>)> = Vec::new();
        for run in &runs {
            let bands = run_bands(run, YBASE);
            match figures.iter_mut().find(|(label, _)| *label == run.chrom) {
                Some((_, collections)) => {
                    warn!("Regions of {} are not consecutive in {:?}", run.chrom, input);
                    collections.extend(bands);
                }
                None => figures.push((run.chrom.clone(), bands.to_vec())),
            }
        }
        self.emit_individual(input, settings, convention, figures, self.sizes.bar, (YBASE, HEIGHT))
    }

    fn emit_individual(
        &mut self,
        input: &Path,
        settings: &Settings,
        convention: NamingConvention,
        figures: Vec<(String, Vec<BarCollection>)>,
        size: (u32, u32),
        ylim: (f64, f64),
    ) -> Result<Emission> {
        let mut emission = Emission::default();
        let mut printed = Vec::with_capacity(figures.len());
        for (label, bars) in figures {
            let mut figure = Figure::new(size, (0.0, CHROM_END_POS as f64), ylim);
            figure.bars = bars;
            let out = outpath(&settings.outd, input, &label);
            self.write(&figure, &out)?;
            printed.push(label);
            emission.written.push(out);
        }
        if settings.euploid {
            emission.placeholders = self.emit_placeholders(input, &settings.outd, convention, &printed)?;
        }
        Ok(emission)
    }

    fn emit_combined(
        &mut self,
        input: &Path,
        settings: &Settings,
        lanes: &LaneLayout,
        bars: Vec<BarCollection>,
    ) -> Result<PathBuf> {
        let mut figure = Figure::new(self.sizes.combined, (0.0, CHROM_END_POS as f64), lanes.y_bounds());
        figure.bars = bars;
        figure.yticks = lanes
            .lanes()
            .iter()
            .map(|lane| (lane.center, lane.chrom.clone()))
            .collect();
        let out = outpath(&settings.outd, input, "combined");
        self.write(&figure, &out)?;
        Ok(out)
    }

    fn emit_placeholders(
        &mut self,
        input: &Path,
        outd: &Path,
        convention: NamingConvention,
        printed: &[String],
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for label in missing_labels(self.lists, convention, printed) {
            let out = outpath(outd, input, &label);
            info!("Print empty: {:?}", out);
            self.renderer.placeholder(&out)?;
            written.push(out);
        }
        debug!("{} placeholders written", written.len());
        Ok(written)
    }

    fn write(&mut self, figure: &Figure, out: &Path) -> Result<()> {
        info!("Outfile: {:?}", out);
        self.renderer.render(figure, out)
    }
}

fn interval_color(record: &Interval) -> Result<Rgb> {
    match record.value {
        Value::Stain { ref name, ref class } => lookup(class).map_err(|e| {
            warn!("band {} {}:{}: {}", name, record.chrom, record.start, e);
            e
        }),
        Value::Site(ref site) => lookup(site),
        Value::Empty => Ok(Label::PbHomozygous.color()),
        Value::Coverage(_) => Err(Error::UnknownLabel("coverage".to_string())),
    }
}
