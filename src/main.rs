mod canvas;
mod chrom;
mod color;
mod config;
mod error;
mod layout;
mod model;
mod parse;
mod render;

use canvas::PngRenderer;
use clap::{CommandFactory, Parser};
use config::{Config, Options, Settings};
use log::{error, info};
use render::{Emission, Plotter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chromograph")]
#[command(about = "Plot chromosome ideograms, UPD sites/regions and coverage as PNG images.", long_about = None)]
#[command(version)]
struct Args {
    // Inputs
    /// Ideogram (cytoband) file: chrom, start, end, name, gStain.
    #[arg(short = 'e', long = "ideo", value_name = "FILE")]
    ideofile: Option<PathBuf>,

    /// UPD sites file: chrom, start, end, updType.
    #[arg(short = 'u', long = "sites", value_name = "FILE")]
    upd_sites: Option<PathBuf>,

    /// Regions of homozygosity file: chrom, start, end.
    #[arg(short = 'y', long = "roh", value_name = "FILE")]
    roh: Option<PathBuf>,

    /// Fixed-step wig coverage file.
    #[arg(short = 'w', long = "coverage", value_name = "FILE")]
    coverage_file: Option<PathBuf>,

    /// UPD regions file: chrom start stop KEY=VALUE;...
    #[arg(short = 'g', long = "regions", value_name = "FILE")]
    upd_regions: Option<PathBuf>,

    // Output Options
    /// Output directory (default: directory of the input file).
    #[arg(short = 'o', long = "outd", value_name = "DIR")]
    outd: Option<PathBuf>,

    /// Graph color in RGB hex (only with --coverage).
    #[arg(short = 'r', long = "rgb", value_name = "HEX")]
    rgb: Option<String>,

    /// Normalize coverage to its mean (only with --coverage).
    #[arg(short = 'n', long = "norm")]
    norm: bool,

    /// Fixed step size, overriding the wig declaration.
    #[arg(long = "step", value_name = "N")]
    step: Option<u64>,

    /// Plot all chromosomes in one file instead of one file per chromosome.
    #[arg(short = 'c', long = "combine")]
    combine: bool,

    /// Always output a euploid set of files; missing chromosomes get empty PNGs.
    #[arg(short = 'p', long = "euploid")]
    euploid: bool,

    /// YAML configuration with chromosome lists and image sizes.
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    // Logging
    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 1)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> Options {
        Options {
            combine: self.combine,
            normalize: self.norm,
            euploid: self.euploid,
            outd: self.outd.clone(),
            step: self.step,
            rgb: self.rgb.clone(),
        }
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Ideogram,
    UpdSites,
    Roh,
    Coverage,
    UpdRegions,
}

fn plot(plotter: &mut Plotter<'_, PngRenderer>, kind: Kind, input: &Path, options: &Options) -> error::Result<Emission> {
    let settings = Settings::new(input, options)?;
    match kind {
        Kind::Ideogram => plotter.plot_ideogram(input, &settings),
        Kind::UpdSites => plotter.plot_upd_sites(input, &settings),
        Kind::Roh => plotter.plot_roh(input, &settings),
        Kind::Coverage => plotter.plot_coverage(input, &settings),
        Kind::UpdRegions => plotter.plot_upd_regions(input, &settings),
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let inputs: Vec<(Kind, &PathBuf)> = [
        (Kind::Ideogram, args.ideofile.as_ref()),
        (Kind::UpdSites, args.upd_sites.as_ref()),
        (Kind::Roh, args.roh.as_ref()),
        (Kind::Coverage, args.coverage_file.as_ref()),
        (Kind::UpdRegions, args.upd_regions.as_ref()),
    ]
    .into_iter()
    .filter_map(|(kind, path)| path.map(|p| (kind, p)))
    .collect();

    if inputs.is_empty() {
        if let Err(e) = Args::command().print_help() {
            eprintln!("Error printing help: {}", e);
        }
        std::process::exit(0);
    }

    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };
    let lists = config.canonical_lists();
    let mut plotter = Plotter::new(&lists, config.image, PngRenderer);
    let options = args.options();

    let mut failures = 0;
    for (kind, input) in inputs {
        match plot(&mut plotter, kind, input, &options) {
            Ok(emission) => info!(
                "{:?}: {} images, {} placeholders",
                input,
                emission.written.len(),
                emission.placeholders.len()
            ),
            Err(e) => {
                error!("{:?}: {}", input, e);
                eprintln!("Error plotting {:?}: {}", input, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
    info!("Done.");
}
