//! Configuration: canonical chromosome lists and image sizes from YAML,
//! plus the immutable per-call [`Settings`].

use crate::canvas::MAX_PIXELS;
use crate::chrom::{CanonicalLists, CHROMOSOMES, CHR_PREFIX};
use crate::color::{Rgb, WIG_ORANGE};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pixel sizes of the produced images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSizes {
    /// One chromosome drawn as bars (ideogram, sites, roh, regions).
    #[serde(default = "default_bar_size")]
    pub bar: (u32, u32),

    /// One chromosome coverage curve.
    #[serde(default = "default_coverage_size")]
    pub coverage: (u32, u32),

    /// All chromosomes stacked, excluding the label gutter.
    #[serde(default = "default_combined_size")]
    pub combined: (u32, u32),
}

impl Default for ImageSizes {
    fn default() -> Self {
        ImageSizes {
            bar: default_bar_size(),
            coverage: default_coverage_size(),
            combined: default_combined_size(),
        }
    }
}

fn default_bar_size() -> (u32, u32) {
    (2000, 100)
}

fn default_coverage_size() -> (u32, u32) {
    (1610, 137)
}

fn default_combined_size() -> (u32, u32) {
    (600, 800)
}

fn default_chromosomes() -> Vec<String> {
    CHROMOSOMES.iter().map(|c| c.to_string()).collect()
}

/// Contents of the YAML configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bare chromosome keys in lane order.
    #[serde(default = "default_chromosomes")]
    pub chromosomes: Vec<String>,

    /// Prefixed keys; derived from `chromosomes` when absent.
    #[serde(default)]
    pub chr_chromosomes: Option<Vec<String>>,

    #[serde(default)]
    pub image: ImageSizes,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chromosomes: default_chromosomes(),
            chr_chromosomes: None,
            image: ImageSizes::default(),
        }
    }
}

impl Config {
    /// Load the YAML file at `path`, or the built-in default when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_yaml(p),
            None => Ok(Config::default()),
        }
    }

    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Config = serde_yaml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };
        if self.chromosomes.is_empty() {
            return Err(invalid("chromosomes must not be empty".to_string()));
        }
        if let Some(ref prefixed) = self.chr_chromosomes {
            if prefixed.len() != self.chromosomes.len() {
                return Err(invalid(format!(
                    "chr_chromosomes has {} entries, chromosomes has {}",
                    prefixed.len(),
                    self.chromosomes.len()
                )));
            }
            for (bare, chr) in self.chromosomes.iter().zip(prefixed) {
                if chr.strip_prefix(CHR_PREFIX) != Some(bare.as_str()) {
                    return Err(invalid(format!("{} is not the prefixed form of {}", chr, bare)));
                }
            }
        }
        for (name, size) in [
            ("bar", self.image.bar),
            ("coverage", self.image.coverage),
            ("combined", self.image.combined),
        ] {
            if size.0 == 0 || size.1 == 0 {
                return Err(invalid(format!("image.{} must be at least 1x1", name)));
            }
            if size.0 as u64 * size.1 as u64 > MAX_PIXELS {
                return Err(invalid(format!(
                    "image.{} of {}x{} exceeds {} pixels",
                    name, size.0, size.1, MAX_PIXELS
                )));
            }
        }
        Ok(())
    }

    pub fn canonical_lists(&self) -> CanonicalLists {
        match self.chr_chromosomes {
            Some(ref prefixed) => CanonicalLists::from_parts(self.chromosomes.clone(), prefixed.clone()),
            None => CanonicalLists::from_bare(self.chromosomes.clone()),
        }
    }
}

/// Options given by the caller for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub combine: bool,
    pub normalize: bool,
    pub euploid: bool,
    pub outd: Option<PathBuf>,
    pub step: Option<u64>,
    pub rgb: Option<String>,
}

/// Resolved settings of one plotting call. Built fresh for every input file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub combine: bool,
    pub normalize: bool,
    pub euploid: bool,
    pub outd: PathBuf,
    pub step: Option<u64>,
    pub color: Rgb,
}

impl Settings {
    /// Output goes to `options.outd` if set, else next to the input file.
    pub fn new(input: &Path, options: &Options) -> Result<Self> {
        let outd = match options.outd {
            Some(ref d) => d.clone(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        let color = match options.rgb {
            Some(ref hex) => crate::color::parse_hex(hex)?,
            None => WIG_ORANGE,
        };
        Ok(Settings {
            combine: options.combine,
            normalize: options.normalize,
            euploid: options.euploid,
            outd,
            step: options.step,
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrom::NamingConvention;
    use std::io::Write;

    fn write_yaml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::load(None).unwrap();
        let lists = config.canonical_lists();
        assert_eq!(lists.len(), 25);
        assert_eq!(config.image, ImageSizes::default());
    }

    #[test]
    fn test_yaml_lists() {
        let file = write_yaml("chromosomes: ['1', '2', 'X']\nimage:\n  bar: [100, 5]\n");
        let config = Config::from_yaml(file.path()).unwrap();
        let lists = config.canonical_lists();
        assert_eq!(lists.list(NamingConvention::Prefixed), &["chr1", "chr2", "chrX"]);
        assert_eq!(config.image.bar, (100, 5));
        assert_eq!(config.image.coverage, (1610, 137));
    }

    #[test]
    fn test_yaml_mismatched_prefixed() {
        let file = write_yaml("chromosomes: ['1', '2']\nchr_chromosomes: [chr1, chr3]\n");
        assert!(matches!(Config::from_yaml(file.path()), Err(Error::Config { .. })));
    }

    #[test]
    fn test_yaml_image_size_bounds() {
        let file = write_yaml("image:\n  bar: [40000, 30000]\n");
        assert!(matches!(Config::from_yaml(file.path()), Err(Error::Config { .. })));
        let file = write_yaml("image:\n  combined: [0, 800]\n");
        assert!(matches!(Config::from_yaml(file.path()), Err(Error::Config { .. })));
        let file = write_yaml("image:\n  coverage: [10000, 10000]\n");
        assert!(Config::from_yaml(file.path()).is_ok());
    }

    #[test]
    fn test_settings_fresh_per_call() {
        let options = Options {
            euploid: true,
            rgb: Some("00ff00".to_string()),
            ..Options::default()
        };
        let a = Settings::new(Path::new("/data/run/sample.wig"), &options).unwrap();
        let b = Settings::new(Path::new("/other/sample.bed"), &Options::default()).unwrap();
        assert_eq!(a.outd, PathBuf::from("/data/run"));
        assert_eq!(a.color, (0, 255, 0));
        assert!(a.euploid);
        assert!(!b.euploid);
        assert_eq!(b.color, WIG_ORANGE);
        assert_eq!(b.outd, PathBuf::from("/other"));
    }
}
