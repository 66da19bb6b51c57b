//! Launch parameter parsing for the simulator.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use orrery_place::ScaleParameters;

/// Slider position that yields the default multiplier of 0.67.
const DEFAULT_SLIDER: u8 = 33;
/// A typical phone's smallest width.
const DEFAULT_SCREEN_DP: u32 = 411;
/// Ten seconds at 60 fps.
const DEFAULT_FRAMES: u32 = 600;

/// How the selection is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlacementMode {
    /// Tap on a detected floor plane.
    #[default]
    Surface,
    /// Float in front of the camera.
    Air,
}

/// Which parameter preset the session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// Several bodies side by side.
    #[default]
    Compare,
    /// One body on its own.
    Single,
}

impl Preset {
    pub fn parameters(self) -> ScaleParameters {
        match self {
            Self::Compare => ScaleParameters::COMPARE,
            Self::Single => ScaleParameters::SINGLE,
        }
    }
}

/// Where the catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Http(String),
    File(PathBuf),
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Headless driver for the orrery AR placement engine")]
struct CliArgs {
    /// Base URL of the HTTP catalog.
    #[arg(long, conflicts_with = "catalog_file", required_unless_present = "catalog_file")]
    catalog_url: Option<String>,

    /// JSON file holding the catalog.
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    /// Body ids to place, left to right (comma separated).
    #[arg(long = "ids", value_delimiter = ',', conflicts_with = "category")]
    ids: Vec<String>,

    /// Place every body of this category.
    #[arg(long)]
    category: Option<String>,

    /// Scale slider position (0-100).
    #[arg(long, default_value_t = DEFAULT_SLIDER, value_parser = clap::value_parser!(u8).range(0..=100))]
    slider: u8,

    /// Smallest screen width in density-independent pixels.
    #[arg(long, default_value_t = DEFAULT_SCREEN_DP)]
    screen_dp: u32,

    /// Placement mode.
    #[arg(long, value_enum, default_value_t = PlacementMode::default())]
    mode: PlacementMode,

    /// Scaling preset.
    #[arg(long, value_enum, default_value_t = Preset::default())]
    preset: Preset,

    /// Largest bounding dimension every simulated model reports (0 for none).
    #[arg(long, default_value_t = 2.0)]
    model_extent: f32,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = DEFAULT_FRAMES)]
    frames: u32,

    /// Frames before tracking finds a surface.
    #[arg(long, default_value_t = 0)]
    tracking_delay: u32,

    /// Directory for downloaded models and cached catalog responses.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Favorites file. Used as the selection when no ids or category are given.
    #[arg(long)]
    favorites: Option<PathBuf>,

    /// Add the placed bodies to the favorites file.
    #[arg(long, requires = "favorites")]
    remember: bool,
}

/// Launch parameters for the simulator.
#[derive(Debug, Clone)]
pub struct LaunchParams {
    pub catalog: CatalogSource,
    pub ids: Vec<String>,
    pub category: Option<String>,
    pub slider: u8,
    pub screen_dp: u32,
    pub mode: PlacementMode,
    pub preset: Preset,
    pub model_extent: f32,
    pub frames: u32,
    pub tracking_delay: u32,
    pub cache_dir: Option<PathBuf>,
    pub favorites: Option<PathBuf>,
    pub remember: bool,
}

impl From<CliArgs> for LaunchParams {
    fn from(args: CliArgs) -> Self {
        let catalog = match (args.catalog_url, args.catalog_file) {
            (Some(url), _) => CatalogSource::Http(url),
            (None, Some(path)) => CatalogSource::File(path),
            // clap enforces one of the two.
            (None, None) => CatalogSource::File(PathBuf::from("catalog.json")),
        };
        Self {
            catalog,
            ids: args
                .ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
            category: args.category,
            slider: args.slider,
            screen_dp: args.screen_dp,
            mode: args.mode,
            preset: args.preset,
            model_extent: args.model_extent,
            frames: args.frames,
            tracking_delay: args.tracking_delay,
            cache_dir: args.cache_dir,
            favorites: args.favorites,
            remember: args.remember,
        }
    }
}

/// Parse launch parameters from the command line.
pub fn parse() -> LaunchParams {
    CliArgs::parse().into()
}
