use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use halide_core::{DateStampFormat, Rgba8};

#[derive(Parser, Debug)]
#[command(name = "halide", version, about = "Develop photos with a film look and frame them as prints")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Develop a photo, frame it into a layout and export the print.
    Develop(DevelopArgs),
    /// List the film filters.
    Filters(ListArgs),
    /// List the print layouts.
    Layouts(ListArgs),
    /// List the camera presets.
    Cameras(ListArgs),
    /// Print the EXIF summary of a photo.
    Info(InfoArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Photo to inspect.
    pub input: PathBuf,
}

#[derive(Args, Debug, Default)]
pub struct DevelopArgs {
    /// Input photo (JPEG, PNG, TIFF or camera RAW).
    pub input: PathBuf,

    /// Output file; `.png` exports PNG, anything else JPEG.
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON recipe with filter, layout, options and annotations.
    #[arg(long)]
    pub recipe: Option<PathBuf>,

    /// Filter id, see `halide filters`.
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Camera preset id; picks that camera's filter.
    #[arg(long, conflicts_with = "filter")]
    pub camera: Option<String>,

    /// Layout id, see `halide layouts`.
    #[arg(short, long)]
    pub layout: Option<String>,

    /// Start from the darkroom defaults for the chosen filter.
    #[arg(long)]
    pub darkroom: bool,

    #[arg(long, value_parser = unit_interval)]
    pub intensity: Option<f32>,

    #[arg(long, value_parser = unit_interval)]
    pub grain: Option<f32>,

    #[arg(long, value_parser = unit_interval)]
    pub dust: Option<f32>,

    #[arg(long, value_parser = unit_interval)]
    pub vignette: Option<f32>,

    /// Request a light leak (still skipped some of the time).
    #[arg(long)]
    pub light_leak: bool,

    /// Imprint the date in the corner.
    #[arg(long)]
    pub date_stamp: bool,

    /// Date to imprint; defaults to the EXIF capture date, then today.
    #[arg(long, requires = "date_stamp")]
    pub stamp_date: Option<NaiveDate>,

    #[arg(long, requires = "date_stamp")]
    pub stamp_color: Option<Rgba8>,

    #[arg(long, value_enum, requires = "date_stamp")]
    pub stamp_format: Option<StampFormat>,

    /// Text annotation; repeat for several lines.
    #[arg(long = "text")]
    pub texts: Vec<String>,

    #[arg(long)]
    pub text_color: Option<Rgba8>,

    #[arg(long)]
    pub text_size: Option<f32>,

    #[arg(long)]
    pub font_family: Option<String>,

    /// Font file to register; repeat for several.
    #[arg(long = "font")]
    pub fonts: Vec<PathBuf>,

    /// Seed for grain, dust and light leaks.
    #[arg(long)]
    pub seed: Option<u64>,

    /// JPEG quality.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StampFormat {
    Classic,
    Digital,
}

impl From<StampFormat> for DateStampFormat {
    fn from(f: StampFormat) -> Self {
        match f {
            StampFormat::Classic => DateStampFormat::Classic,
            StampFormat::Digital => DateStampFormat::Digital,
        }
    }
}

fn unit_interval(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("{v} is not between 0 and 1"))
    }
}
