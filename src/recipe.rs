//! Develop recipes: a JSON file holding everything `develop` takes, so a
//! look can be saved and re-applied. Command-line flags win over the file.

use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::NaiveDateTime;
use halide_core::{DateStamp, ProcessingOptions, filters, layout};
use halide_surface::AnnotationSnapshot;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::cli::DevelopArgs;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub filter: Option<String>,
    pub camera: Option<String>,
    pub layout: Option<String>,
    pub seed: Option<u64>,
    pub options: Option<ProcessingOptions>,
    pub annotations: AnnotationSnapshot,
}

impl Recipe {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read recipe {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse recipe {}", path.display()))
    }
}

/// Fully resolved develop settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub filter_id: String,
    pub layout_id: String,
    pub seed: u64,
    pub options: ProcessingOptions,
    pub annotations: AnnotationSnapshot,
}

/// Merges flags over the recipe. `capture_time` fills a date stamp that
/// has no explicit date.
pub fn resolve(
    args: &DevelopArgs,
    recipe: Recipe,
    capture_time: Option<NaiveDateTime>,
    rng: &mut dyn RngCore,
) -> Result<Resolved> {
    let camera = args.camera.as_deref().or(recipe.camera.as_deref());
    let filter_id = match (args.filter.as_deref(), camera) {
        (Some(id), _) => id.to_string(),
        (None, Some(camera)) => halide_core::cameras::lookup(camera)
            .with_context(|| format!("unknown camera preset '{camera}'"))?
            .filter_id
            .to_string(),
        (None, None) => recipe
            .filter
            .clone()
            .unwrap_or_else(|| filters::NONE_ID.to_string()),
    };
    if !filters::exists(&filter_id) {
        tracing::warn!(filter = %filter_id, "unknown filter, developing without one");
    }

    let layout_id = args
        .layout
        .clone()
        .or(recipe.layout)
        .unwrap_or_else(|| layout::DEFAULT_LAYOUT_ID.to_string());

    let mut options = if args.darkroom {
        ProcessingOptions::darkroom_defaults(filters::lookup(&filter_id), rng)
    } else {
        recipe.options.unwrap_or_default()
    };
    if let Some(v) = args.intensity {
        options.intensity = v;
    }
    if let Some(v) = args.grain {
        options.grain_amount = v;
    }
    if let Some(v) = args.dust {
        options.dust_amount = v;
    }
    if let Some(v) = args.vignette {
        options.vignette_amount = v;
    }
    options.light_leak |= args.light_leak;

    if args.date_stamp {
        let timestamp = args
            .stamp_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .or(capture_time)
            .unwrap_or_else(|| chrono::Local::now().naive_local());
        let stamp = options
            .date_stamp
            .get_or_insert_with(|| DateStamp::new(timestamp));
        stamp.enabled = true;
        if args.stamp_date.is_some() || capture_time.is_some() {
            stamp.timestamp = timestamp;
        }
        if let Some(color) = args.stamp_color {
            stamp.color = color;
        }
        if let Some(format) = args.stamp_format {
            stamp.format = format.into();
        }
    }

    Ok(Resolved {
        filter_id,
        layout_id,
        seed: args.seed.or(recipe.seed).unwrap_or_else(|| rng.next_u64()),
        options: options.sanitized(),
        annotations: recipe.annotations,
    })
}
