use chrono::{Datelike, NaiveDateTime};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::color::Rgba8;
use crate::filters::{Category, FilterDescriptor};

/// Probability that a darkroom session requests a light leak at all.
pub const LIGHT_LEAK_REQUEST_PROBABILITY: f64 = 0.3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStampFormat {
    /// Plain imprint with a soft black drop shadow.
    #[default]
    Classic,
    /// LED-style imprint with an orange glow.
    Digital,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateStamp {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    pub timestamp: NaiveDateTime,
    #[serde(default = "stamp_color_default")]
    pub color: Rgba8,
    #[serde(default)]
    pub format: DateStampFormat,
}

fn enabled_default() -> bool {
    true
}

fn stamp_color_default() -> Rgba8 {
    Rgba8::BLACK
}

impl DateStamp {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            enabled: true,
            timestamp,
            color: stamp_color_default(),
            format: DateStampFormat::Classic,
        }
    }

    /// `'YY MM DD`, e.g. `'24 03 07`.
    pub fn text(&self) -> String {
        format_stamp(&self.timestamp)
    }
}

pub fn format_stamp(ts: &NaiveDateTime) -> String {
    format!(
        "'{:02} {:02} {:02}",
        ts.year().rem_euclid(100),
        ts.month(),
        ts.day()
    )
}

/// Per-capture knobs for the film pipeline.
///
/// All amounts are 0..=1. Deserializes from partial camelCase JSON, with
/// missing fields taking the neutral defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingOptions {
    /// Overall strength. Carried through for hosts; every stage currently runs at full strength.
    pub intensity: f32,
    pub grain_amount: f32,
    pub dust_amount: f32,
    pub vignette_amount: f32,
    pub light_leak: bool,
    pub date_stamp: Option<DateStamp>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            grain_amount: 0.0,
            dust_amount: 0.0,
            vignette_amount: 0.0,
            light_leak: false,
            date_stamp: None,
        }
    }
}

impl ProcessingOptions {
    /// The settings the editor develops a fresh capture with.
    pub fn darkroom_defaults(filter: &FilterDescriptor, rng: &mut dyn RngCore) -> Self {
        let grain_amount = if filter.has_category(Category::Bw) {
            0.5
        } else {
            0.25
        };
        let dust_amount = if filter.has_category(Category::Vintage) {
            0.4
        } else {
            0.15
        };
        Self {
            intensity: 1.0,
            grain_amount,
            dust_amount,
            vignette_amount: 0.5,
            light_leak: rng.random_bool(LIGHT_LEAK_REQUEST_PROBABILITY),
            date_stamp: None,
        }
    }

    /// Clamp every amount into 0..=1.
    pub fn sanitized(mut self) -> Self {
        self.intensity = clamp_unit(self.intensity);
        self.grain_amount = clamp_unit(self.grain_amount);
        self.dust_amount = clamp_unit(self.dust_amount);
        self.vignette_amount = clamp_unit(self.vignette_amount);
        self
    }

    /// The date stamp, if one is present and enabled.
    pub fn active_date_stamp(&self) -> Option<&DateStamp> {
        self.date_stamp.as_ref().filter(|d| d.enabled)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn stamp_text_format() {
        assert_eq!(format_stamp(&ts(2024, 3, 7)), "'24 03 07");
        assert_eq!(format_stamp(&ts(1999, 12, 31)), "'99 12 31");
        assert_eq!(format_stamp(&ts(2005, 1, 1)), "'05 01 01");
    }

    #[test]
    fn defaults_are_neutral() {
        let opts = ProcessingOptions::default();
        assert_eq!(opts.intensity, 1.0);
        assert_eq!(opts.grain_amount, 0.0);
        assert!(!opts.light_leak);
        assert!(opts.date_stamp.is_none());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let opts: ProcessingOptions =
            serde_json::from_str(r#"{"grainAmount":0.5,"vignetteAmount":0.5}"#).unwrap();
        assert_eq!(opts.grain_amount, 0.5);
        assert_eq!(opts.vignette_amount, 0.5);
        assert_eq!(opts.dust_amount, 0.0);
        assert_eq!(opts.intensity, 1.0);
    }

    #[test]
    fn date_stamp_json_shape() {
        let json = r##"{
            "lightLeak": true,
            "dateStamp": {"timestamp": "2024-03-07T09:15:00", "color": "#ff8800", "format": "digital"}
        }"##;
        let opts: ProcessingOptions = serde_json::from_str(json).unwrap();
        assert!(opts.light_leak);
        let stamp = opts.active_date_stamp().unwrap();
        assert_eq!(stamp.format, DateStampFormat::Digital);
        assert_eq!(stamp.color, Rgba8::rgb(255, 136, 0));
        assert_eq!(stamp.text(), "'24 03 07");
    }

    #[test]
    fn disabled_stamp_is_inactive() {
        let mut stamp = DateStamp::new(ts(2024, 3, 7));
        stamp.enabled = false;
        let opts = ProcessingOptions {
            date_stamp: Some(stamp),
            ..Default::default()
        };
        assert!(opts.active_date_stamp().is_none());
    }

    #[test]
    fn serialization_is_camel_case() {
        let json = serde_json::to_value(ProcessingOptions::default()).unwrap();
        assert!(json.get("grainAmount").is_some());
        assert!(json.get("lightLeak").is_some());
        assert!(json.get("grain_amount").is_none());
    }

    #[test]
    fn darkroom_defaults_follow_category() {
        let mut rng = StdRng::seed_from_u64(7);
        let bw = ProcessingOptions::darkroom_defaults(filters::lookup("ilford-bw"), &mut rng);
        assert_eq!(bw.grain_amount, 0.5);
        assert_eq!(bw.dust_amount, 0.15);
        let vintage =
            ProcessingOptions::darkroom_defaults(filters::lookup("vintage-70s"), &mut rng);
        assert_eq!(vintage.grain_amount, 0.25);
        assert_eq!(vintage.dust_amount, 0.4);
        assert_eq!(vintage.vignette_amount, 0.5);
    }

    #[test]
    fn darkroom_light_leak_is_sometimes_requested() {
        let mut rng = StdRng::seed_from_u64(42);
        let filter = filters::lookup("kodak-portra");
        let requested = (0..1000)
            .filter(|_| ProcessingOptions::darkroom_defaults(filter, &mut rng).light_leak)
            .count();
        assert!((200..400).contains(&requested), "requested {requested}/1000");
    }

    #[test]
    fn sanitize_clamps() {
        let opts = ProcessingOptions {
            grain_amount: 3.0,
            vignette_amount: -1.0,
            dust_amount: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(opts.grain_amount, 1.0);
        assert_eq!(opts.vignette_amount, 0.0);
        assert_eq!(opts.dust_amount, 0.0);
    }
}
