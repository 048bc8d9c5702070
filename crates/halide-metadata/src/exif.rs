use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use ::exif::{In, Tag};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Capture facts shown next to a developed photo and used to date its stamp.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifData {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub lens: Option<String>,
    pub focal_length: Option<f64>,
    pub aperture: Option<f64>,
    pub shutter_speed: Option<String>,
    pub iso: Option<u32>,
    /// `DateTimeOriginal` as the camera wrote it, `YYYY:MM:DD HH:MM:SS`.
    pub date_taken: Option<String>,
    pub orientation: Option<u32>,
}

impl ExifData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::read(&mut BufReader::new(file))
            .with_context(|| format!("read EXIF from {}", path.display()))
    }

    /// Reads EXIF from an in-memory JPEG, TIFF, PNG, HEIF or WebP container.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut Cursor::new(bytes)).context("read EXIF from buffer")
    }

    fn read<R: BufRead + Seek>(reader: &mut R) -> Result<Self> {
        let exif = ::exif::Reader::new().read_from_container(reader)?;
        let data = Self {
            width: get_u32(&exif, Tag::PixelXDimension)
                .or_else(|| get_u32(&exif, Tag::ImageWidth)),
            height: get_u32(&exif, Tag::PixelYDimension)
                .or_else(|| get_u32(&exif, Tag::ImageLength)),
            camera_make: get_string(&exif, Tag::Make),
            camera_model: get_string(&exif, Tag::Model),
            lens: get_string(&exif, Tag::LensModel),
            focal_length: get_rational_f64(&exif, Tag::FocalLength),
            aperture: get_rational_f64(&exif, Tag::FNumber),
            shutter_speed: get_string(&exif, Tag::ExposureTime),
            iso: get_u32(&exif, Tag::PhotographicSensitivity),
            date_taken: get_ascii(&exif, Tag::DateTimeOriginal)
                .or_else(|| get_ascii(&exif, Tag::DateTime)),
            orientation: get_u32(&exif, Tag::Orientation),
        };
        debug!(fields = exif.fields().count(), "read EXIF");
        Ok(data)
    }

    /// When the shutter fired, if the camera recorded it.
    pub fn capture_time(&self) -> Option<NaiveDateTime> {
        self.date_taken.as_deref().and_then(parse_exif_datetime)
    }

    pub fn camera(&self) -> Option<String> {
        match (&self.camera_make, &self.camera_model) {
            (Some(make), Some(model)) if model.starts_with(make.as_str()) => Some(model.clone()),
            (Some(make), Some(model)) => Some(format!("{make} {model}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }

    pub fn summary_lines(&self) -> Vec<(String, String)> {
        let mut lines = Vec::new();

        if let Some(camera) = self.camera() {
            lines.push(("Camera".into(), camera));
        }
        if let Some(ref lens) = self.lens {
            lines.push(("Lens".into(), lens.clone()));
        }
        if let Some(fl) = self.focal_length {
            lines.push(("Focal Length".into(), format!("{fl:.0}mm")));
        }
        if let Some(ap) = self.aperture {
            lines.push(("Aperture".into(), format!("f/{ap:.1}")));
        }
        if let Some(ref ss) = self.shutter_speed {
            lines.push(("Shutter".into(), ss.clone()));
        }
        if let Some(iso) = self.iso {
            lines.push(("ISO".into(), iso.to_string()));
        }
        if let (Some(w), Some(h)) = (self.width, self.height) {
            lines.push(("Resolution".into(), format!("{w} x {h}")));
        }
        match (self.capture_time(), &self.date_taken) {
            (Some(ts), _) => lines.push(("Captured".into(), ts.format("%Y-%m-%d %H:%M:%S").to_string())),
            (None, Some(raw)) => lines.push(("Captured".into(), raw.clone())),
            (None, None) => {}
        }

        lines
    }
}

/// Parses EXIF `YYYY:MM:DD HH:MM:SS`, also accepting `-` date separators
/// and a missing time.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim().trim_end_matches('\0');
    for fmt in ["%Y:%m:%d %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    ["%Y:%m:%d", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn get_ascii(exif: &::exif::Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY).and_then(|f| match f.value {
        ::exif::Value::Ascii(ref v) => v
            .first()
            .map(|s| String::from_utf8_lossy(s).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    })
}

fn get_string(exif: &::exif::Exif, tag: Tag) -> Option<String> {
    exif.get_field(tag, In::PRIMARY)
        .map(|f| f.display_value().to_string().trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
}

fn get_u32(exif: &::exif::Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY).and_then(|f| match f.value {
        ::exif::Value::Short(ref v) => v.first().map(|&x| x as u32),
        ::exif::Value::Long(ref v) => v.first().copied(),
        _ => f.display_value().to_string().trim().parse().ok(),
    })
}

fn get_rational_f64(exif: &::exif::Exif, tag: Tag) -> Option<f64> {
    exif.get_field(tag, In::PRIMARY).and_then(|f| match f.value {
        ::exif::Value::Rational(ref v) => v
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.num as f64 / r.denom as f64),
        _ => f.display_value().to_string().trim().parse().ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camera_datetime() {
        let ts = parse_exif_datetime("2024:03:07 09:15:42").unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-07 09:15:42");
        assert!(parse_exif_datetime("2024-03-07 09:15:42").is_some());
        assert!(parse_exif_datetime("2024:03:07").is_some());
    }

    #[test]
    fn rejects_blank_datetime() {
        // cameras without a clock write spaces or zeros
        assert!(parse_exif_datetime("                   ").is_none());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("garbage").is_none());
    }

    #[test]
    fn capture_time_from_date_taken() {
        let data = ExifData {
            date_taken: Some("2024:03:07 09:15:42".into()),
            ..Default::default()
        };
        let ts = data.capture_time().unwrap();
        assert_eq!(ts.format("%y %m %d").to_string(), "24 03 07");
        assert!(ExifData::default().capture_time().is_none());
    }

    #[test]
    fn empty_exif_summary() {
        assert!(ExifData::default().summary_lines().is_empty());
    }

    #[test]
    fn full_exif_summary() {
        let data = ExifData {
            camera_make: Some("FUJIFILM".into()),
            camera_model: Some("X100V".into()),
            lens: Some("23mm F2".into()),
            focal_length: Some(23.0),
            aperture: Some(2.0),
            shutter_speed: Some("1/250 s".into()),
            iso: Some(400),
            width: Some(6240),
            height: Some(4160),
            date_taken: Some("2024:03:07 09:15:42".into()),
            orientation: Some(1),
        };
        let lines = data.summary_lines();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], ("Camera".into(), "FUJIFILM X100V".into()));
        assert_eq!(lines[2].1, "23mm");
        assert_eq!(lines[3].1, "f/2.0");
        assert_eq!(lines[7], ("Captured".into(), "2024-03-07 09:15:42".into()));
    }

    #[test]
    fn camera_model_already_prefixed() {
        let data = ExifData {
            camera_make: Some("Canon".into()),
            camera_model: Some("Canon EOS R5".into()),
            ..Default::default()
        };
        assert_eq!(data.camera().as_deref(), Some("Canon EOS R5"));
    }

    #[test]
    fn unparseable_date_is_shown_raw() {
        let data = ExifData {
            date_taken: Some("sometime".into()),
            ..Default::default()
        };
        assert_eq!(data.summary_lines(), vec![("Captured".into(), "sometime".into())]);
    }

    #[test]
    fn exif_from_nonexistent_file() {
        assert!(ExifData::from_file(Path::new("/nonexistent/photo.jpg")).is_err());
    }

    #[test]
    fn bytes_without_exif_is_error() {
        assert!(ExifData::from_bytes(b"not a container").is_err());
    }

    #[test]
    fn serializes_to_json() {
        let data = ExifData {
            camera_make: Some("Leica".into()),
            iso: Some(200),
            ..Default::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["camera_make"], "Leica");
        let back: ExifData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }
}
