pub mod exif;

pub use crate::exif::{ExifData, parse_exif_datetime};
