use halide_core::Rgba8;
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_SIZE: f32 = 40.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const PLACEHOLDER_TEXT: &str = "Type here...";
pub const PLACEHOLDER_FONT_FAMILY: &str = "Courier New";

/// A line of text anchored at the start of its baseline, in canvas pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnnotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f32,
    pub color: Rgba8,
    pub font_family: String,
}

/// A freehand stroke, in canvas pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InkPath {
    pub points: Vec<Point>,
    pub color: Rgba8,
    pub width: f64,
}

impl InkPath {
    pub fn new(start: Point, color: Rgba8, width: f64) -> Self {
        Self {
            points: vec![start],
            color,
            width,
        }
    }

    /// Polyline through every point. A lone point becomes a hair-length
    /// segment so its round caps still leave a dot.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some((&first, rest)) = self.points.split_first() else {
            return path;
        };
        path.move_to(first);
        if rest.is_empty() {
            path.line_to((first.x + 0.01, first.y));
        }
        for &p in rest {
            path.line_to(p);
        }
        path
    }
}

/// Styling for new text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub color: Rgba8,
    pub font_family: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            color: Rgba8::BLACK,
            font_family: DEFAULT_FONT_FAMILY.into(),
        }
    }
}

/// Everything drawn on top of the background, in draw order per list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSnapshot {
    pub text_annotations: Vec<TextAnnotation>,
    pub ink_paths: Vec<InkPath>,
}

impl AnnotationSnapshot {
    pub fn is_empty(&self) -> bool {
        self.text_annotations.is_empty() && self.ink_paths.is_empty()
    }
}
