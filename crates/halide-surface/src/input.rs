use kurbo::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolMode {
    #[default]
    Idle,
    Drawing,
    TextEditing,
}

/// A pointer position relative to the top-left of the displayed surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen size the canvas is currently displayed at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Presentation {
    pub width: f64,
    pub height: f64,
}

impl Presentation {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Displayed 1:1 with the canvas.
    pub fn native(canvas_w: u32, canvas_h: u32) -> Self {
        Self::new(canvas_w as f64, canvas_h as f64)
    }

    /// Presentation-to-canvas factors. Degenerate sizes map 1:1.
    pub fn scale_to(&self, canvas_w: u32, canvas_h: u32) -> (f64, f64) {
        let factor = |canvas: u32, shown: f64| {
            if shown.is_finite() && shown > 0.0 {
                canvas as f64 / shown
            } else {
                1.0
            }
        };
        (factor(canvas_w, self.width), factor(canvas_h, self.height))
    }

    pub fn to_canvas(&self, event: PointerEvent, canvas_w: u32, canvas_h: u32) -> Point {
        let (sx, sy) = self.scale_to(canvas_w, canvas_h);
        Point::new(event.x * sx, event.y * sy)
    }
}
