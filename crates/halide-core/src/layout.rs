use serde::Serialize;

/// How the print border is laid out around the photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarginPolicy {
    /// Same border on all four sides.
    Uniform,
    /// Thin sides and top, deep bottom strip, like instant film.
    InstantPrint,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayoutSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    /// Aspect ratio as (numerator, denominator) of width / height.
    pub aspect: (u32, u32),
    pub width: u32,
    pub height: u32,
    pub margin: MarginPolicy,
}

impl LayoutSpec {
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect.0 as f64 / self.aspect.1 as f64
    }
}

/// Content rectangle inside the output canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl FrameRect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// Where a source image lands when cover-fit into a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: f64,
    /// Top-left of the scaled image; may lie outside the frame.
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

const UNIFORM_BORDER: f64 = 0.04;
const INSTANT_SIDE: f64 = 0.05;
const INSTANT_TOP: f64 = 0.05;
const INSTANT_BOTTOM: f64 = 0.22;

pub const DEFAULT_LAYOUT_ID: &str = "4:5";

const fn layout(
    id: &'static str,
    name: &'static str,
    label: &'static str,
    aspect: (u32, u32),
    width: u32,
    height: u32,
    margin: MarginPolicy,
) -> LayoutSpec {
    LayoutSpec {
        id,
        name,
        label,
        aspect,
        width,
        height,
        margin,
    }
}

static LAYOUTS: [LayoutSpec; 7] = [
    layout("1:1", "Square", "SQUARE", (1, 1), 1080, 1080, MarginPolicy::Uniform),
    layout("4:5", "Portrait", "PORTRAIT", (4, 5), 1080, 1350, MarginPolicy::Uniform),
    layout("9:16", "Story", "STORY", (9, 16), 1080, 1920, MarginPolicy::Uniform),
    layout("16:9", "Landscape", "LANDSCAPE", (16, 9), 1920, 1080, MarginPolicy::Uniform),
    layout("4:3", "Classic", "CLASSIC", (4, 3), 1440, 1080, MarginPolicy::Uniform),
    layout("3:4", "Vertical", "VERTICAL", (3, 4), 1080, 1440, MarginPolicy::Uniform),
    layout(
        "polaroid",
        "Polaroid",
        "POLAROID",
        (4, 5),
        1080,
        1350,
        MarginPolicy::InstantPrint,
    ),
];

pub fn all() -> &'static [LayoutSpec] {
    &LAYOUTS
}

/// Looks up a layout. Unknown ids fall back to `4:5`.
pub fn lookup(id: &str) -> &'static LayoutSpec {
    LAYOUTS
        .iter()
        .find(|l| l.id == id)
        .unwrap_or(&LAYOUTS[1])
}

/// Content rectangle for `layout_id` on a `canvas_w` x `canvas_h` canvas.
pub fn frame_for(layout_id: &str, canvas_w: u32, canvas_h: u32) -> FrameRect {
    frame_for_policy(lookup(layout_id).margin, canvas_w, canvas_h)
}

pub fn frame_for_policy(policy: MarginPolicy, canvas_w: u32, canvas_h: u32) -> FrameRect {
    let (w, h) = (canvas_w as f64, canvas_h as f64);
    let (left, top, right, bottom) = match policy {
        MarginPolicy::InstantPrint => (
            w * INSTANT_SIDE,
            h * INSTANT_TOP,
            w * INSTANT_SIDE,
            h * INSTANT_BOTTOM,
        ),
        MarginPolicy::Uniform => {
            let border = w.min(h) * UNIFORM_BORDER;
            (border, border, border, border)
        }
    };
    FrameRect {
        x: left,
        y: top,
        w: (w - left - right).max(0.0),
        h: (h - top - bottom).max(0.0),
    }
}

/// Cover fit: fills the frame completely, cropping the source as needed.
pub fn cover_fit(src_w: u32, src_h: u32, frame: &FrameRect) -> Placement {
    let (sw, sh) = (src_w.max(1) as f64, src_h.max(1) as f64);
    let scale = (frame.w / sw).max(frame.h / sh);
    let w = sw * scale;
    let h = sh * scale;
    Placement {
        scale,
        x: frame.x + (frame.w - w) / 2.0,
        y: frame.y + (frame.h - h) / 2.0,
        w,
        h,
    }
}
