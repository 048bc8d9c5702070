use serde::Serialize;

use crate::color::ColorMatrix;

// ── Types ──────────────────────────────────────────────────────────

/// One CSS-style filter function.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "kebab-case")]
pub enum GradeOp {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    /// Degrees.
    HueRotate(f32),
    Sepia(f32),
    Grayscale(f32),
}

impl GradeOp {
    pub fn is_neutral(self) -> bool {
        match self {
            GradeOp::Brightness(v) | GradeOp::Contrast(v) | GradeOp::Saturate(v) => v == 1.0,
            GradeOp::HueRotate(v) | GradeOp::Sepia(v) | GradeOp::Grayscale(v) => v == 0.0,
        }
    }

    pub fn matrix(self) -> ColorMatrix {
        match self {
            GradeOp::Brightness(v) => ColorMatrix::brightness(v),
            GradeOp::Contrast(v) => ColorMatrix::contrast(v),
            GradeOp::Saturate(v) => ColorMatrix::saturate(v),
            GradeOp::HueRotate(deg) => ColorMatrix::hue_rotate(deg),
            GradeOp::Sepia(v) => ColorMatrix::sepia(v),
            GradeOp::Grayscale(v) => ColorMatrix::grayscale(v),
        }
    }
}

/// A filter's color grade: filter functions applied left to right, folded
/// into one matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColorGrade {
    pub ops: &'static [GradeOp],
}

impl ColorGrade {
    pub const IDENTITY: Self = Self { ops: &[] };

    pub const fn new(ops: &'static [GradeOp]) -> Self {
        Self { ops }
    }

    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| op.is_neutral())
    }

    pub fn matrix(&self) -> ColorMatrix {
        self.ops
            .iter()
            .fold(ColorMatrix::IDENTITY, |m, op| m.then(op.matrix()))
    }
}

impl Default for ColorGrade {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Gradient center as a fraction of (width, height).
    pub fn anchor(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (0.2, 0.2),
            Corner::TopRight => (0.8, 0.2),
            Corner::BottomLeft => (0.2, 0.8),
            Corner::BottomRight => (0.8, 0.8),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CornerLeak {
    pub corner: Corner,
    pub intensity: f32,
}

/// What the filter adds on top of its color grade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TextureKind {
    None,
    Grain { amount: f32 },
    GrainAndLeak { amount: f32, leak: CornerLeak },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Warm,
    Cool,
    Vibrant,
    Vintage,
    Retro,
    Moody,
    Bw,
    Modern,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Warm => "Warm & Soft",
            Category::Cool => "Cool & Clean",
            Category::Vibrant => "Vibrant & Colorful",
            Category::Vintage => "Vintage",
            Category::Retro => "Retro",
            Category::Moody => "Moody & Dramatic",
            Category::Bw => "Black & White",
            Category::Modern => "Modern & Clean",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilterDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub categories: &'static [Category],
    pub grade: ColorGrade,
    pub texture: TextureKind,
}

impl FilterDescriptor {
    pub fn is_none(&self) -> bool {
        self.id == NONE_ID
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Whether the dust stage may run for this filter.
    pub fn takes_dust(&self) -> bool {
        self.has_category(Category::Vintage) || self.has_category(Category::Retro)
    }
}

// ── Catalog ────────────────────────────────────────────────────────

pub const NONE_ID: &str = "none";

const fn grain(amount: f32) -> TextureKind {
    TextureKind::Grain { amount }
}

const fn grain_leak(amount: f32, corner: Corner, intensity: f32) -> TextureKind {
    TextureKind::GrainAndLeak {
        amount,
        leak: CornerLeak { corner, intensity },
    }
}

use Category::*;
use GradeOp::*;

static FILTERS: [FilterDescriptor; 24] = [
    FilterDescriptor {
        id: NONE_ID,
        name: "Original",
        categories: &[],
        grade: ColorGrade::IDENTITY,
        texture: TextureKind::None,
    },
    FilterDescriptor {
        id: "kodak-portra",
        name: "Portra 400",
        categories: &[Warm],
        grade: ColorGrade { ops: &[Brightness(1.05), Contrast(0.9), Saturate(1.15), Sepia(0.1)] },
        texture: grain(0.2),
    },
    FilterDescriptor {
        id: "kodak-gold",
        name: "Gold 200",
        categories: &[Warm],
        grade: ColorGrade {
            ops: &[
                Contrast(1.1),
                Saturate(1.3),
                Brightness(1.05),
                Sepia(0.2),
                HueRotate(-5.0),
            ],
        },
        texture: grain(0.25),
    },
    FilterDescriptor {
        id: "soft-warm",
        name: "Soft Warm",
        categories: &[Warm],
        grade: ColorGrade { ops: &[Brightness(1.08), Contrast(0.85), Saturate(1.1), Sepia(0.15)] },
        texture: grain(0.15),
    },
    FilterDescriptor {
        id: "golden-hour",
        name: "Golden Hour",
        categories: &[Warm],
        grade: ColorGrade { ops: &[Brightness(1.1), Contrast(0.92), Saturate(1.2), Sepia(0.2)] },
        texture: grain_leak(0.18, Corner::TopRight, 0.2),
    },
    FilterDescriptor {
        id: "fuji-pro",
        name: "Fuji Pro 400H",
        categories: &[Cool],
        grade: ColorGrade {
            ops: &[
                Brightness(1.05),
                Contrast(1.0),
                Saturate(1.1),
                HueRotate(-5.0),
            ],
        },
        texture: grain(0.15),
    },
    FilterDescriptor {
        id: "fuji-superia",
        name: "Superia 400",
        categories: &[Cool],
        grade: ColorGrade {
            ops: &[
                Brightness(1.02),
                Contrast(1.1),
                Saturate(1.2),
                HueRotate(-5.0),
            ],
        },
        texture: grain(0.25),
    },
    FilterDescriptor {
        id: "agfa-vista",
        name: "Agfa Vista",
        categories: &[Cool],
        grade: ColorGrade { ops: &[Contrast(1.2), Saturate(1.4), Brightness(1.02), Sepia(0.1)] },
        texture: grain(0.2),
    },
    FilterDescriptor {
        id: "cool-mood",
        name: "Cool Mood",
        categories: &[Cool],
        grade: ColorGrade {
            ops: &[
                Brightness(1.03),
                Contrast(1.12),
                Saturate(1.15),
                HueRotate(-10.0),
            ],
        },
        texture: grain(0.22),
    },
    FilterDescriptor {
        id: "arctic-blue",
        name: "Arctic Blue",
        categories: &[Cool],
        grade: ColorGrade {
            ops: &[
                Brightness(1.06),
                Contrast(1.08),
                Saturate(1.18),
                HueRotate(-15.0),
            ],
        },
        texture: grain(0.2),
    },
    FilterDescriptor {
        id: "cinestill-800",
        name: "Cinestill 800T",
        categories: &[Vibrant],
        grade: ColorGrade { ops: &[Brightness(1.1), Contrast(1.15), Saturate(1.25), Sepia(0.15)] },
        texture: grain_leak(0.3, Corner::TopRight, 0.3),
    },
    FilterDescriptor {
        id: "lomo-purple",
        name: "Lomo Purple",
        categories: &[Vibrant],
        grade: ColorGrade { ops: &[HueRotate(60.0), Contrast(1.2), Saturate(1.2)] },
        texture: grain_leak(0.3, Corner::BottomLeft, 0.1),
    },
    FilterDescriptor {
        id: "vibrant-pop",
        name: "Vibrant Pop",
        categories: &[Vibrant],
        grade: ColorGrade { ops: &[Brightness(1.08), Contrast(1.18), Saturate(1.35)] },
        texture: grain(0.25),
    },
    FilterDescriptor {
        id: "pastel-dream",
        name: "Pastel Dream",
        categories: &[Vibrant],
        grade: ColorGrade { ops: &[Brightness(1.12), Contrast(0.8), Saturate(1.25)] },
        texture: grain(0.2),
    },
    FilterDescriptor {
        id: "vintage-70s",
        name: "70s Vintage",
        categories: &[Vintage],
        grade: ColorGrade { ops: &[Brightness(1.08), Contrast(0.85), Saturate(1.3), Sepia(0.2)] },
        texture: grain_leak(0.4, Corner::TopLeft, 0.25),
    },
    FilterDescriptor {
        id: "retro-fade",
        name: "Retro Fade",
        categories: &[Vintage, Retro],
        grade: ColorGrade { ops: &[Brightness(1.1), Contrast(0.8), Saturate(1.2), Sepia(0.15)] },
        texture: grain(0.35),
    },
    FilterDescriptor {
        id: "film-nostalgia",
        name: "Film Nostalgia",
        categories: &[Vintage],
        grade: ColorGrade { ops: &[Brightness(1.06), Contrast(0.88), Saturate(1.28), Sepia(0.18)] },
        texture: grain_leak(0.38, Corner::BottomRight, 0.2),
    },
    FilterDescriptor {
        id: "moody-dark",
        name: "Moody Dark",
        categories: &[Moody],
        grade: ColorGrade { ops: &[Brightness(0.85), Contrast(1.25), Saturate(1.15)] },
        texture: grain(0.3),
    },
    FilterDescriptor {
        id: "cinematic",
        name: "Cinematic",
        categories: &[Moody],
        grade: ColorGrade { ops: &[Brightness(0.9), Contrast(1.2), Saturate(1.2)] },
        texture: grain(0.25),
    },
    FilterDescriptor {
        id: "dramatic-bw",
        name: "Dramatic B&W",
        categories: &[Moody, Bw],
        grade: ColorGrade { ops: &[Brightness(0.92), Contrast(1.3), Grayscale(1.0)] },
        texture: grain(0.32),
    },
    FilterDescriptor {
        id: "ilford-bw",
        name: "Ilford HP5",
        categories: &[Bw],
        grade: ColorGrade { ops: &[Contrast(1.2), Grayscale(1.0)] },
        texture: grain(0.35),
    },
    FilterDescriptor {
        id: "classic-bw",
        name: "Classic B&W",
        categories: &[Bw],
        grade: ColorGrade { ops: &[Contrast(1.15), Grayscale(1.0), Brightness(1.02)] },
        texture: grain(0.28),
    },
    FilterDescriptor {
        id: "clean-modern",
        name: "Clean Modern",
        categories: &[Modern],
        grade: ColorGrade { ops: &[Brightness(1.04), Contrast(1.1), Saturate(1.08)] },
        texture: grain(0.12),
    },
    FilterDescriptor {
        id: "soft-matte",
        name: "Soft Matte",
        categories: &[Modern],
        grade: ColorGrade { ops: &[Brightness(1.06), Contrast(0.88), Saturate(1.05)] },
        texture: grain(0.15),
    },
];

/// Every filter, `none` first.
pub fn all() -> &'static [FilterDescriptor] {
    &FILTERS
}

/// Looks up a filter by id. Unknown ids resolve to `none`.
pub fn lookup(id: &str) -> &'static FilterDescriptor {
    FILTERS
        .iter()
        .find(|f| f.id == id)
        .unwrap_or(&FILTERS[0])
}

/// Whether `id` names a catalog entry (as opposed to falling back to `none`).
pub fn exists(id: &str) -> bool {
    FILTERS.iter().any(|f| f.id == id)
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static FilterDescriptor> {
    FILTERS.iter().filter(move |f| f.has_category(category))
}
