mod color_grade;
mod date_stamp;
mod dust;
mod grain;
mod halation;
mod light_leak;
mod resize;
mod sharpen;
mod texture;
mod vignette;

pub use color_grade::ColorGradeStage;
pub use date_stamp::{DateStampStage, imprint};
pub use dust::Dust;
pub use grain::Grain;
pub use halation::Halation;
pub use light_leak::{LIGHT_LEAK_SKIP_PROBABILITY, LightLeak};
pub use resize::{MAX_EDGE, Resize, bounded_size};
pub use sharpen::Sharpen;
pub use texture::FilterTexture;
pub use vignette::{Vignette, vignette_factor};
