pub mod blur;
pub mod buffer;
pub mod cameras;
pub mod color;
pub mod decode;
pub mod encode;
pub mod error;
pub mod filters;
pub mod font;
pub mod layout;
pub mod options;
pub mod pipeline;
pub mod preview;
pub mod session;
pub mod texture;

pub use buffer::PixelBuffer;
pub use color::Rgba8;
pub use error::{PipelineError, PipelineResult};
pub use options::{DateStamp, DateStampFormat, ProcessingOptions};
pub use pipeline::FilmPipeline;
