//! Print compositing: a developed photo framed into a layout, with ink
//! strokes and text drawn on top, flattened for export.

pub mod annotation;
pub mod error;
pub mod export;
pub mod input;
mod raster;
pub mod shared;
pub mod surface;
pub mod text;

pub use annotation::{AnnotationSnapshot, InkPath, TextAnnotation, TextStyle};
pub use error::{SurfaceError, SurfaceResult};
pub use export::ExportFormat;
pub use input::{PointerEvent, Presentation, ToolMode};
pub use shared::SharedSurface;
pub use surface::CompositingSurface;
pub use text::FontBook;
