use crate::filters::{self, FilterDescriptor, GradeOp};

/// CSS `filter` string approximating a filter's color grade, for live
/// preview before a still is developed. Terms keep the filter's own
/// order, neutral ones are omitted and `none` yields an empty string.
pub fn css_filter(filter: &FilterDescriptor) -> String {
    filter
        .grade
        .ops
        .iter()
        .filter(|op| !op.is_neutral())
        .map(|op| match *op {
            GradeOp::Brightness(v) => format!("brightness({v})"),
            GradeOp::Contrast(v) => format!("contrast({v})"),
            GradeOp::Saturate(v) => format!("saturate({v})"),
            GradeOp::HueRotate(deg) => format!("hue-rotate({deg}deg)"),
            GradeOp::Sepia(v) => format!("sepia({v})"),
            GradeOp::Grayscale(v) => format!("grayscale({}%)", v * 100.0),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn css_filter_for(id: &str) -> String {
    css_filter(filters::lookup(id))
}
