use rayon::prelude::*;

/// Single-channel f32 plane, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl Plane {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    fn transposed(&self) -> Self {
        let (w, h) = (self.width, self.height);
        let mut out = vec![0.0f32; w * h];
        out.par_chunks_mut(h).enumerate().for_each(|(x, col)| {
            for (y, v) in col.iter_mut().enumerate() {
                *v = self.data[y * w + x];
            }
        });
        Self {
            width: h,
            height: w,
            data: out,
        }
    }
}

/// Box radius whose `passes`-fold repetition approximates a Gaussian of `sigma`.
pub fn box_radius_for_sigma(sigma: f32, passes: usize) -> usize {
    if sigma <= 0.0 || passes == 0 {
        return 0;
    }
    let width = (12.0 * sigma * sigma / passes as f32 + 1.0).sqrt();
    ((width - 1.0) / 2.0).round().max(0.0) as usize
}

/// Repeated box blur with clamp-to-edge sampling.
///
/// Three passes approximate a Gaussian closely enough for glow and
/// shadow work. Rows run in parallel; columns are handled by blurring
/// the transposed plane.
pub fn box_blur(plane: &mut Plane, radius: usize, passes: usize) {
    if radius == 0 || passes == 0 || plane.data.is_empty() {
        return;
    }
    for _ in 0..passes {
        blur_rows(plane, radius);
    }
    let mut t = plane.transposed();
    for _ in 0..passes {
        blur_rows(&mut t, radius);
    }
    *plane = t.transposed();
}

fn blur_rows(plane: &mut Plane, radius: usize) {
    let w = plane.width;
    plane.data.par_chunks_mut(w).for_each_init(
        || Vec::with_capacity(w),
        |scratch, row| blur_line(row, scratch, radius),
    );
}

/// Sliding-window mean over one line.
fn blur_line(line: &mut [f32], scratch: &mut Vec<f32>, radius: usize) {
    let n = line.len();
    if n == 0 {
        return;
    }
    scratch.clear();
    scratch.extend_from_slice(line);
    let src: &[f32] = scratch;
    let last = (n - 1) as isize;
    let r = radius as isize;
    let norm = 1.0 / (2 * radius + 1) as f32;
    let at = |i: isize| src[i.clamp(0, last) as usize];

    let mut sum: f32 = (-r..=r).map(at).sum();
    for (i, out) in line.iter_mut().enumerate() {
        *out = sum * norm;
        let i = i as isize;
        sum += at(i + r + 1) - at(i - r);
    }
}
