// ============================================================================
// hitclip-core/src/detection/classifier.rs
// ============================================================================
//
// REGION CLASSIFIER: Marker Template Matching
//
// Decides whether the knock/elimination marker is on screen in a frame. The
// marker is drawn around the crosshair, so only a 100x100 window at the frame
// centre is inspected.
//
// ALGORITHM:
// 1. Crop the centre window.
// 2. For each colour boundary: keep pixels inside the boundary, black out the
//    rest and the two triangles covering the crosshair diamond, reduce to
//    grayscale.
// 3. Compare against the expected marker (the reference picture run through
//    the same steps with the first boundary) by mean squared error.
// 4. The first boundary scoring below the threshold is a match.

use std::path::Path;

use image::{GrayImage, Luma, RgbImage, imageops};

use crate::config::DEFAULT_MSE_THRESHOLD;
use crate::error::{CoreError, CoreResult};

/// Side of the square window inspected at the frame centre.
pub const WINDOW_SIZE: u32 = 100;

/// Inclusive per-channel colour range, in blue/green/red order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBoundary {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorBoundary {
    const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// True when every channel of the BGR triple lies within the range.
    pub fn contains(&self, bgr: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= bgr[c] && bgr[c] <= self.upper[c])
    }
}

/// Marker colour ranges, tried in order.
pub const BOUNDARIES: [ColorBoundary; 3] = [
    ColorBoundary::new([15, 42, 191], [89, 109, 255]),
    ColorBoundary::new([15, 42, 215], [89, 109, 255]),
    ColorBoundary::new([56, 21, 209], [222, 209, 255]),
];

/// Triangles (x, y vertices) blacked out over the crosshair.
const MASKED_TRIANGLES: [[(i64, i64); 3]; 2] = [
    [(50, 100), (50, 0), (100, 50)],
    [(50, 100), (50, 0), (0, 50)],
];

/// Result of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub is_match: bool,
    /// MSE of the matching boundary, or of the last boundary tried.
    pub score: f64,
}

/// Template matcher holding the processed reference marker.
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    expected: GrayImage,
    threshold: f64,
}

impl MarkerClassifier {
    /// Loads the reference picture and prepares the expected marker.
    ///
    /// Any failure to read or decode the file, or a picture that is not
    /// 100x100, is reported as `ReferenceImageMissing`.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let reference = image::open(path)
            .map_err(|e| CoreError::ReferenceImageMissing {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_rgb8();

        if reference.dimensions() != (WINDOW_SIZE, WINDOW_SIZE) {
            return Err(CoreError::ReferenceImageMissing {
                path: path.to_path_buf(),
                reason: format!(
                    "expected a {WINDOW_SIZE}x{WINDOW_SIZE} picture, found {}x{}",
                    reference.width(),
                    reference.height()
                ),
            });
        }

        log::debug!("Loaded reference marker from {}", path.display());
        Ok(Self::from_reference(&reference))
    }

    /// Builds a classifier from an in-memory 100x100 reference picture.
    pub fn from_reference(reference: &RgbImage) -> Self {
        Self {
            expected: manipulate(reference, &BOUNDARIES[0]),
            threshold: DEFAULT_MSE_THRESHOLD,
        }
    }

    /// Overrides the MSE threshold below which a frame matches.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classifies one frame.
    pub fn classify(&self, frame: &RgbImage) -> CoreResult<Classification> {
        let window = crop_center(frame)?;

        let mut score = f64::INFINITY;
        for boundary in &BOUNDARIES {
            score = mse(&manipulate(&window, boundary), &self.expected);
            if score < self.threshold {
                return Ok(Classification {
                    is_match: true,
                    score,
                });
            }
        }
        Ok(Classification {
            is_match: false,
            score,
        })
    }
}

/// Cuts the 100x100 window at the centre of the frame.
pub fn crop_center(frame: &RgbImage) -> CoreResult<RgbImage> {
    let (width, height) = frame.dimensions();
    if width < WINDOW_SIZE || height < WINDOW_SIZE {
        return Err(CoreError::InvalidFrameSize { width, height });
    }
    let x = (width - WINDOW_SIZE) / 2;
    let y = (height - WINDOW_SIZE) / 2;
    Ok(imageops::crop_imm(frame, x, y, WINDOW_SIZE, WINDOW_SIZE).to_image())
}

/// Colour-filters, masks and reduces a window to grayscale.
pub fn manipulate(window: &RgbImage, boundary: &ColorBoundary) -> GrayImage {
    GrayImage::from_fn(window.width(), window.height(), |x, y| {
        let [r, g, b] = window.get_pixel(x, y).0;
        if !boundary.contains([b, g, r]) || in_masked_triangle(i64::from(x), i64::from(y)) {
            return Luma([0]);
        }
        Luma([luma(r, g, b)])
    })
}

/// Mean squared error between two equally sized grayscale images.
pub fn mse(a: &GrayImage, b: &GrayImage) -> f64 {
    let pixels = f64::from(a.width()) * f64::from(a.height());
    if pixels == 0.0 {
        return 0.0;
    }
    let sum: f64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&p, &q)| {
            let d = f64::from(p) - f64::from(q);
            d * d
        })
        .sum();
    sum / pixels
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.round().clamp(0.0, 255.0) as u8
}

fn in_masked_triangle(x: i64, y: i64) -> bool {
    MASKED_TRIANGLES
        .iter()
        .any(|&[a, b, c]| point_in_triangle((x, y), a, b, c))
}

/// Inclusive point-in-triangle test using edge signs.
fn point_in_triangle(p: (i64, i64), a: (i64, i64), b: (i64, i64), c: (i64, i64)) -> bool {
    fn edge(p: (i64, i64), q: (i64, i64), r: (i64, i64)) -> i64 {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    }
    let d1 = edge(a, b, p);
    let d2 = edge(b, c, p);
    let d3 = edge(c, a, p);
    let has_neg = d1 < 0 || d2 < 0 || d3 < 0;
    let has_pos = d1 > 0 || d2 > 0 || d3 > 0;
    !(has_neg && has_pos)
}
