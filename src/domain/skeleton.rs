// ============================================================
// Layer 3 — Skeleton Domain Types
// ============================================================
// A skeleton sequence is a dense block of keypoints with shape
//
//   [bodies, frames, joints, coords]
//
// stored row-major in a flat Vec<f32>. For NTU RGB+D style data
// that is typically [2, 300, 25, 3]. The first two coordinates of
// every joint are treated as pixel (x, y) when a sequence is drawn.
//
// Sample names follow the NTU convention
//   S001C002P003R002A013
// where the digits after `A` are the 1-based action class.
//
// Reference: Shahroudy et al. (2016) NTU RGB+D
//            Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

use crate::domain::error::{TrainError, TrainResult};

/// A dense keypoint block with shape [bodies, frames, joints, coords].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonSequence {
    shape:  [usize; 4],
    values: Vec<f32>,
}

impl SkeletonSequence {
    /// Wrap a flat row-major buffer. Fails if the buffer length does not
    /// match the product of the shape.
    pub fn new(shape: [usize; 4], values: Vec<f32>) -> TrainResult<Self> {
        let expected = shape.iter().product::<usize>();
        if values.len() != expected {
            return Err(TrainError::SequenceLength {
                shape,
                expected,
                found: values.len(),
            });
        }
        Ok(Self { shape, values })
    }

    pub fn shape(&self)  -> [usize; 4] { self.shape }
    pub fn bodies(&self) -> usize      { self.shape[0] }
    pub fn frames(&self) -> usize      { self.shape[1] }
    pub fn joints(&self) -> usize      { self.shape[2] }
    pub fn coords(&self) -> usize      { self.shape[3] }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// The (x, y) position of one joint, or None when out of range
    /// or when the sequence carries fewer than two coordinates.
    pub fn point(&self, body: usize, frame: usize, joint: usize) -> Option<(f32, f32)> {
        let [m, t, v, c] = self.shape;
        if body >= m || frame >= t || joint >= v || c < 2 {
            return None;
        }
        let base = ((body * t + frame) * v + joint) * c;
        Some((self.values[base], self.values[base + 1]))
    }
}

/// One labelled skeleton sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonSample {
    /// Sample identifier, usually the source file stem
    pub name: String,

    /// Zero-based action class
    pub label: usize,

    pub sequence: SkeletonSequence,
}

impl SkeletonSample {
    pub fn new(name: impl Into<String>, label: usize, sequence: SkeletonSequence) -> Self {
        Self { name: name.into(), label, sequence }
    }
}

/// Extract the zero-based action class from an NTU style sample name.
///
/// `S001C001P001R001A013` → `Some(12)`. The last `A` followed by three
/// digits wins; `A000` and names without an action tag give `None`.
pub fn parse_action_label(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    (0..bytes.len())
        .rev()
        .filter(|&i| bytes[i] == b'A' && i + 4 <= bytes.len())
        .find_map(|i| {
            let digits = &bytes[i + 1..i + 4];
            if !digits.iter().all(u8::is_ascii_digit) {
                return None;
            }
            let class = digits
                .iter()
                .fold(0usize, |acc, d| acc * 10 + usize::from(d - b'0'));
            class.checked_sub(1)
        })
}
