//! Shape and stride utilities.
//!
//! Dimensions live in a `SmallVec` with inline capacity `MAX_RANK`, so a
//! tensor's metadata never touches the heap. The `-1`-padded fixed array form
//! exists only at the boundary (`from_padded` / `to_padded`).

use crate::api::error::{TensorError, TensorResult};
use crate::api::types::MAX_RANK;
use smallvec::SmallVec;
use std::fmt;

/// Internal dimension storage: stack-allocated for every legal rank.
pub(crate) type TensorShape = SmallVec<[usize; MAX_RANK]>;

/// Sentinel for unused slots in the padded shape form.
pub const SHAPE_PAD: i64 = -1;

/// The dimensions of a tensor. An empty shape is a singleton.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape(TensorShape);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(SmallVec::from_vec(dims))
    }

    pub fn from_slice(dims: &[usize]) -> Self {
        Shape(SmallVec::from_slice(dims))
    }

    /// The rank-0 shape.
    pub fn scalar() -> Self {
        Shape(SmallVec::new())
    }

    /// Build a shape from signed sizes, rejecting negative entries and ranks
    /// above `MAX_RANK`.
    pub fn from_signed(dims: &[i64]) -> TensorResult<Self> {
        if dims.len() > MAX_RANK {
            return Err(TensorError::InvalidRank {
                rank: dims.len() as i64,
                max: MAX_RANK,
            });
        }
        let mut sv = TensorShape::new();
        for (axis, &size) in dims.iter().enumerate() {
            if size < 0 {
                return Err(TensorError::InvalidDimensionSize { axis, size });
            }
            sv.push(size as usize);
        }
        Ok(Shape(sv))
    }

    /// Read a `-1`-padded shape array. The rank is the number of entries
    /// before the first `-1`; any other negative entry is an error.
    pub fn from_padded(padded: &[i64; MAX_RANK]) -> TensorResult<Self> {
        let rank = padded
            .iter()
            .position(|&d| d == SHAPE_PAD)
            .unwrap_or(MAX_RANK);
        Self::from_signed(&padded[..rank])
    }

    /// Write this shape as a `-1`-padded array.
    pub fn to_padded(&self) -> [i64; MAX_RANK] {
        let mut out = [SHAPE_PAD; MAX_RANK];
        for (slot, &d) in out.iter_mut().zip(self.0.iter()) {
            *slot = d as i64;
        }
        out
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Product of all dimensions; 1 for the rank-0 shape.
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    pub fn is_singleton(&self) -> bool {
        self.0.is_empty()
    }

    /// Row-major strides for this shape.
    pub fn strides(&self) -> SmallVec<[usize; MAX_RANK]> {
        compute_strides(&self.0)
    }

    /// Fail with `InvalidRank` if the shape has more than `MAX_RANK` axes.
    pub fn validate(&self) -> TensorResult<()> {
        if self.0.len() > MAX_RANK {
            return Err(TensorError::InvalidRank {
                rank: self.0.len() as i64,
                max: MAX_RANK,
            });
        }
        Ok(())
    }

    pub(crate) fn into_inner(self) -> TensorShape {
        self.0
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::from_slice(&dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

// ==================== Free functions ====================

/// Row-major strides. Zero-sized axes count as 1 so every stride stays
/// positive, e.g. `[2, 0, 3]` gives `[3, 3, 1]`.
pub fn compute_strides(dims: &[usize]) -> SmallVec<[usize; MAX_RANK]> {
    let mut strides: TensorShape = smallvec::smallvec![1usize; dims.len()];
    let mut acc = 1usize;
    for i in (0..dims.len()).rev() {
        strides[i] = acc;
        acc *= dims[i].max(1);
    }
    strides
}

/// Decompose a linear row-major index into per-axis coordinates.
pub fn linear_to_coords(index: usize, dims: &[usize]) -> SmallVec<[usize; MAX_RANK]> {
    let mut coords: TensorShape = smallvec::smallvec![0usize; dims.len()];
    let mut rem = index;
    for i in (0..dims.len()).rev() {
        let d = dims[i].max(1);
        coords[i] = rem % d;
        rem /= d;
    }
    coords
}

/// Dot product of coordinates with strides.
pub fn coords_to_linear(coords: &[usize], strides: &[usize]) -> usize {
    coords.iter().zip(strides.iter()).map(|(c, s)| c * s).sum()
}

/// Exact shape equality: same rank and same sizes.
pub fn shapes_equal(a: &[usize], b: &[usize]) -> bool {
    a == b
}

/// Strides as a zero-padded fixed array.
pub(crate) fn pad_strides(strides: &[usize]) -> [i64; MAX_RANK] {
    let mut out = [0i64; MAX_RANK];
    for (slot, &s) in out.iter_mut().zip(strides.iter()) {
        *slot = s as i64;
    }
    out
}
