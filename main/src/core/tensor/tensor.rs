//! Dense f64 tensor with an inline singleton representation.

use crate::api::error::{TensorError, TensorResult};
use crate::api::types::MAX_RANK;
use crate::core::runtime::{DISPLAY_PRECISION, DISPLAY_THRESHOLD};
use crate::core::shape::{Shape, TensorShape, compute_strides, pad_strides};
use std::fmt;
use std::sync::atomic::Ordering;

/// Underlying storage for tensor data.
///
/// A rank-0 tensor keeps its value inline and never owns a heap buffer.
#[derive(Clone, PartialEq)]
pub enum Storage {
    Scalar(f64),
    Owned(Vec<f64>),
    /// Left behind by `Tensor::deallocate`.
    Released,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Scalar(v) => write!(f, "Scalar({})", v),
            Storage::Owned(v) => write!(f, "Owned({} elements)", v.len()),
            Storage::Released => write!(f, "Released"),
        }
    }
}

/// Allocate a buffer of `numel` copies of `value`, reporting allocator
/// failure instead of aborting.
pub(crate) fn alloc_buffer(numel: usize, value: f64) -> TensorResult<Vec<f64>> {
    let mut data = Vec::new();
    data.try_reserve_exact(numel)
        .map_err(|_| TensorError::AllocationFailure { numel })?;
    data.resize(numel, value);
    Ok(data)
}

pub(crate) fn released_error() -> TensorError {
    TensorError::NullInput("tensor has been deallocated".into())
}

/// A dense, row-major, N-dimensional array of `f64`.
///
/// Cloning copies the buffer; tensors never share storage.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    pub(crate) storage: Storage,
    pub(crate) shape_sv: TensorShape,
    pub(crate) strides: TensorShape,
}

impl Tensor {
    // ==================== Constructors ====================

    /// Allocate a zero-filled tensor from signed sizes.
    ///
    /// Fails with `InvalidRank` above `MAX_RANK` axes and with
    /// `InvalidDimensionSize` on a negative size. An empty slice gives a
    /// singleton holding 0.
    pub fn init(shape: &[i64]) -> TensorResult<Self> {
        Self::zeros(Shape::from_signed(shape)?)
    }

    /// Allocate a zero-filled tensor from a `-1`-padded shape array.
    pub fn from_padded(padded: &[i64; MAX_RANK]) -> TensorResult<Self> {
        Self::zeros(Shape::from_padded(padded)?)
    }

    /// Create a tensor from a vector with the given shape.
    pub fn from_vec(data: Vec<f64>, shape: impl Into<Shape>) -> TensorResult<Self> {
        let shape = shape.into();
        shape.validate()?;
        if data.len() != shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: shape.dims().to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Self::from_parts(shape.into_inner(), data))
    }

    /// Create a singleton tensor.
    pub fn scalar(value: f64) -> Self {
        Self {
            storage: Storage::Scalar(value),
            shape_sv: TensorShape::new(),
            strides: TensorShape::new(),
        }
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: impl Into<Shape>) -> TensorResult<Self> {
        Self::full(shape, 0.0)
    }

    /// Create a tensor filled with ones.
    pub fn ones(shape: impl Into<Shape>) -> TensorResult<Self> {
        Self::full(shape, 1.0)
    }

    /// Create a tensor filled with a specific value.
    pub fn full(shape: impl Into<Shape>, value: f64) -> TensorResult<Self> {
        let shape = shape.into();
        shape.validate()?;
        if shape.is_singleton() {
            return Ok(Self::scalar(value));
        }
        let data = alloc_buffer(shape.numel(), value)?;
        Ok(Self::from_parts(shape.into_inner(), data))
    }

    /// Fresh zero-filled tensor with the same shape and strides.
    pub fn create_like(&self) -> TensorResult<Self> {
        self.ensure_live()?;
        Self::full(self.shape(), 0.0)
    }

    /// Build from an already-sized buffer. `data.len()` must equal the
    /// element count of `shape` (one value for a singleton).
    pub(crate) fn from_parts(shape: TensorShape, data: Vec<f64>) -> Self {
        if shape.is_empty() {
            let value = data.first().copied().unwrap_or(0.0);
            return Self::scalar(value);
        }
        let strides = compute_strides(&shape);
        Self {
            storage: Storage::Owned(data),
            shape_sv: shape,
            strides,
        }
    }

    // ==================== Lifecycle ====================

    /// Release the buffer and reset shape and strides.
    ///
    /// Idempotent. Any later operation on this tensor fails with
    /// `NullInput`.
    pub fn deallocate(&mut self) {
        if matches!(self.storage, Storage::Released) {
            return;
        }
        log::trace!("[tensor] deallocate shape={:?}", self.shape_sv.as_slice());
        self.storage = Storage::Released;
        self.shape_sv.clear();
        self.strides.clear();
    }

    pub fn is_released(&self) -> bool {
        matches!(self.storage, Storage::Released)
    }

    pub(crate) fn ensure_live(&self) -> TensorResult<()> {
        if self.is_released() {
            return Err(released_error());
        }
        Ok(())
    }

    // ==================== Properties ====================

    /// Get the shape as a slice.
    pub fn shape(&self) -> &[usize] {
        &self.shape_sv
    }

    /// Get the strides as a slice.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Get the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape_sv.len()
    }

    /// Get the total number of elements. A singleton has one; a released
    /// tensor has none.
    pub fn numel(&self) -> usize {
        match self.storage {
            Storage::Released => 0,
            _ => self.shape_sv.iter().product(),
        }
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self.storage, Storage::Scalar(_))
    }

    /// Shape as a `-1`-padded array.
    pub fn padded_shape(&self) -> [i64; MAX_RANK] {
        Shape::from_slice(&self.shape_sv).to_padded()
    }

    /// Strides as a `0`-padded array.
    pub fn padded_strides(&self) -> [i64; MAX_RANK] {
        pad_strides(&self.strides)
    }

    /// Get the underlying data as a slice. A singleton yields its one value.
    pub fn data(&self) -> TensorResult<&[f64]> {
        match &self.storage {
            Storage::Scalar(v) => Ok(std::slice::from_ref(v)),
            Storage::Owned(v) => Ok(v.as_slice()),
            Storage::Released => Err(released_error()),
        }
    }

    pub(crate) fn data_mut(&mut self) -> TensorResult<&mut [f64]> {
        match &mut self.storage {
            Storage::Scalar(v) => Ok(std::slice::from_mut(v)),
            Storage::Owned(v) => Ok(v.as_mut_slice()),
            Storage::Released => Err(released_error()),
        }
    }

    /// Copy the data out in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data().map(|d| d.to_vec()).unwrap_or_default()
    }

    /// Read one element by full coordinates.
    pub fn get_at(&self, coords: &[usize]) -> TensorResult<f64> {
        let data = self.data()?;
        if coords.len() != self.ndim() {
            return Err(TensorError::InvalidRank {
                rank: coords.len() as i64,
                max: self.ndim(),
            });
        }
        let mut offset = 0usize;
        for (dim, &idx) in coords.iter().enumerate() {
            if idx >= self.shape_sv[dim] {
                return Err(TensorError::IndexOutOfBounds {
                    dim,
                    index: idx as i64,
                    size: self.shape_sv[dim],
                });
            }
            offset += idx * self.strides[dim];
        }
        Ok(data[offset])
    }

    // ==================== Internal helpers ====================

    fn fmt_axis(
        &self,
        f: &mut fmt::Formatter<'_>,
        data: &[f64],
        dim: usize,
        offset: usize,
        precision: usize,
    ) -> fmt::Result {
        write!(f, "[")?;
        let size = self.shape_sv[dim];
        if dim + 1 == self.ndim() {
            for i in 0..size {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{:.*}", precision, data[offset + i])?;
            }
        } else {
            for i in 0..size {
                if i > 0 {
                    write!(f, ",\n{:width$}", "", width = 8 + dim)?;
                }
                self.fmt_axis(f, data, dim + 1, offset + i * self.strides[dim], precision)?;
            }
        }
        write!(f, "]")
    }
}

// ==================== Display ====================

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tensor(ndim={}, numel={}, shape={:?}, strides={:?}, storage={:?})",
            self.ndim(),
            self.numel(),
            self.shape_sv.as_slice(),
            self.strides.as_slice(),
            self.storage
        )
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = DISPLAY_PRECISION.load(Ordering::Relaxed);
        let threshold = DISPLAY_THRESHOLD.load(Ordering::Relaxed);
        match &self.storage {
            Storage::Released => write!(f, "Tensor(<released>)"),
            Storage::Scalar(v) => write!(f, "Tensor({:.*})", precision, v),
            Storage::Owned(data) if data.is_empty() => {
                write!(f, "Tensor([], shape={})", Shape::from_slice(&self.shape_sv))
            }
            Storage::Owned(data) if data.len() > threshold && data.len() >= 4 => {
                let n = data.len();
                write!(
                    f,
                    "Tensor(shape={}, [{:.p$}, {:.p$}, ..., {:.p$}, {:.p$}])",
                    Shape::from_slice(&self.shape_sv),
                    data[0],
                    data[1],
                    data[n - 2],
                    data[n - 1],
                    p = precision,
                )
            }
            Storage::Owned(data) => {
                write!(f, "Tensor(")?;
                self.fmt_axis(f, data, 0, 0, precision)?;
                write!(f, ")")
            }
        }
    }
}

// ==================== Tests ====================
