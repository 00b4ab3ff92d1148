//! Shape transforms and in-place fills: permute, transpose, reshape,
//! fill, randn, item.

use crate::api::error::{TensorError, TensorResult};
use crate::api::types::MAX_RANK;
use crate::core::runtime::with_rng;
use crate::core::shape::{TensorShape, compute_strides, linear_to_coords, coords_to_linear};
use super::tensor::{Storage, Tensor, alloc_buffer};
use rand::Rng;
use std::f64::consts::PI;

impl Tensor {
    // ==================== Permute ====================

    /// Reorder axes so that output axis `i` is input axis `permutation[i]`.
    ///
    /// The data is physically rearranged into a fresh row-major buffer.
    pub fn permute(&self, permutation: &[usize]) -> TensorResult<Tensor> {
        let data = self.data()?;
        let ndim = self.ndim();
        if permutation.len() != ndim {
            return Err(TensorError::InvalidAxis {
                axis: permutation.len() as i64,
                ndim,
            });
        }

        let mut seen = [false; MAX_RANK];
        for &axis in permutation {
            if axis >= ndim {
                return Err(TensorError::InvalidAxis { axis: axis as i64, ndim });
            }
            if seen[axis] {
                return Err(TensorError::DuplicateAxis { axis });
            }
            seen[axis] = true;
        }

        if self.is_singleton() {
            return Ok(self.clone());
        }

        let out_shape: TensorShape = permutation.iter().map(|&p| self.shape_sv[p]).collect();
        let out_strides = compute_strides(&out_shape);
        let mut out = alloc_buffer(data.len(), 0.0)?;
        let mut out_coords: TensorShape = smallvec::smallvec![0usize; ndim];
        for (i, &x) in data.iter().enumerate() {
            let in_coords = linear_to_coords(i, self.shape());
            for (dst, &src) in permutation.iter().enumerate() {
                out_coords[dst] = in_coords[src];
            }
            out[coords_to_linear(&out_coords, &out_strides)] = x;
        }
        Ok(Tensor::from_parts(out_shape, out))
    }

    /// Reverse all axes.
    pub fn transpose(&self) -> TensorResult<Tensor> {
        let reversed: Vec<usize> = (0..self.ndim()).rev().collect();
        self.permute(&reversed)
    }

    // ==================== Reshape ====================

    /// Change the shape in place, keeping the data.
    ///
    /// An empty `shape` turns a one-element tensor into a singleton, and a
    /// singleton given a non-empty shape gets a one-element buffer.
    pub fn reshape_inplace(&mut self, shape: &[usize]) -> TensorResult<()> {
        self.ensure_live()?;
        if shape.len() > MAX_RANK {
            return Err(TensorError::InvalidRank {
                rank: shape.len() as i64,
                max: MAX_RANK,
            });
        }
        let new_numel: usize = shape.iter().product();
        if new_numel != self.numel() {
            return Err(TensorError::ReshapeNumelMismatch {
                from: self.shape().to_vec(),
                to: shape.to_vec(),
            });
        }

        let storage = std::mem::replace(&mut self.storage, Storage::Released);
        self.storage = match (storage, shape.is_empty()) {
            (Storage::Scalar(v), false) => Storage::Owned(vec![v]),
            (Storage::Owned(buf), true) => Storage::Scalar(buf.first().copied().unwrap_or(0.0)),
            (storage, _) => storage,
        };
        self.shape_sv = TensorShape::from_slice(shape);
        self.strides = compute_strides(shape);
        Ok(())
    }

    /// Reshaped copy; `self` is untouched.
    pub fn reshape(&self, shape: &[usize]) -> TensorResult<Tensor> {
        self.ensure_live()?;
        let mut out = self.clone();
        out.reshape_inplace(shape)?;
        Ok(out)
    }

    // ==================== Fill ====================

    /// Set every element to `value`.
    pub fn fill(&mut self, value: f64) -> TensorResult<()> {
        self.data_mut()?.fill(value);
        Ok(())
    }

    /// Set every element to zero.
    pub fn zero_(&mut self) -> TensorResult<()> {
        self.fill(0.0)
    }

    /// Fill with samples from N(`mu`, `sigma`²) using the calling thread's
    /// generator (see `RuntimeConfig::seed`).
    pub fn randn_(&mut self, mu: f64, sigma: f64) -> TensorResult<()> {
        with_rng(|rng| self.randn_with(rng, mu, sigma))
    }

    /// Fill with samples from N(`mu`, `sigma`²) drawn from `rng`.
    ///
    /// Box–Muller: each pair of uniforms yields two normals. With an odd
    /// element count the second value of the last pair is discarded.
    pub fn randn_with<R: Rng>(&mut self, rng: &mut R, mu: f64, sigma: f64) -> TensorResult<()> {
        let data = self.data_mut()?;
        for chunk in data.chunks_mut(2) {
            let (a, b) = box_muller(rng, mu, sigma);
            chunk[0] = a;
            if let Some(second) = chunk.get_mut(1) {
                *second = b;
            }
        }
        Ok(())
    }

    // ==================== Item ====================

    /// The single value of a one-element tensor.
    pub fn item(&self) -> TensorResult<f64> {
        let data = self.data()?;
        if data.len() != 1 {
            return Err(TensorError::NotScalar { numel: data.len() });
        }
        Ok(data[0])
    }
}

/// One Box–Muller pair.
fn box_muller<R: Rng>(rng: &mut R, mu: f64, sigma: f64) -> (f64, f64) {
    // u1 in (0, 1] keeps ln(u1) finite.
    let u1: f64 = 1.0 - rng.r#gen::<f64>();
    let u2: f64 = rng.r#gen();
    let mag = sigma * (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;
    (mag * theta.cos() + mu, mag * theta.sin() + mu)
}
