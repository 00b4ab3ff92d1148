//! Broadcasting: shape reconciliation, index translation, broadcast_to and
//! its reverse, unbroadcast.

use crate::api::error::{TensorError, TensorResult};
use crate::api::types::ReduceOp;
use crate::core::shape::{Shape, TensorShape};
use super::tensor::{Tensor, alloc_buffer};
use std::time::Instant;

/// Broadcast two shapes together (right-aligned, NumPy rules).
///
/// Aligned sizes must be equal or one of them must be 1. The result has the
/// larger rank.
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> TensorResult<Shape> {
    let ndim = a.len().max(b.len());
    let mut out: TensorShape = smallvec::smallvec![0usize; ndim];
    for i in 0..ndim {
        let da = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let db = if i < b.len() { b[b.len() - 1 - i] } else { 1 };
        out[ndim - 1 - i] = if da == db || db == 1 {
            da
        } else if da == 1 {
            db
        } else {
            return Err(TensorError::IncompatibleBroadcastShapes {
                shape1: a.to_vec(),
                shape2: b.to_vec(),
            });
        };
    }
    Ok(Shape::from_slice(&out))
}

/// Whether `source` can be broadcast to exactly `target` without changing
/// `target`.
pub fn can_broadcast(source: &[usize], target: &[usize]) -> bool {
    if source.len() > target.len() {
        return false;
    }
    let offset = target.len() - source.len();
    source
        .iter()
        .enumerate()
        .all(|(i, &s)| s == 1 || s == target[offset + i])
}

/// Offset into an operand for a linear index over `out_dims`.
///
/// The operand is right-aligned against `out_dims`; only axes where the
/// operand's size is greater than 1 contribute `coord * stride`.
pub(crate) fn broadcast_offset(
    index: usize,
    out_dims: &[usize],
    dims: &[usize],
    strides: &[usize],
) -> usize {
    let lead = out_dims.len() - dims.len();
    let mut rem = index;
    let mut offset = 0usize;
    for i in (0..out_dims.len()).rev() {
        let size = out_dims[i].max(1);
        let coord = rem % size;
        rem /= size;
        if i >= lead {
            let j = i - lead;
            if dims[j] > 1 {
                offset += coord * strides[j];
            }
        }
    }
    offset
}

/// Map a linear index in the broadcast result of `a` and `b` back to the
/// linear index of each operand.
pub fn translate_broadcast_index(
    a: &Tensor,
    b: &Tensor,
    broadcast: &[usize],
    index: usize,
) -> (usize, usize) {
    (
        broadcast_offset(index, broadcast, a.shape(), a.strides()),
        broadcast_offset(index, broadcast, b.shape(), b.strides()),
    )
}

impl Tensor {
    // ==================== Broadcast ====================

    /// Materialize this tensor broadcast to `target`.
    ///
    /// The result owns a fresh buffer; there is no zero-copy broadcast view.
    pub fn broadcast_to(&self, target: &[usize]) -> TensorResult<Tensor> {
        let data = self.data()?;
        if !can_broadcast(self.shape(), target) {
            return Err(TensorError::IncompatibleBroadcastShapes {
                shape1: self.shape().to_vec(),
                shape2: target.to_vec(),
            });
        }
        let target_shape = Shape::from_slice(target);
        target_shape.validate()?;
        let numel = target_shape.numel();
        let mut out = alloc_buffer(numel, 0.0)?;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = data[broadcast_offset(i, target, self.shape(), self.strides())];
        }
        Ok(Tensor::from_parts(target_shape.into_inner(), out))
    }

    /// Sum this tensor down to `target`, the shape it was broadcast from.
    ///
    /// Two passes: leading axes that `target` lacks are summed away, then
    /// every axis where `target` has size 1 is summed with `keepdim`.
    pub fn unbroadcast(&self, target: &[usize]) -> TensorResult<Tensor> {
        let _t = if log::log_enabled!(log::Level::Trace) { Some(Instant::now()) } else { None };
        self.ensure_live()?;
        if !can_broadcast(target, self.shape()) {
            return Err(TensorError::IncompatibleBroadcastShapes {
                shape1: self.shape().to_vec(),
                shape2: target.to_vec(),
            });
        }

        let mut out = self.clone();
        if out.shape() == target {
            return Ok(out);
        }

        if out.ndim() > target.len() {
            let lead: Vec<usize> = (0..out.ndim() - target.len()).collect();
            out = out.aggregate(&lead, false, ReduceOp::Sum)?;
        }

        let ones: Vec<usize> = target
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 1)
            .map(|(i, _)| i)
            .collect();
        if !ones.is_empty() {
            out = out.aggregate(&ones, true, ReduceOp::Sum)?;
        }

        if let Some(t) = _t {
            log::trace!("[perf] unbroadcast {:?} -> {:?} {:.3}ms",
                self.shape(), target, t.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(out)
    }
}
