//! Reductions over one or more axes.

use crate::api::error::{TensorError, TensorResult};
use crate::api::types::{MAX_RANK, ReduceOp};
use crate::core::shape::{TensorShape, compute_strides};
use super::tensor::{Tensor, alloc_buffer};
use std::time::Instant;

impl Tensor {
    // ==================== Aggregate ====================

    /// Reduce over `axes` with `op`.
    ///
    /// Reduced axes collapse to size 1 and are dropped unless `keepdim`.
    /// An empty `axes` reduces nothing. `max` replaces on `>=` so the last
    /// of several equal maxima wins; `min` replaces on `<` so the first
    /// wins. With exactly one reduced axis, `argmax`/`argmin` report the
    /// position along that axis; otherwise they report the flat input index.
    pub fn aggregate(&self, axes: &[usize], keepdim: bool, op: ReduceOp) -> TensorResult<Tensor> {
        let _t = if log::log_enabled!(log::Level::Trace) { Some(Instant::now()) } else { None };
        let data = self.data()?;
        let ndim = self.ndim();

        let mut reduced = [false; MAX_RANK];
        for &axis in axes {
            if axis >= ndim {
                return Err(TensorError::InvalidAxis { axis: axis as i64, ndim });
            }
            if reduced[axis] {
                return Err(TensorError::DuplicateAxis { axis });
            }
            reduced[axis] = true;
        }

        if self.is_singleton() {
            return Ok(if op.is_arg() { Tensor::scalar(0.0) } else { self.clone() });
        }

        let in_dims = self.shape();
        let kept_shape: TensorShape = in_dims
            .iter()
            .enumerate()
            .map(|(d, &size)| if reduced[d] { 1 } else { size })
            .collect();
        let out_strides = compute_strides(&kept_shape);
        let out_numel: usize = kept_shape.iter().product();

        let mut acc = alloc_buffer(out_numel, op.seed())?;
        let mut arg = if op.is_arg() { alloc_buffer(out_numel, 0.0)? } else { Vec::new() };
        let single_axis = if axes.len() == 1 { Some(axes[0]) } else { None };

        for (i, &x) in data.iter().enumerate() {
            let mut rem = i;
            let mut out_index = 0usize;
            let mut axis_coord = 0usize;
            for d in (0..ndim).rev() {
                let coord = rem % in_dims[d];
                rem /= in_dims[d];
                if reduced[d] {
                    if single_axis == Some(d) {
                        axis_coord = coord;
                    }
                } else {
                    out_index += coord * out_strides[d];
                }
            }

            let slot = &mut acc[out_index];
            match op {
                ReduceOp::Sum | ReduceOp::Mean => *slot += x,
                ReduceOp::Max => {
                    if x >= *slot {
                        *slot = x;
                    }
                }
                ReduceOp::Min => {
                    if x < *slot {
                        *slot = x;
                    }
                }
                ReduceOp::ArgMax | ReduceOp::ArgMin => {
                    let better = if op == ReduceOp::ArgMax { x >= *slot } else { x < *slot };
                    if better {
                        *slot = x;
                        let position = if single_axis.is_some() { axis_coord } else { i };
                        arg[out_index] = position as f64;
                    }
                }
            }
        }

        if op == ReduceOp::Mean {
            let count = (self.numel() / out_numel.max(1)) as f64;
            for v in acc.iter_mut() {
                *v /= count;
            }
        }

        let values = if op.is_arg() { arg } else { acc };
        let mut out = Tensor::from_parts(kept_shape, values);

        if !keepdim {
            let dropped: Vec<usize> = in_dims
                .iter()
                .enumerate()
                .filter(|&(d, _)| !reduced[d])
                .map(|(_, &size)| size)
                .collect();
            out.reshape_inplace(&dropped)?;
        }

        if let Some(t) = _t {
            log::trace!("[perf] aggregate {} {:?} axes={:?} {:.3}ms",
                op, in_dims, axes, t.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(out)
    }

    // ==================== Conveniences ====================

    /// Reduce over `axes`, or over every axis when `None`.
    fn reduce_with(&self, axes: Option<&[usize]>, keepdim: bool, op: ReduceOp) -> TensorResult<Tensor> {
        match axes {
            Some(axes) => self.aggregate(axes, keepdim, op),
            None => {
                let all: Vec<usize> = (0..self.ndim()).collect();
                self.aggregate(&all, keepdim, op)
            }
        }
    }

    /// Sum over `axes`, or over every axis when `None`.
    pub fn sum(&self, axes: Option<&[usize]>, keepdim: bool) -> TensorResult<Tensor> {
        self.reduce_with(axes, keepdim, ReduceOp::Sum)
    }

    pub fn mean(&self, axes: Option<&[usize]>, keepdim: bool) -> TensorResult<Tensor> {
        self.reduce_with(axes, keepdim, ReduceOp::Mean)
    }

    /// Maximum over a single axis, or over every axis when `None`.
    pub fn max(&self, axis: Option<usize>, keepdim: bool) -> TensorResult<Tensor> {
        self.reduce_with(axis.as_ref().map(std::slice::from_ref), keepdim, ReduceOp::Max)
    }

    pub fn min(&self, axis: Option<usize>, keepdim: bool) -> TensorResult<Tensor> {
        self.reduce_with(axis.as_ref().map(std::slice::from_ref), keepdim, ReduceOp::Min)
    }

    pub fn argmax(&self, axis: Option<usize>, keepdim: bool) -> TensorResult<Tensor> {
        self.reduce_with(axis.as_ref().map(std::slice::from_ref), keepdim, ReduceOp::ArgMax)
    }

    pub fn argmin(&self, axis: Option<usize>, keepdim: bool) -> TensorResult<Tensor> {
        self.reduce_with(axis.as_ref().map(std::slice::from_ref), keepdim, ReduceOp::ArgMin)
    }

    /// Sum of every element as a plain value.
    pub fn sum_all(&self) -> TensorResult<f64> {
        Ok(self.data()?.iter().sum())
    }
}
