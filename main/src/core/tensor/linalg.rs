//! Matrix multiplication: shape inference and a naive row-major kernel.

use crate::api::error::{TensorError, TensorResult};
use crate::core::shape::{Shape, TensorShape};
use super::broadcast::{broadcast_offset, broadcast_shape};
use super::tensor::{Tensor, alloc_buffer};
use std::time::Instant;

/// Resolved geometry of a (possibly batched) matrix product.
#[derive(Debug)]
struct MatmulPlan {
    out_shape: Shape,
    /// Broadcast batch dimensions, a prefix of `out_shape`.
    batch: TensorShape,
    /// Number of leading batch axes in each operand.
    lhs_batch: usize,
    rhs_batch: usize,
    n: usize,
    l: usize,
    m: usize,
}

impl MatmulPlan {
    fn infer(a: &[usize], b: &[usize]) -> TensorResult<Self> {
        if a.is_empty() || b.is_empty() {
            return Err(TensorError::MatmulSingletonOperand);
        }
        let mismatch = || TensorError::MatmulIncompatibleShapes {
            left: a.to_vec(),
            right: b.to_vec(),
        };

        // A vector operand contributes one matrix axis, anything else two.
        let lhs_mat = if a.len() > 1 { 2 } else { 1 };
        let rhs_mat = if b.len() > 1 { 2 } else { 1 };
        let lhs_batch = a.len() - lhs_mat;
        let rhs_batch = b.len() - rhs_mat;

        let l = a[a.len() - 1];
        if l != b[rhs_batch] {
            return Err(mismatch());
        }
        let n = if lhs_mat == 2 { a[lhs_batch] } else { 1 };
        let m = if rhs_mat == 2 { b[rhs_batch + 1] } else { 1 };

        let batch = broadcast_shape(&a[..lhs_batch], &b[..rhs_batch])?.into_inner();
        let mut out: TensorShape = batch.clone();
        if lhs_mat == 2 {
            out.push(n);
        }
        if rhs_mat == 2 {
            out.push(m);
        }
        let out_shape = Shape::from_slice(&out);
        out_shape.validate()?;

        Ok(Self { out_shape, batch, lhs_batch, rhs_batch, n, l, m })
    }
}

/// `out[n×m] = a[n×l] @ b[l×m]`, all row-major and contiguous.
fn matmul_2d(a: &[f64], b: &[f64], out: &mut [f64], n: usize, l: usize, m: usize) {
    for i in 0..n {
        for j in 0..m {
            let mut sum = 0.0;
            for k in 0..l {
                sum += a[i * l + k] * b[k * m + j];
            }
            out[i * m + j] = sum;
        }
    }
}

impl Tensor {
    // ==================== Matrix multiplication ====================

    /// Allocate a zero tensor with the shape `self.matmul(other)` would
    /// produce, without computing anything.
    ///
    /// 1-D·1-D gives a singleton, 1-D·2-D gives `[m]`, 2-D·1-D gives `[n]`,
    /// 2-D·2-D gives `[n, m]`. Higher ranks treat all but the last one or
    /// two axes as batch axes, which broadcast against each other.
    pub fn initialize_for_matmul(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.ensure_live()?;
        other.ensure_live()?;
        let plan = MatmulPlan::infer(self.shape(), other.shape())?;
        Tensor::zeros(plan.out_shape)
    }

    /// Matrix product with NumPy semantics for vectors and batches.
    pub fn matmul(&self, other: &Tensor) -> TensorResult<Tensor> {
        let _t = if log::log_enabled!(log::Level::Trace) { Some(Instant::now()) } else { None };
        let lhs = self.data()?;
        let rhs = other.data()?;
        let plan = MatmulPlan::infer(self.shape(), other.shape())?;
        let MatmulPlan { n, l, m, .. } = plan;

        let batch_count: usize = plan.batch.iter().product();
        let mut out = alloc_buffer(batch_count * n * m, 0.0)?;

        // Size-0 axes keep stride 1, so batch offsets can point past an
        // empty buffer. With nothing to contract the result is all zeros.
        if batch_count == 0 || n * l == 0 || l * m == 0 || n * m == 0 {
            return Ok(Tensor::from_parts(plan.out_shape.into_inner(), out));
        }

        let lhs_dims = &self.shape()[..plan.lhs_batch];
        let lhs_strides = &self.strides()[..plan.lhs_batch];
        let rhs_dims = &other.shape()[..plan.rhs_batch];
        let rhs_strides = &other.strides()[..plan.rhs_batch];

        for bi in 0..batch_count {
            let a_off = broadcast_offset(bi, &plan.batch, lhs_dims, lhs_strides);
            let b_off = broadcast_offset(bi, &plan.batch, rhs_dims, rhs_strides);
            matmul_2d(
                &lhs[a_off..a_off + n * l],
                &rhs[b_off..b_off + l * m],
                &mut out[bi * n * m..(bi + 1) * n * m],
                n,
                l,
                m,
            );
        }

        if let Some(t) = _t {
            log::trace!("[perf] matmul {:?} @ {:?} {:.3}ms",
                self.shape(), other.shape(), t.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(Tensor::from_parts(plan.out_shape.into_inner(), out))
    }
}
