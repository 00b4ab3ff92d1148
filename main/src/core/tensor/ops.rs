//! Element-wise binary and unary operations.

use crate::api::error::TensorResult;
use crate::api::types::{BinaryOp, UnaryOp};
use super::broadcast::{broadcast_offset, broadcast_shape};
use super::tensor::{Tensor, alloc_buffer};

impl Tensor {
    // ==================== Binary dispatch ====================

    /// Apply `op` element-wise with broadcasting.
    ///
    /// A singleton on either side takes the scalar path. Equal shapes skip
    /// index translation entirely.
    pub fn binary(&self, other: &Tensor, op: BinaryOp) -> TensorResult<Tensor> {
        let lhs = self.data()?;
        let rhs = other.data()?;

        if self.is_singleton() {
            return other.scalar_binary(lhs[0], op);
        }
        if other.is_singleton() {
            return self.binary_scalar(rhs[0], op);
        }

        if self.shape() == other.shape() {
            let out: Vec<f64> = lhs.iter().zip(rhs.iter()).map(|(&a, &b)| op.apply(a, b)).collect();
            return Ok(Tensor::from_parts(self.shape_sv.clone(), out));
        }

        let out_shape = broadcast_shape(self.shape(), other.shape())?;
        out_shape.validate()?;
        let dims = out_shape.dims();
        let mut out = alloc_buffer(out_shape.numel(), 0.0)?;
        for (i, slot) in out.iter_mut().enumerate() {
            let ia = broadcast_offset(i, dims, self.shape(), self.strides());
            let ib = broadcast_offset(i, dims, other.shape(), other.strides());
            *slot = op.apply(lhs[ia], rhs[ib]);
        }
        Ok(Tensor::from_parts(out_shape.into_inner(), out))
    }

    /// `self op scalar`, element-wise.
    pub fn binary_scalar(&self, scalar: f64, op: BinaryOp) -> TensorResult<Tensor> {
        self.map(|x| op.apply(x, scalar))
    }

    /// `scalar op self`, element-wise.
    pub fn scalar_binary(&self, scalar: f64, op: BinaryOp) -> TensorResult<Tensor> {
        self.map(|x| op.apply(scalar, x))
    }

    /// Element-wise addition with broadcasting.
    pub fn add(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Add)
    }

    /// Element-wise subtraction with broadcasting.
    pub fn sub(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Sub)
    }

    /// Element-wise multiplication with broadcasting.
    pub fn mul(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Mul)
    }

    /// Element-wise division with broadcasting.
    pub fn div(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::TrueDiv)
    }

    /// Element-wise `floor(a / b)`.
    pub fn floor_div(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::FloorDiv)
    }

    pub fn pow(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Pow)
    }

    // ==================== Comparisons ====================

    pub fn equal(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Eq)
    }

    pub fn not_equal(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Neq)
    }

    pub fn less(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Lt)
    }

    pub fn less_equal(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Leq)
    }

    pub fn greater(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Gt)
    }

    pub fn greater_equal(&self, other: &Tensor) -> TensorResult<Tensor> {
        self.binary(other, BinaryOp::Geq)
    }

    // ==================== Scalar ops ====================

    pub fn add_scalar(&self, scalar: f64) -> TensorResult<Tensor> {
        self.binary_scalar(scalar, BinaryOp::Add)
    }

    pub fn sub_scalar(&self, scalar: f64) -> TensorResult<Tensor> {
        self.binary_scalar(scalar, BinaryOp::Sub)
    }

    /// `scalar - self`.
    pub fn rsub_scalar(&self, scalar: f64) -> TensorResult<Tensor> {
        self.scalar_binary(scalar, BinaryOp::Sub)
    }

    pub fn mul_scalar(&self, scalar: f64) -> TensorResult<Tensor> {
        self.binary_scalar(scalar, BinaryOp::Mul)
    }

    pub fn div_scalar(&self, scalar: f64) -> TensorResult<Tensor> {
        self.binary_scalar(scalar, BinaryOp::TrueDiv)
    }

    /// `scalar / self`.
    pub fn rdiv_scalar(&self, scalar: f64) -> TensorResult<Tensor> {
        self.scalar_binary(scalar, BinaryOp::TrueDiv)
    }

    pub fn pow_scalar(&self, exponent: f64) -> TensorResult<Tensor> {
        self.binary_scalar(exponent, BinaryOp::Pow)
    }

    // ==================== Unary ops ====================

    /// Apply `op` element-wise into a new tensor.
    pub fn unary(&self, op: UnaryOp) -> TensorResult<Tensor> {
        self.map(|x| op.apply(x))
    }

    /// Apply `op` element-wise in place.
    pub fn unary_(&mut self, op: UnaryOp) -> TensorResult<()> {
        for x in self.data_mut()?.iter_mut() {
            *x = op.apply(*x);
        }
        Ok(())
    }

    pub fn neg(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Neg)
    }

    pub fn abs(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Abs)
    }

    pub fn cos(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Cos)
    }

    pub fn sin(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Sin)
    }

    pub fn tan(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Tan)
    }

    pub fn tanh(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Tanh)
    }

    /// Natural logarithm.
    pub fn log(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Log)
    }

    pub fn exp(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Exp)
    }

    pub fn sigmoid(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Sigmoid)
    }

    pub fn relu(&self) -> TensorResult<Tensor> {
        self.unary(UnaryOp::Relu)
    }

    // ==================== In-place unary ops ====================

    pub fn neg_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Neg)
    }

    pub fn abs_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Abs)
    }

    pub fn cos_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Cos)
    }

    pub fn sin_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Sin)
    }

    pub fn tan_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Tan)
    }

    pub fn tanh_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Tanh)
    }

    pub fn log_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Log)
    }

    pub fn exp_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Exp)
    }

    pub fn sigmoid_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Sigmoid)
    }

    pub fn relu_(&mut self) -> TensorResult<()> {
        self.unary_(UnaryOp::Relu)
    }

    // ==================== Internal helpers ====================

    fn map(&self, f: impl Fn(f64) -> f64) -> TensorResult<Tensor> {
        let data = self.data()?;
        let out: Vec<f64> = data.iter().map(|&x| f(x)).collect();
        Ok(Tensor::from_parts(self.shape_sv.clone(), out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::TensorError;

    fn t(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
        Tensor::from_vec(data, shape).unwrap()
    }

    #[test]
    fn test_add_same_shape() {
        let a = t(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = t(vec![10.0, 20.0, 30.0, 40.0], vec![2, 2]);
        assert_eq!(a.add(&b).unwrap().to_vec(), vec![11.0, 22.0, 33.0, 44.0]);
    }

    #[test]
    fn test_add_broadcast_row() {
        let a = t(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        let b = t(vec![10.0, 20.0, 30.0], vec![3]);
        let c = a.add(&b).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(c.to_vec(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
    }

    #[test]
    fn test_broadcast_column_against_row() {
        let col = t(vec![1.0, 2.0, 3.0], vec![3, 1]);
        let row = t(vec![10.0, 20.0], vec![2]);
        let c = col.mul(&row).unwrap();
        assert_eq!(c.shape(), &[3, 2]);
        assert_eq!(c.to_vec(), vec![10.0, 20.0, 20.0, 40.0, 30.0, 60.0]);
    }

    #[test]
    fn test_incompatible_shapes() {
        let a = Tensor::zeros(vec![2, 3]).unwrap();
        let b = Tensor::zeros(vec![4]).unwrap();
        assert!(matches!(a.add(&b), Err(TensorError::IncompatibleBroadcastShapes { .. })));
    }

    #[test]
    fn test_singleton_operand_order() {
        let a = t(vec![2.0, 4.0], vec![2]);
        let s = Tensor::scalar(8.0);
        assert_eq!(s.sub(&a).unwrap().to_vec(), vec![6.0, 4.0]);
        assert_eq!(a.sub(&s).unwrap().to_vec(), vec![-6.0, -4.0]);
        assert_eq!(s.div(&a).unwrap().to_vec(), vec![4.0, 2.0]);
    }

    #[test]
    fn test_singleton_with_singleton() {
        let c = Tensor::scalar(3.0).pow(&Tensor::scalar(2.0)).unwrap();
        assert!(c.is_singleton());
        assert_eq!(c.item().unwrap(), 9.0);
    }

    #[test]
    fn test_floor_div_and_pow() {
        let a = t(vec![7.0, -7.0, 9.0], vec![3]);
        let b = t(vec![2.0, 2.0, 0.5], vec![3]);
        assert_eq!(a.floor_div(&b).unwrap().to_vec(), vec![3.0, -4.0, 18.0]);
        assert_eq!(a.pow_scalar(2.0).unwrap().to_vec(), vec![49.0, 49.0, 81.0]);
    }

    #[test]
    fn test_comparisons() {
        let a = t(vec![1.0, 2.0, 3.0], vec![3]);
        let b = t(vec![2.0, 2.0, 2.0], vec![3]);
        assert_eq!(a.equal(&b).unwrap().to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(a.not_equal(&b).unwrap().to_vec(), vec![1.0, 0.0, 1.0]);
        assert_eq!(a.less(&b).unwrap().to_vec(), vec![1.0, 0.0, 0.0]);
        assert_eq!(a.less_equal(&b).unwrap().to_vec(), vec![1.0, 1.0, 0.0]);
        assert_eq!(a.greater(&b).unwrap().to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(a.greater_equal(&b).unwrap().to_vec(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_reflected_scalar_ops() {
        let a = t(vec![1.0, 4.0], vec![2]);
        assert_eq!(a.rsub_scalar(10.0).unwrap().to_vec(), vec![9.0, 6.0]);
        assert_eq!(a.rdiv_scalar(8.0).unwrap().to_vec(), vec![8.0, 2.0]);
        assert_eq!(a.sub_scalar(1.0).unwrap().to_vec(), vec![0.0, 3.0]);
    }

    #[test]
    fn test_unary_ops() {
        let a = t(vec![-1.0, 0.0, 2.0], vec![3]);
        assert_eq!(a.relu().unwrap().to_vec(), vec![0.0, 0.0, 2.0]);
        assert_eq!(a.abs().unwrap().to_vec(), vec![1.0, 0.0, 2.0]);
        assert_eq!(a.neg().unwrap().to_vec(), vec![1.0, -0.0, -2.0]);
        let s = a.sigmoid().unwrap().to_vec();
        assert!((s[1] - 0.5).abs() < 1e-12);
        let e = t(vec![1.0], vec![1]).exp().unwrap().log().unwrap();
        assert!((e.to_vec()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unary_inplace_singleton() {
        let mut s = Tensor::scalar(-3.0);
        s.abs_().unwrap();
        assert!(s.is_singleton());
        assert_eq!(s.item().unwrap(), 3.0);
        s.neg_().unwrap();
        s.relu_().unwrap();
        assert_eq!(s.item().unwrap(), 0.0);
    }

    #[test]
    fn test_unary_inplace_tensor() {
        let mut a = t(vec![0.0, 0.0], vec![2]);
        a.cos_().unwrap();
        assert_eq!(a.to_vec(), vec![1.0, 1.0]);
        a.tanh_().unwrap();
        assert!((a.to_vec()[0] - 1.0f64.tanh()).abs() < 1e-12);
    }

    #[test]
    fn test_released_operand() {
        let mut a = Tensor::ones(vec![2]).unwrap();
        let b = Tensor::ones(vec![2]).unwrap();
        a.deallocate();
        assert!(matches!(a.add(&b), Err(TensorError::NullInput(_))));
        assert!(matches!(b.add(&a), Err(TensorError::NullInput(_))));
        assert!(matches!(a.exp_(), Err(TensorError::NullInput(_))));
    }
}
