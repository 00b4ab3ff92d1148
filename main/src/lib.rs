//! # tensorbase
//!
//! A small N-dimensional array engine over `f64`.
//!
//! Tensors are dense, row-major and strided. Out-of-place operations allocate a
//! fresh output; nothing aliases another tensor's buffer.
//!
//! ## Features
//!
//! - Shapes up to rank 8, with a rank-0 singleton stored inline
//! - NumPy-style broadcasting and its reverse (`unbroadcast`)
//! - Elementwise arithmetic, comparisons and activations
//! - Reductions with `keepdim`
//! - 1D/2D and batched matrix multiplication
//! - Permute, reshape, fill, Box–Muller `randn_`
//! - Index/slice subscripting
//!
//! ## Example
//!
//! ```rust
//! use tensorbase::{Tensor, ReduceOp};
//!
//! let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
//! let b = Tensor::ones(vec![3, 4]).unwrap();
//! let c = a.matmul(&b).unwrap();
//! assert_eq!(c.shape(), &[2, 4]);
//!
//! let s = c.aggregate(&[1], false, ReduceOp::Sum).unwrap();
//! assert_eq!(s.to_vec(), vec![24.0, 60.0]);
//! ```

pub mod api;
mod core;
mod saf;

pub use saf::*;
