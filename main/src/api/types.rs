//! Core types for tensor operations

/// Maximum number of dimensions a tensor can have.
pub const MAX_RANK: usize = 8;

/// Element-wise binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    TrueDiv,
    Pow,
    Eq,
    Lt,
    Gt,
    Neq,
    Leq,
    Geq,
}

impl BinaryOp {
    /// Apply the operation to a pair of values. Comparisons yield 1.0 or 0.0.
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::FloorDiv => (a / b).floor(),
            BinaryOp::TrueDiv => a / b,
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Eq => bool_to_scalar(a == b),
            BinaryOp::Lt => bool_to_scalar(a < b),
            BinaryOp::Gt => bool_to_scalar(a > b),
            BinaryOp::Neq => bool_to_scalar(a != b),
            BinaryOp::Leq => bool_to_scalar(a <= b),
            BinaryOp::Geq => bool_to_scalar(a >= b),
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::FloorDiv => "floordiv",
            BinaryOp::TrueDiv => "truediv",
            BinaryOp::Pow => "pow",
            BinaryOp::Eq => "eq",
            BinaryOp::Lt => "lt",
            BinaryOp::Gt => "gt",
            BinaryOp::Neq => "neq",
            BinaryOp::Leq => "leq",
            BinaryOp::Geq => "geq",
        };
        write!(f, "{}", name)
    }
}

#[inline]
fn bool_to_scalar(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Element-wise unary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Abs,
    Cos,
    Sin,
    Tan,
    Tanh,
    Log,
    Exp,
    Sigmoid,
    Relu,
}

impl UnaryOp {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Neg => -x,
            UnaryOp::Abs => x.abs(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::Tanh => x.tanh(),
            UnaryOp::Log => x.ln(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            UnaryOp::Relu => x.max(0.0),
        }
    }
}

/// Reduction applied by `Tensor::aggregate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
    Mean,
    Max,
    Min,
    ArgMax,
    ArgMin,
}

impl ReduceOp {
    /// Accumulator seed for this reduction.
    pub(crate) fn seed(self) -> f64 {
        match self {
            ReduceOp::Sum | ReduceOp::Mean => 0.0,
            ReduceOp::Max | ReduceOp::ArgMax => f64::NEG_INFINITY,
            ReduceOp::Min | ReduceOp::ArgMin => f64::INFINITY,
        }
    }

    pub(crate) fn is_arg(self) -> bool {
        matches!(self, ReduceOp::ArgMax | ReduceOp::ArgMin)
    }
}

impl std::fmt::Display for ReduceOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReduceOp::Sum => "sum",
            ReduceOp::Mean => "mean",
            ReduceOp::Max => "max",
            ReduceOp::Min => "min",
            ReduceOp::ArgMax => "argmax",
            ReduceOp::ArgMin => "argmin",
        };
        write!(f, "{}", name)
    }
}

/// Per-axis subscript.
///
/// Both forms take non-negative values; negative indices are rejected
/// rather than counted from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscript {
    /// Select a single position. The axis vanishes from the result.
    Index(i64),
    /// Select `start..stop` every `step` positions. `stop` is clipped to the
    /// axis size.
    Slice { start: i64, stop: i64, step: i64 },
}

impl Subscript {
    /// Slice covering `start..stop` with step 1.
    pub fn range(start: i64, stop: i64) -> Self {
        Subscript::Slice { start, stop, step: 1 }
    }

    /// Slice covering an entire axis of the given size.
    pub fn full(size: usize) -> Self {
        Subscript::Slice { start: 0, stop: size as i64, step: 1 }
    }
}
