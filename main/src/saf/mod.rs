//! Facade re-exports for tensorbase

pub use crate::api::types::*;
pub use crate::api::error::*;
pub use crate::core::tensor::{Tensor, Storage};
pub use crate::core::tensor::{broadcast_shape, can_broadcast, translate_broadcast_index};
pub use crate::core::tensor::{SubscriptList, process_subscripts, derive_shape};
pub use crate::core::shape::{
    Shape, SHAPE_PAD, compute_strides, coords_to_linear, linear_to_coords, shapes_equal,
};
pub use crate::core::runtime::RuntimeConfig;
