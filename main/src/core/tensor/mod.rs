mod tensor;
mod broadcast;
mod ops;
mod reduce;
mod linalg;
mod views;
mod subscript;

pub use tensor::{Tensor, Storage};
pub use broadcast::{broadcast_shape, can_broadcast, translate_broadcast_index};
pub use subscript::{SubscriptList, process_subscripts, derive_shape};
