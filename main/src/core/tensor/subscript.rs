//! Index/slice subscripting: get, set_scalar, set_tensor.

use crate::api::error::{TensorError, TensorResult};
use crate::api::types::{MAX_RANK, Subscript};
use crate::core::shape::{Shape, TensorShape, coords_to_linear};
use super::tensor::{Tensor, alloc_buffer};
use smallvec::SmallVec;
use std::time::Instant;

/// One subscript per axis after validation and padding.
pub type SubscriptList = SmallVec<[Subscript; MAX_RANK]>;

/// Validate `subscripts` against `shape` and pad missing trailing axes with
/// full slices, so the result has exactly one entry per axis.
///
/// Slice `stop` values past the end of an axis are clipped to its size.
pub fn process_subscripts(subscripts: &[Subscript], shape: &[usize]) -> TensorResult<SubscriptList> {
    if subscripts.len() > shape.len() {
        return Err(TensorError::InvalidRank {
            rank: subscripts.len() as i64,
            max: shape.len(),
        });
    }

    let mut out = SubscriptList::new();
    for (dim, (&sub, &size)) in subscripts.iter().zip(shape.iter()).enumerate() {
        match sub {
            Subscript::Index(index) => {
                if index < 0 || index as usize >= size {
                    return Err(TensorError::IndexOutOfBounds { dim, index, size });
                }
                out.push(sub);
            }
            Subscript::Slice { start, stop, step } => {
                if start < 0 || stop < 0 || step <= 0 || start as usize >= size {
                    return Err(TensorError::InvalidSliceParameter { dim, start, stop, step, size });
                }
                out.push(Subscript::Slice { start, stop: stop.min(size as i64), step });
            }
        }
    }
    for &size in &shape[subscripts.len()..] {
        out.push(Subscript::full(size));
    }
    Ok(out)
}

/// Shape selected by processed subscripts. Index axes vanish; slice axes
/// keep `ceil((stop - start) / step)` positions.
///
/// A slice with `step <= 0` is rejected with `InvalidSliceParameter`.
pub fn derive_shape(subscripts: &[Subscript], shape: &[usize]) -> TensorResult<Shape> {
    let mut dims = TensorShape::new();
    for (dim, (sub, &size)) in subscripts.iter().zip(shape.iter()).enumerate() {
        if let Subscript::Slice { start, stop, step } = *sub {
            if step <= 0 {
                return Err(TensorError::InvalidSliceParameter { dim, start, stop, step, size });
            }
            let stop = stop.min(size as i64);
            dims.push(((stop - start + step - 1) / step).max(0) as usize);
        }
    }
    Ok(Shape::from_slice(&dims))
}

/// First coordinate visited by the walk.
fn start_coordinate(subscripts: &[Subscript]) -> TensorShape {
    subscripts
        .iter()
        .map(|sub| match *sub {
            Subscript::Index(i) => i as usize,
            Subscript::Slice { start, .. } => start as usize,
        })
        .collect()
}

/// Step to the next selected coordinate: the right-most slice axis advances
/// by its step and, past its stop, resets to its start and carries left.
/// Index axes never move.
fn next_coordinate(subscripts: &[Subscript], coord: &mut [usize]) {
    for dim in (0..subscripts.len()).rev() {
        if let Subscript::Slice { start, stop, step } = subscripts[dim] {
            coord[dim] += step as usize;
            if (coord[dim] as i64) < stop {
                return;
            }
            coord[dim] = start as usize;
        }
    }
}

impl Tensor {
    /// Source offsets of every selected element, in output order.
    fn selected_offsets(&self, subscripts: &[Subscript]) -> TensorResult<(Shape, Vec<usize>)> {
        let subs = process_subscripts(subscripts, self.shape())?;
        let shape = derive_shape(&subs, self.shape())?;
        let count = shape.numel();
        let mut offsets = Vec::with_capacity(count);
        let mut coord = start_coordinate(&subs);
        for _ in 0..count {
            offsets.push(coords_to_linear(&coord, self.strides()));
            next_coordinate(&subs, &mut coord);
        }
        Ok((shape, offsets))
    }

    // ==================== Subscripting ====================

    /// Copy out the elements selected by `subscripts`.
    ///
    /// Selecting with only indices yields a singleton.
    pub fn get(&self, subscripts: &[Subscript]) -> TensorResult<Tensor> {
        let _t = if log::log_enabled!(log::Level::Trace) { Some(Instant::now()) } else { None };
        let data = self.data()?;
        let (shape, offsets) = self.selected_offsets(subscripts)?;
        let mut out = alloc_buffer(offsets.len(), 0.0)?;
        for (slot, &off) in out.iter_mut().zip(offsets.iter()) {
            *slot = data[off];
        }
        if let Some(t) = _t {
            log::trace!("[perf] get {:?} -> {} {:.3}ms",
                self.shape(), shape, t.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(Tensor::from_parts(shape.into_inner(), out))
    }

    /// Write `value` to every element selected by `subscripts`.
    pub fn set_scalar(&mut self, subscripts: &[Subscript], value: f64) -> TensorResult<()> {
        self.ensure_live()?;
        let (_, offsets) = self.selected_offsets(subscripts)?;
        let data = self.data_mut()?;
        for off in offsets {
            data[off] = value;
        }
        Ok(())
    }

    /// Write `source` into the region selected by `subscripts`.
    ///
    /// Fails with `ShapeMismatch` unless the selected shape equals
    /// `source`'s shape exactly.
    pub fn set_tensor(&mut self, subscripts: &[Subscript], source: &Tensor) -> TensorResult<()> {
        self.ensure_live()?;
        let values = source.data()?;
        let (shape, offsets) = self.selected_offsets(subscripts)?;
        if shape.dims() != source.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: shape.dims().to_vec(),
                got: source.shape().to_vec(),
            });
        }
        let data = self.data_mut()?;
        for (off, &v) in offsets.into_iter().zip(values.iter()) {
            data[off] = v;
        }
        Ok(())
    }
}
