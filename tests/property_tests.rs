//! Property-based tests over randomly generated shapes and values.

mod common;

use common::*;
use proptest::prelude::*;
use tensorbase::*;

fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..5, 1..=4)
}

/// Like `shape_strategy`, but axes may have size 0.
fn shape_with_empty_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..5, 1..=4)
}

/// Finite values filling a shape drawn from `shapes`.
fn tensor_from(shapes: impl Strategy<Value = Vec<usize>>) -> impl Strategy<Value = Tensor> {
    shapes.prop_flat_map(|shape| {
        let n: usize = shape.iter().product();
        prop::collection::vec(-100.0f64..100.0, n)
            .prop_map(move |data| make_tensor(&data, shape.clone()))
    })
}

fn tensor_strategy() -> impl Strategy<Value = Tensor> {
    tensor_from(shape_strategy())
}

fn maybe_empty_tensor_strategy() -> impl Strategy<Value = Tensor> {
    tensor_from(shape_with_empty_strategy())
}

/// Pick a broadcast partner for `shape`: some dims become 1 and some leading dims are dropped.
fn broadcast_partner(shape: &[usize], ones_mask: &[bool], drop: usize) -> Vec<usize> {
    shape
        .iter()
        .zip(ones_mask.iter())
        .map(|(&d, &one)| if one { 1 } else { d })
        .skip(drop.min(shape.len().saturating_sub(1)))
        .collect()
}

proptest! {
    #[test]
    fn prop_linear_coords_round_trip(shape in shape_strategy(), seed in 0usize..1000) {
        let numel: usize = shape.iter().product();
        let index = seed % numel;
        let strides = compute_strides(&shape);
        let coords = linear_to_coords(index, &shape);
        prop_assert_eq!(coords_to_linear(&coords, &strides), index);
    }

    #[test]
    fn prop_padded_shape_round_trip(shape in shape_strategy()) {
        let s = Shape::from_slice(&shape);
        let back = Shape::from_padded(&s.to_padded()).unwrap();
        prop_assert_eq!(back.dims(), shape.as_slice());
    }

    #[test]
    fn prop_broadcast_shape_is_symmetric(
        shape in shape_strategy(),
        mask in prop::collection::vec(any::<bool>(), 4),
        drop in 0usize..4,
    ) {
        let other = broadcast_partner(&shape, &mask, drop);
        let ab = broadcast_shape(&shape, &other).unwrap();
        let ba = broadcast_shape(&other, &shape).unwrap();
        prop_assert_eq!(ab.dims(), ba.dims());
        prop_assert_eq!(ab.dims(), shape.as_slice());
        prop_assert!(can_broadcast(&other, &shape));
    }

    #[test]
    fn prop_sub_self_is_zero(t in maybe_empty_tensor_strategy()) {
        let z = t.sub(&t).unwrap();
        prop_assert!(z.to_vec().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn prop_mul_by_one_is_identity(t in maybe_empty_tensor_strategy()) {
        let one = Tensor::scalar(1.0);
        prop_assert_eq!(t.mul(&one).unwrap(), t.clone());
        let ones = Tensor::ones(t.shape().to_vec()).unwrap();
        prop_assert_eq!(t.mul(&ones).unwrap(), t);
    }

    #[test]
    fn prop_broadcast_then_unbroadcast_sums(
        t in tensor_strategy(),
        mask in prop::collection::vec(any::<bool>(), 4),
        drop in 0usize..4,
    ) {
        let target = broadcast_partner(t.shape(), &mask, drop);
        let small = Tensor::ones(target.clone()).unwrap();
        let grad = small.mul(&t).unwrap();
        let reduced = grad.unbroadcast(&target).unwrap();
        prop_assert_eq!(reduced.shape(), target.as_slice());
        prop_assert!((reduced.sum_all().unwrap() - t.sum_all().unwrap()).abs() < 1e-6);
    }

    #[test]
    fn prop_double_transpose_is_identity(t in maybe_empty_tensor_strategy()) {
        let back = t.transpose().unwrap().transpose().unwrap();
        prop_assert_eq!(back, t);
    }

    #[test]
    fn prop_reshape_round_trip(t in maybe_empty_tensor_strategy()) {
        let flat = t.reshape(&[t.numel()]).unwrap();
        prop_assert_eq!(flat.to_vec(), t.to_vec());
        let restored = flat.reshape(t.shape()).unwrap();
        prop_assert_eq!(restored, t);
    }

    #[test]
    fn prop_keepdim_matches_dropped(t in tensor_strategy(), axis_seed in 0usize..4) {
        let axis = axis_seed % t.ndim();
        let kept = t.aggregate(&[axis], true, ReduceOp::Sum).unwrap();
        let dropped = t.aggregate(&[axis], false, ReduceOp::Sum).unwrap();
        prop_assert_eq!(kept.shape()[axis], 1);
        prop_assert_eq!(kept.to_vec(), dropped.to_vec());
    }

    #[test]
    fn prop_padded_shape_round_trip_with_empty_axes(shape in shape_with_empty_strategy()) {
        let t = Tensor::zeros(shape.clone()).unwrap();
        let back = Tensor::from_padded(&t.padded_shape()).unwrap();
        prop_assert_eq!(back.shape(), shape.as_slice());
        prop_assert_eq!(back.numel(), shape.iter().product::<usize>());
    }

    #[test]
    fn prop_matmul_with_empty_axes_matches_shape_inference(
        n in 0usize..3,
        l in 0usize..3,
        m in 0usize..3,
        batch in 0usize..3,
    ) {
        let a = Tensor::ones(vec![batch, n, l]).unwrap();
        let b = Tensor::ones(vec![l, m]).unwrap();
        let c = a.matmul(&b).unwrap();
        prop_assert_eq!(c.shape(), &[batch, n, m]);
        prop_assert!(c.to_vec().iter().all(|&v| v == l as f64));
    }

    #[test]
    fn prop_argmax_points_at_max(t in tensor_strategy()) {
        let all: Vec<usize> = (0..t.ndim()).collect();
        let idx = t.aggregate(&all, false, ReduceOp::ArgMax).unwrap().item().unwrap() as usize;
        let max = t.aggregate(&all, false, ReduceOp::Max).unwrap().item().unwrap();
        prop_assert_eq!(t.to_vec()[idx], max);
    }

    #[test]
    fn prop_subscript_round_trip(t in tensor_strategy(), start in 0i64..3, step in 1i64..3) {
        let mut target = t.clone();
        let size = t.shape()[0] as i64;
        let start = start.min(size - 1);
        let subs = [Subscript::Slice { start, stop: size, step }];
        let region = target.get(&subs).unwrap();
        prop_assert_eq!(region.shape()[0] as i64, (size - start + step - 1) / step);
        target.set_tensor(&subs, &region).unwrap();
        prop_assert_eq!(target, t);
    }
}
