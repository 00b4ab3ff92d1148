#![allow(dead_code)]

use tensorbase::Tensor;

/// Install a test logger so `RUST_LOG=trace` shows perf lines.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create a tensor holding `0, 1, 2, ...` in the given shape.
pub fn make_arange_tensor(shape: Vec<usize>) -> Tensor {
    let n: usize = shape.iter().product();
    Tensor::from_vec((0..n).map(|i| i as f64).collect(), shape).unwrap()
}

/// Create a tensor from a slice and shape.
pub fn make_tensor(data: &[f64], shape: Vec<usize>) -> Tensor {
    Tensor::from_vec(data.to_vec(), shape).unwrap()
}

/// Square identity matrix.
pub fn make_identity(n: usize) -> Tensor {
    let mut data = vec![0.0; n * n];
    for i in 0..n {
        data[i * n + i] = 1.0;
    }
    Tensor::from_vec(data, vec![n, n]).unwrap()
}

/// Assert that two f64 slices are element-wise close within a tolerance.
pub fn assert_f64_near(actual: &[f64], expected: &[f64], tolerance: f64, msg: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{}: length mismatch (actual={}, expected={})",
        msg,
        actual.len(),
        expected.len()
    );
    for (i, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "{}: element [{}] mismatch: actual={}, expected={}, diff={}, tolerance={}",
            msg,
            i,
            a,
            e,
            (a - e).abs(),
            tolerance
        );
    }
}
