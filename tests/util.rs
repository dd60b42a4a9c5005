/// Check that two floats agree to within 5e-5, absolutely near zero and relative to the larger magnitude elsewhere.
#[macro_export]
macro_rules! assert_floats_near_equal {
    ($expected:expr, $actual:expr, $msg:expr) => {{
        let expected: f64 = $expected;
        let actual: f64 = $actual;
        let scale = expected.abs().max(actual.abs()).max(1.0);
        assert!(
            (expected - actual).abs() <= 0.00005 * scale,
            "{}: expected {}, got {}",
            $msg,
            expected,
            actual
        );
    }};
}
