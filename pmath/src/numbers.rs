// This is my own float trait versus the num_traits' one. It adds the constants
// that the renderer keeps reaching for.

use num_traits;

pub trait Float: num_traits::Float + num_traits::Bounded {
    const PI: Self;
    const INV_PI: Self;
    const TWO_PI: Self;
    /// Default offset used to reject self intersections at a ray's origin.
    const SELF_INT_COMP: Self;

    // These could be constants, but to mimick the design of num_traits' float
    // we'll make them functions:
    fn two() -> Self;
    fn four() -> Self;
    fn half() -> Self;
}

impl Float for f32 {
    const PI: Self = 3.14159265358979323846;
    const INV_PI: Self = 0.31830988618379067154;
    const TWO_PI: Self = 6.28318530717958647692;
    const SELF_INT_COMP: Self = 1e-4;

    fn two() -> Self {
        2f32
    }

    fn four() -> Self {
        4f32
    }

    fn half() -> Self {
        0.5f32
    }
}

impl Float for f64 {
    const PI: Self = 3.14159265358979323846;
    const INV_PI: Self = 0.31830988618379067154;
    const TWO_PI: Self = 6.28318530717958647692;
    const SELF_INT_COMP: Self = 1e-7;

    fn two() -> Self {
        2.
    }

    fn four() -> Self {
        4.
    }

    fn half() -> Self {
        0.5
    }
}
