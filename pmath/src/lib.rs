pub mod matrix;
pub mod numbers;
pub mod ray;
pub mod vector;

use numbers::Float;

// These are used so that we can have cheap comparisons with PartialOrd types
// (f64::min and f64::max go through NaN handling we don't need):

pub fn min<T: PartialOrd>(v0: T, v1: T) -> T {
    if v0 < v1 {
        v0
    } else {
        v1
    }
}

pub fn max<T: PartialOrd>(v0: T, v1: T) -> T {
    if v0 > v1 {
        v0
    } else {
        v1
    }
}

/// Solves `a*t^2 + b*t + c = 0` robustly, returning the roots in ascending order.
/// Returns `None` if the discriminant is negative or the equation is degenerate.
pub fn quadratic<T: Float>(a: T, b: T, c: T) -> Option<(T, T)> {
    if a == T::zero() {
        return None;
    }

    let disc = b * b - T::four() * a * c;
    if disc < T::zero() {
        return None;
    }
    let root_disc = disc.sqrt();

    // Avoids the cancellation of -b + root_disc when b is large:
    let q = if b < T::zero() {
        -T::half() * (b - root_disc)
    } else {
        -T::half() * (b + root_disc)
    };

    // Both roots are zero here (b == 0 and c == 0):
    if q == T::zero() {
        return Some((T::zero(), T::zero()));
    }

    let t0 = q / a;
    let t1 = c / q;

    Some((min(t0, t1), max(t0, t1)))
}
