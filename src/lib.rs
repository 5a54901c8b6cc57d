mod error;
mod matrix;
mod shape;

pub use crate::error::{MatResult, MatrixError};
pub use crate::matrix::Matrix;
pub use crate::shape::Shape;

use num_traits::Zero;
use std::ops::{AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Builds a [`Matrix`] from bracketed rows.
///
/// ```
/// use cayley::mat;
/// let m = mat![[1, 2], [3, 4], [5, 6]];
/// assert_eq!(m.rows(), 3);
/// ```
///
/// Panics if the rows do not all have the same length; use
/// [`Matrix::from_rows`] to handle jagged input as an error.
#[macro_export]
macro_rules! mat {
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {{
        $crate::Matrix::from_rows(vec![$(vec![$($x,)*],)*])
            .expect("mat! rows must all have the same length")
    }};
}

/// Capability bound for matrix elements.
///
/// Requires the full arithmetic operator set (`+`, `-`, `*`, `/`, unary
/// `-`, and the compound forms) plus a zero value via [`num_traits::Zero`],
/// which is what dimensioned construction and resizing fill with. Every
/// signed primitive, `f32`, `f64` and `half::f16` qualify through the
/// blanket impl.
pub trait Num:
    Clone
    + PartialEq
    + Zero
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
}

impl<A> Num for A where
    A: Clone
        + PartialEq
        + Zero
        + Sub<Output = A>
        + Mul<Output = A>
        + Div<Output = A>
        + Neg<Output = A>
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
{
}
