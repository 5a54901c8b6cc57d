use crate::error::{MatResult, MatrixError};
use crate::shape::Shape;
use crate::Num;
use half::f16;
use rayon::prelude::*;
use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, MulAssign, Neg, Sub};

/// Dense two-dimensional matrix over a numeric element type.
///
/// Storage is one contiguous row-major buffer owned exclusively by the
/// matrix; cloning deep-copies it, moving hands it off in O(1). All public
/// accessors are bounds-checked except the documented-unsafe
/// [`get_unchecked`](Matrix::get_unchecked) pair.
#[derive(Clone)]
pub struct Matrix<A> {
    data: Vec<A>,
    shape: Shape,
}

impl<A: Num> Matrix<A> {
    /// An empty 0x0 matrix.
    pub fn new() -> Matrix<A> {
        Matrix {
            data: Vec::new(),
            shape: Shape::new(0, 0),
        }
    }

    /// A `rows` x `cols` matrix with every element set to `A::zero()`.
    pub fn zeros(rows: usize, cols: usize) -> MatResult<Matrix<A>> {
        let shape = Shape::new(rows, cols);
        let len = shape
            .checked_elem_count()
            .ok_or(MatrixError::InvalidDimension { rows, cols })?;
        Ok(Matrix {
            data: vec![A::zero(); len],
            shape,
        })
    }

    /// Wraps an existing row-major buffer. The buffer length must equal
    /// `rows * cols`.
    pub fn with_shape(data: Vec<A>, rows: usize, cols: usize) -> MatResult<Matrix<A>> {
        let shape = Shape::new(rows, cols);
        match shape.checked_elem_count() {
            Some(len) if len == data.len() => Ok(Matrix { data, shape }),
            _ => Err(MatrixError::InvalidDimension { rows, cols }),
        }
    }

    /// Builds a matrix from a collection of rows. Every row must have the
    /// same length as the first; an empty collection yields a 0x0 matrix.
    pub fn from_rows(rows: Vec<Vec<A>>) -> MatResult<Matrix<A>> {
        let cols = match rows.first() {
            Some(row) => row.len(),
            None => return Ok(Matrix::new()),
        };
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::JaggedMatrix {
                    row: i,
                    expected: cols,
                    got: row.len(),
                });
            }
        }
        let shape = Shape::new(rows.len(), cols);
        let mut data = Vec::with_capacity(shape.elem_count());
        for row in rows {
            data.extend(row);
        }
        Ok(Matrix { data, shape })
    }

    /// Reallocates to `rows` x `cols`. Elements inside the overlap of the
    /// old and new shapes are kept, everything else becomes `A::zero()`.
    /// Rows truncated away are gone; growing back later yields zeros, not
    /// the old values.
    pub fn resize(&mut self, rows: usize, cols: usize) -> MatResult<()> {
        let shape = Shape::new(rows, cols);
        let len = shape
            .checked_elem_count()
            .ok_or(MatrixError::InvalidDimension { rows, cols })?;
        let mut data = vec![A::zero(); len];
        let keep_rows = self.shape.rows.min(rows);
        let keep_cols = self.shape.cols.min(cols);
        for i in 0..keep_rows {
            for j in 0..keep_cols {
                data[shape.offset(i, j)] = self.data[self.shape.offset(i, j)].clone();
            }
        }
        self.data = data;
        self.shape = shape;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    pub fn cols(&self) -> usize {
        self.shape.cols()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn elem_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked element access.
    pub fn at(&self, row: usize, col: usize) -> MatResult<&A> {
        if !self.shape.contains(row, col) {
            return Err(self.out_of_bounds(row, col));
        }
        Ok(&self.data[self.shape.offset(row, col)])
    }

    /// Bounds-checked mutable element access.
    pub fn at_mut(&mut self, row: usize, col: usize) -> MatResult<&mut A> {
        if !self.shape.contains(row, col) {
            return Err(self.out_of_bounds(row, col));
        }
        let offset = self.shape.offset(row, col);
        Ok(&mut self.data[offset])
    }

    /// Unchecked element access.
    ///
    /// # Safety
    /// `row < self.rows()` and `col < self.cols()` must hold; anything
    /// else is undefined behavior. Prefer [`at`](Matrix::at) unless the
    /// bounds are already established.
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> &A {
        self.data.get_unchecked(self.shape.offset(row, col))
    }

    /// Unchecked mutable element access.
    ///
    /// # Safety
    /// Same contract as [`get_unchecked`](Matrix::get_unchecked).
    pub unsafe fn get_unchecked_mut(&mut self, row: usize, col: usize) -> &mut A {
        let offset = self.shape.offset(row, col);
        self.data.get_unchecked_mut(offset)
    }

    /// Bounds-checked view of one row.
    pub fn row(&self, row: usize) -> MatResult<&[A]> {
        if row >= self.shape.rows {
            return Err(self.out_of_bounds(row, 0));
        }
        let start = self.shape.offset(row, 0);
        Ok(&self.data[start..start + self.shape.cols])
    }

    /// Iterates over the rows as slices, in order.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[A]> + '_ {
        let shape = self.shape;
        (0..shape.rows).map(move |i| {
            let start = shape.offset(i, 0);
            &self.data[start..start + shape.cols]
        })
    }

    /// The backing row-major buffer.
    pub fn as_slice(&self) -> &[A] {
        &self.data
    }

    /// Consumes the matrix and returns the backing buffer.
    pub fn into_vec(self) -> Vec<A> {
        self.data
    }

    /// Assigns `n` to every element.
    pub fn set_all(&mut self, n: A) {
        self.data.fill(n);
    }

    /// Element-wise `self += rhs`. The shape check happens before any
    /// element is written, so a mismatch leaves `self` untouched.
    pub fn try_add_assign(&mut self, rhs: &Matrix<A>) -> MatResult<()> {
        self.check_same_shape(rhs)?;
        for (x, y) in self.data.iter_mut().zip(rhs.data.iter()) {
            *x += y.clone();
        }
        Ok(())
    }

    /// Element-wise `self -= rhs`, with the same shape contract as
    /// [`try_add_assign`](Matrix::try_add_assign).
    pub fn try_sub_assign(&mut self, rhs: &Matrix<A>) -> MatResult<()> {
        self.check_same_shape(rhs)?;
        for (x, y) in self.data.iter_mut().zip(rhs.data.iter()) {
            *x -= y.clone();
        }
        Ok(())
    }

    /// Multiplies every element by `n`.
    pub fn scale(&mut self, n: A) {
        for x in self.data.iter_mut() {
            *x *= n.clone();
        }
    }

    fn check_same_shape(&self, rhs: &Matrix<A>) -> MatResult<()> {
        if self.shape != rhs.shape {
            return Err(MatrixError::SizeMismatch {
                lhs: self.shape,
                rhs: rhs.shape,
            });
        }
        Ok(())
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> MatrixError {
        MatrixError::OutOfBounds {
            row,
            col,
            shape: self.shape,
        }
    }
}

impl<A: Num + Send + Sync> Matrix<A> {
    /// Matrix product. Requires `self.cols() == rhs.rows()`.
    ///
    /// Each output element accumulates in the element type `A` with `k`
    /// ascending, and the row loop runs on the rayon pool, so results are
    /// identical to the serial triple loop.
    pub fn matmul(&self, rhs: &Matrix<A>) -> MatResult<Matrix<A>> {
        if self.cols() != rhs.rows() {
            return Err(MatrixError::DimensionMismatch {
                lhs: self.shape,
                rhs: rhs.shape,
            });
        }
        let (m, n, p) = (self.rows(), self.cols(), rhs.cols());
        let len = m
            .checked_mul(p)
            .ok_or(MatrixError::InvalidDimension { rows: m, cols: p })?;
        let mut out = vec![A::zero(); len];
        out.par_chunks_mut(p.max(1))
            .enumerate()
            .for_each(|(i, out_row)| {
                let lhs_row = &self.data[i * n..(i + 1) * n];
                for (j, cell) in out_row.iter_mut().enumerate() {
                    let mut acc = A::zero();
                    for k in 0..n {
                        acc += lhs_row[k].clone() * rhs.data[k * p + j].clone();
                    }
                    *cell = acc;
                }
            });
        Matrix::with_shape(out, m, p)
    }
}

impl<A: Num> Default for Matrix<A> {
    fn default() -> Matrix<A> {
        Matrix::new()
    }
}

impl<A: Num> PartialEq for Matrix<A> {
    fn eq(&self, other: &Matrix<A>) -> bool {
        self.shape == other.shape && self.data == other.data
    }
}

/// Panicking convenience indexing; `at` is the non-panicking form.
impl<A: Num> Index<(usize, usize)> for Matrix<A> {
    type Output = A;

    fn index(&self, (row, col): (usize, usize)) -> &A {
        assert!(
            self.shape.contains(row, col),
            "index ({}, {}) is outside a {} matrix",
            row,
            col,
            self.shape
        );
        &self.data[self.shape.offset(row, col)]
    }
}

impl<A: Num> IndexMut<(usize, usize)> for Matrix<A> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut A {
        assert!(
            self.shape.contains(row, col),
            "index ({}, {}) is outside a {} matrix",
            row,
            col,
            self.shape
        );
        let offset = self.shape.offset(row, col);
        &mut self.data[offset]
    }
}

impl<A: Num> Add<&Matrix<A>> for &Matrix<A> {
    type Output = MatResult<Matrix<A>>;

    fn add(self, rhs: &Matrix<A>) -> Self::Output {
        let mut out = self.clone();
        out.try_add_assign(rhs)?;
        Ok(out)
    }
}

impl<A: Num> Sub<&Matrix<A>> for &Matrix<A> {
    type Output = MatResult<Matrix<A>>;

    fn sub(self, rhs: &Matrix<A>) -> Self::Output {
        let mut out = self.clone();
        out.try_sub_assign(rhs)?;
        Ok(out)
    }
}

impl<A: Num + Send + Sync> Mul<&Matrix<A>> for &Matrix<A> {
    type Output = MatResult<Matrix<A>>;

    fn mul(self, rhs: &Matrix<A>) -> Self::Output {
        self.matmul(rhs)
    }
}

impl<A: Num> Neg for Matrix<A> {
    type Output = Matrix<A>;

    fn neg(mut self) -> Matrix<A> {
        for x in self.data.iter_mut() {
            *x = -x.clone();
        }
        self
    }
}

impl<A: Num> Neg for &Matrix<A> {
    type Output = Matrix<A>;

    fn neg(self) -> Matrix<A> {
        -self.clone()
    }
}

impl<A: Num> Mul<A> for Matrix<A> {
    type Output = Matrix<A>;

    fn mul(mut self, n: A) -> Matrix<A> {
        self.scale(n);
        self
    }
}

impl<A: Num> Mul<A> for &Matrix<A> {
    type Output = Matrix<A>;

    fn mul(self, n: A) -> Matrix<A> {
        self.clone() * n
    }
}

impl<A: Num> MulAssign<A> for Matrix<A> {
    fn mul_assign(&mut self, n: A) {
        self.scale(n);
    }
}

// `scalar * matrix` cannot be written generically over the scalar, so it
// is stamped out per element type, teacher-macro style.
macro_rules! impl_left_scalar {
    ($($t:ty),*) => {
        $(impl Mul<Matrix<$t>> for $t {
            type Output = Matrix<$t>;

            fn mul(self, rhs: Matrix<$t>) -> Matrix<$t> {
                rhs * self
            }
        }

        impl Mul<&Matrix<$t>> for $t {
            type Output = Matrix<$t>;

            fn mul(self, rhs: &Matrix<$t>) -> Matrix<$t> {
                rhs * self
            }
        })*
    };
}

impl_left_scalar!(i8, i16, i32, i64, i128, isize, f32, f64, f16);

/// One row per line, elements space-separated. Illustrative, not a
/// committed wire format.
impl<A: Num + fmt::Display> fmt::Display for Matrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows_iter() {
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", x)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl<A: Num + fmt::Debug> fmt::Debug for Matrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, row) in self.rows_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str("[")?;
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{:?}", x)?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat;

    #[test]
    fn test_zeros() {
        let m = Matrix::<i32>::zeros(3, 4).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 4);
        assert_eq!(m.elem_count(), 12);
        for i in 0..m.rows() {
            for j in 0..m.cols() {
                assert_eq!(*m.at(i, j).unwrap(), 0);
            }
        }
    }

    #[test]
    fn test_zeros_overflow() {
        let err = Matrix::<i32>::zeros(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidDimension { .. }));
    }

    #[test]
    fn test_with_shape_length_mismatch() {
        let err = Matrix::with_shape(vec![1, 2, 3], 2, 2).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidDimension { .. }));
        let m = Matrix::with_shape(vec![1, 2, 3, 4], 2, 2).unwrap();
        assert_eq!(*m.at(1, 1).unwrap(), 4);
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]]).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 2);
        assert_eq!(*m.at(2, 1).unwrap(), 6);

        let err = Matrix::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6, 7]]).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::JaggedMatrix {
                row: 2,
                expected: 2,
                got: 3
            }
        ));

        let empty = Matrix::<i32>::from_rows(vec![]).unwrap();
        assert_eq!(empty.rows(), 0);
        assert_eq!(empty.cols(), 0);
    }

    #[test]
    fn test_resize() {
        let mut m = Matrix::<i32>::new();
        m.resize(1, 7).unwrap();
        assert_eq!(m.rows(), 1);
        assert_eq!(m.cols(), 7);

        m.resize(0, 0).unwrap();
        assert_eq!(m.rows(), 0);
        assert_eq!(m.cols(), 0);

        m.resize(0, 3).unwrap();
        assert_eq!(m.rows(), 0);
        assert_eq!(m.cols(), 0);

        assert!(matches!(
            m.resize(usize::MAX, 2),
            Err(MatrixError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_resize_drops_truncated_rows() {
        let mut m = Matrix::<i32>::zeros(1, 4).unwrap();
        m.set_all(2);
        m.resize(0, 0).unwrap();
        m.resize(2, 3).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(*m.at(i, j).unwrap(), 0);
            }
        }
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut m = mat![[1, 2, 3], [4, 5, 6]];
        m.resize(3, 2).unwrap();
        assert_eq!(m, mat![[1, 2], [4, 5], [0, 0]]);
        m.resize(2, 3).unwrap();
        assert_eq!(m, mat![[1, 2, 0], [4, 5, 0]]);
    }

    #[test]
    fn test_set_all() {
        let mut m = Matrix::<i32>::zeros(3, 4).unwrap();
        m.set_all(2);
        for row in m.rows_iter() {
            assert!(row.iter().all(|x| *x == 2));
        }
    }

    #[test]
    fn test_at_bounds() {
        let mut m = Matrix::<i32>::zeros(1, 1).unwrap();
        *m.at_mut(0, 0).unwrap() = 1;
        assert_eq!(*m.at(0, 0).unwrap(), 1);
        assert!(matches!(
            m.at(10, 0),
            Err(MatrixError::OutOfBounds { row: 10, col: 0, .. })
        ));
        assert!(matches!(
            m.at(0, 100),
            Err(MatrixError::OutOfBounds { row: 0, col: 100, .. })
        ));
    }

    #[test]
    fn test_unchecked_access() {
        let m = mat![[7, 8], [9, 10]];
        unsafe {
            assert_eq!(*m.get_unchecked(1, 0), 9);
        }
        let mut m = m;
        unsafe {
            *m.get_unchecked_mut(0, 1) = 80;
        }
        assert_eq!(*m.at(0, 1).unwrap(), 80);
    }

    #[test]
    fn test_index() {
        let mut m = Matrix::<i32>::zeros(2, 2).unwrap();
        m[(0, 1)] = 5;
        assert_eq!(m[(0, 1)], 5);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds_panics() {
        let m = Matrix::<i32>::zeros(2, 2).unwrap();
        let _ = m[(2, 0)];
    }

    #[test]
    fn test_row_views() {
        let m = mat![[1, 2], [3, 4], [5, 6]];
        assert_eq!(m.row(1).unwrap(), &[3, 4]);
        assert!(matches!(m.row(3), Err(MatrixError::OutOfBounds { .. })));
        let rows: Vec<&[i32]> = m.rows_iter().collect();
        assert_eq!(rows, vec![&[1, 2][..], &[3, 4][..], &[5, 6][..]]);
    }

    #[test]
    fn test_equality() {
        let mut m1 = Matrix::<i32>::zeros(3, 5).unwrap();
        let mut m2 = Matrix::<i32>::zeros(3, 5).unwrap();
        m1.set_all(3);
        m2.set_all(3);
        assert_eq!(m1, m1);
        assert_eq!(m1, m2);
        assert_eq!(m2, m1);

        m2.set_all(4);
        assert_ne!(m1, m2);

        let mut m3 = Matrix::<i32>::zeros(4, 6).unwrap();
        m3.set_all(4);
        assert_ne!(m2, m3);

        // no rows means no columns, however the matrices were sized
        let e1 = Matrix::<i32>::zeros(0, 3).unwrap();
        let e2 = Matrix::<i32>::zeros(0, 0).unwrap();
        assert_eq!(e1, e2);
    }

    #[test]
    fn test_add_assign_mismatch_leaves_operand_unchanged() {
        let mut a = mat![[1, 2, 3]];
        let b = mat![[1, 2], [3, 4]];
        let before = a.clone();
        assert!(matches!(
            a.try_add_assign(&b),
            Err(MatrixError::SizeMismatch { .. })
        ));
        assert!(matches!(
            a.try_sub_assign(&b),
            Err(MatrixError::SizeMismatch { .. })
        ));
        assert_eq!(a, before);
    }

    #[test]
    fn test_compound_ops() {
        let mut m1 = Matrix::<i32>::zeros(1, 4).unwrap();
        let mut m2 = m1.clone();
        m1.set_all(1);
        m2.set_all(2);

        let sum = (&m1 + &m2).unwrap();
        m1.try_add_assign(&m2).unwrap();
        assert_eq!(sum, m1);

        m2.set_all(0);
        m1.try_sub_assign(&sum).unwrap();
        assert_eq!(m1, m2);

        let mut m = Matrix::<i32>::zeros(3, 4).unwrap();
        let mut want = Matrix::<i32>::zeros(3, 4).unwrap();
        m.set_all(2);
        want.set_all(4);
        m *= 2;
        assert_eq!(m, want);
    }

    #[test]
    fn test_add_sub_round_trip() {
        let a = mat![[1, -2], [3, 4]];
        let b = mat![[5, 6], [-7, 8]];
        let sum = (&a + &b).unwrap();
        assert_eq!((&sum - &b).unwrap(), a);
    }

    #[test]
    fn test_negation() {
        let a = mat![[1, -2], [3, 4]];
        assert_eq!(-(-a.clone()), a);
        let zero = Matrix::<i32>::zeros(2, 2).unwrap();
        assert_eq!((&a + &(-&a)).unwrap(), zero);

        let mut m1 = Matrix::<i32>::zeros(3, 5).unwrap();
        let mut m2 = m1.clone();
        m1.set_all(3);
        m2.set_all(-3);
        assert_eq!(m1, -&m2);
        assert_eq!(-&m1, m2);

        m2.set_all(0);
        assert_eq!(m2, -&m2);
    }

    #[test]
    fn test_scalar_mul_commutes() {
        let mut m = Matrix::<i32>::zeros(3, 4).unwrap();
        m.set_all(2);
        let mut want = Matrix::<i32>::zeros(3, 4).unwrap();
        want.set_all(6);
        assert_eq!(&m * 3, want);
        assert_eq!(3 * &m, want);
        assert_eq!(m.clone() * 3, want);
        assert_eq!(3 * m, want);
    }

    #[test]
    fn test_matmul() {
        let a = mat![[1, 2], [3, 4]];
        let b = mat![[5, 6], [7, 8]];
        assert_eq!(a.matmul(&b).unwrap(), mat![[19, 22], [43, 50]]);
        assert_eq!((&a * &b).unwrap(), mat![[19, 22], [43, 50]]);

        let a = mat![[1, 2, 3]];
        let b = mat![[4], [5], [6]];
        assert_eq!(a.matmul(&b).unwrap(), mat![[32]]);
        assert_eq!(b.matmul(&a).unwrap().shape(), Shape::new(3, 3));
    }

    #[test]
    fn test_matmul_mismatch() {
        let a = mat![[1, 2, 3]];
        let b = mat![[1, 2, 3]];
        assert!(matches!(
            a.matmul(&b),
            Err(MatrixError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_matmul_accumulates_in_element_type() {
        let a = mat![[0.5f64]];
        let b = mat![[0.5f64]];
        assert_eq!(a.matmul(&b).unwrap(), mat![[0.25f64]]);

        let a = mat![[0.5f64, 1.5], [2.5, 3.5]];
        let b = mat![[1.0f64, 0.0], [0.0, 1.0]];
        assert_eq!(a.matmul(&b).unwrap(), a);
    }

    #[test]
    fn test_f16_elements() {
        let a = mat![[f16::from_f32(1.0), f16::from_f32(2.0)]];
        let b = &a * f16::from_f32(2.0);
        assert_eq!(*b.at(0, 1).unwrap(), f16::from_f32(4.0));
        let c = (&a + &a).unwrap();
        assert_eq!(*c.at(0, 0).unwrap(), f16::from_f32(2.0));
    }

    #[test]
    fn test_display() {
        let m = mat![[1, 2], [3, 4]];
        assert_eq!(m.to_string(), "1 2\n3 4\n");
        println!("{}", m);
    }

    #[test]
    fn test_debug() {
        let m = mat![[1, 2], [3, 4]];
        assert_eq!(format!("{:?}", m), "[[1, 2], [3, 4]]");
    }
}
