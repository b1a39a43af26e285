use super::cell::{UnitCell, UnitCellError};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use std::ops::Mul;
use thiserror::Error;

/// Components smaller than this are snapped to zero after a change of basis.
const SNAP_EPSILON: f64 = 1e-7;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Matrix is singular and has no inverse")]
    Singular,
}

/// A 4x4 homogeneous transformation stored as 16 values in column-major order.
///
/// The upper-left 3x3 block holds the rotation (or scale) and the fourth column the
/// translation; the bottom row is always `(0, 0, 0, 1)` for matrices built through the
/// public constructors. Besides the values, a matrix carries the descriptive metadata
/// the loaders attach to symmetry and biological-unit operators.
///
/// Operations that combine matrices (`multiply`, `inverse`, `to_cartesian`) never
/// mutate their operands; only [`set_transformation`](Self::set_transformation) and
/// [`set_identity`](Self::set_identity) mutate the receiver, which requires exclusive
/// access through `&mut self`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationMatrix {
    values: [f64; 16],
    /// Operator identifier (e.g. the BIOMT or MTRIX serial number).
    pub id: Option<String>,
    /// Chain(s) the operator applies to, when the source names them.
    pub chain_id: Option<String>,
    /// Crystallographic shorthand such as "2_555".
    pub symmetry_shorthand: Option<String>,
    /// The operation string this matrix was generated from, e.g. "-x,y+1/2,-z".
    pub operation: Option<String>,
    /// The unit cell used to convert the operator to Cartesian space.
    pub cell: Option<UnitCell>,
}

impl Default for TransformationMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformationMatrix {
    pub fn identity() -> Self {
        let mut matrix = Self {
            values: [0.0; 16],
            id: None,
            chain_id: None,
            symmetry_shorthand: None,
            operation: None,
            cell: None,
        };
        matrix.set_identity();
        matrix
    }

    /// Creates a matrix from 16 values in column-major order.
    pub fn from_column_major(values: [f64; 16]) -> Self {
        Self {
            values,
            ..Self::identity()
        }
    }

    /// Creates an affine transform from a 3x3 rotation/scale block and a translation.
    pub fn from_rotation_translation(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        let mut matrix = Self::identity();
        matrix.set_transformation(rotation, translation);
        matrix
    }

    /// Replaces the values with the given rotation block and translation column.
    ///
    /// Any previous content of the value storage is discarded; metadata is kept.
    pub fn set_transformation(&mut self, rotation: &Matrix3<f64>, translation: &Vector3<f64>) {
        self.set_identity();
        for col in 0..3 {
            for row in 0..3 {
                self.values[col * 4 + row] = rotation[(row, col)];
            }
        }
        self.values[12] = translation.x;
        self.values[13] = translation.y;
        self.values[14] = translation.z;
    }

    pub fn set_identity(&mut self) {
        self.values = [0.0; 16];
        self.values[0] = 1.0;
        self.values[5] = 1.0;
        self.values[10] = 1.0;
        self.values[15] = 1.0;
    }

    /// The raw values in column-major order.
    pub fn values(&self) -> &[f64; 16] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[col * 4 + row]
    }

    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_fn(|row, col| self.get(row, col))
    }

    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(self.values[12], self.values[13], self.values[14])
    }

    pub fn is_identity(&self) -> bool {
        self.values == Self::identity().values
    }

    /// Applies the rotation block and translation to a point. The input is not modified.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let v = &self.values;
        Point3::new(
            v[0] * point.x + v[4] * point.y + v[8] * point.z + v[12],
            v[1] * point.x + v[5] * point.y + v[9] * point.z + v[13],
            v[2] * point.x + v[6] * point.y + v[10] * point.z + v[14],
        )
    }

    /// Returns `self * rhs`. The result carries no metadata.
    pub fn multiply(&self, rhs: &TransformationMatrix) -> TransformationMatrix {
        let (a, b) = (&self.values, &rhs.values);
        let mut values = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                values[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
            }
        }
        Self::from_column_major(values)
    }

    /// Computes the inverse through an LU decomposition with implicit-scaling partial
    /// pivoting followed by back-substitution against the identity.
    ///
    /// The result carries no metadata.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Singular`] if a row of the matrix is entirely zero or a
    /// pivot element is exactly zero.
    pub fn inverse(&self) -> Result<TransformationMatrix, MatrixError> {
        // Work in row-major order.
        let mut lu = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                lu[row * 4 + col] = self.values[col * 4 + row];
            }
        }

        let mut row_perm = [0usize; 4];
        if !lu_decomposition(&mut lu, &mut row_perm) {
            return Err(MatrixError::Singular);
        }

        let mut result = [0.0; 16];
        result[0] = 1.0;
        result[5] = 1.0;
        result[10] = 1.0;
        result[15] = 1.0;
        lu_back_substitution(&lu, &row_perm, &mut result);

        let mut values = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                values[col * 4 + row] = result[row * 4 + col];
            }
        }
        Ok(Self::from_column_major(values))
    }

    /// Converts an operator expressed in fractional coordinates of `cell` into
    /// Cartesian space: `Finv * self * F`, where `F` maps Cartesian to fractional
    /// coordinates.
    ///
    /// Components whose magnitude falls below 1e-7 are snapped to exactly zero. The
    /// result keeps this matrix's metadata and records the cell.
    pub fn to_cartesian(&self, cell: &UnitCell) -> Result<TransformationMatrix, UnitCellError> {
        let fractional = cell.fractionalization()?;
        let fractional_inverse = cell.orthogonalization()?;

        let mut result = fractional_inverse.multiply(self).multiply(&fractional);
        for value in result.values.iter_mut() {
            if value.abs() < SNAP_EPSILON {
                *value = 0.0;
            }
        }

        result.id = self.id.clone();
        result.chain_id = self.chain_id.clone();
        result.symmetry_shorthand = self.symmetry_shorthand.clone();
        result.operation = self.operation.clone();
        result.cell = Some(cell.clone());
        Ok(result)
    }

    pub fn to_matrix4(&self) -> Matrix4<f64> {
        Matrix4::from_column_slice(&self.values)
    }
}

impl From<Matrix4<f64>> for TransformationMatrix {
    fn from(matrix: Matrix4<f64>) -> Self {
        let mut values = [0.0; 16];
        values.copy_from_slice(matrix.as_slice());
        Self::from_column_major(values)
    }
}

impl Mul for &TransformationMatrix {
    type Output = TransformationMatrix;

    fn mul(self, rhs: &TransformationMatrix) -> TransformationMatrix {
        self.multiply(rhs)
    }
}

// Press, Flannery, Teukolsky & Vetterling, Numerical Recipes in C (1988), pp. 40-45,
// specialized to 4x4 row-major storage. Replaces `m` with the LU decomposition of a
// row-wise permutation of itself and records the permutation in `row_perm`.
fn lu_decomposition(m: &mut [f64; 16], row_perm: &mut [usize; 4]) -> bool {
    let mut row_scale = [0.0; 4];

    for (i, scale) in row_scale.iter_mut().enumerate() {
        let big = m[i * 4..i * 4 + 4]
            .iter()
            .fold(0.0_f64, |big, value| if value.abs() > big { value.abs() } else { big });
        if big == 0.0 {
            return false;
        }
        *scale = 1.0 / big;
    }

    for j in 0..4 {
        // Upper triangle U.
        for i in 0..j {
            let mut sum = m[4 * i + j];
            for k in 0..i {
                sum -= m[4 * i + k] * m[4 * k + j];
            }
            m[4 * i + j] = sum;
        }

        // Lower triangle L, tracking the best scaled pivot.
        let mut big = 0.0;
        let mut imax = None;
        for i in j..4 {
            let mut sum = m[4 * i + j];
            for k in 0..j {
                sum -= m[4 * i + k] * m[4 * k + j];
            }
            m[4 * i + j] = sum;

            let scaled = row_scale[i] * sum.abs();
            if scaled >= big {
                big = scaled;
                imax = Some(i);
            }
        }
        let Some(imax) = imax else {
            return false;
        };

        if j != imax {
            for k in 0..4 {
                m.swap(4 * imax + k, 4 * j + k);
            }
            row_scale[imax] = row_scale[j];
        }
        row_perm[j] = imax;

        if m[4 * j + j] == 0.0 {
            return false;
        }

        if j != 3 {
            let inv_pivot = 1.0 / m[4 * j + j];
            for i in (j + 1)..4 {
                m[4 * i + j] *= inv_pivot;
            }
        }
    }

    true
}

// Solves LU x = b for each column of `b` (row-major) in place.
fn lu_back_substitution(lu: &[f64; 16], row_perm: &[usize; 4], b: &mut [f64; 16]) {
    for k in 0..4 {
        let mut first_nonzero: Option<usize> = None;

        for i in 0..4 {
            let ip = row_perm[i];
            let mut sum = b[k + 4 * ip];
            b[k + 4 * ip] = b[k + 4 * i];
            if let Some(start) = first_nonzero {
                for j in start..i {
                    sum -= lu[4 * i + j] * b[k + 4 * j];
                }
            } else if sum != 0.0 {
                first_nonzero = Some(i);
            }
            b[k + 4 * i] = sum;
        }

        for i in (0..4).rev() {
            let mut sum = b[k + 4 * i];
            for j in (i + 1)..4 {
                sum -= lu[4 * i + j] * b[k + 4 * j];
            }
            b[k + 4 * i] = sum / lu[4 * i + i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-5;

    fn assert_matrix_close(actual: &TransformationMatrix, expected: &TransformationMatrix) {
        for (i, (a, e)) in actual.values().iter().zip(expected.values()).enumerate() {
            assert!(
                (a - e).abs() < TOLERANCE,
                "value {} differs: {} vs {}",
                i,
                a,
                e
            );
        }
    }

    fn sample_matrix() -> TransformationMatrix {
        let rotation = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        TransformationMatrix::from_rotation_translation(&rotation, &Vector3::new(1.5, -2.0, 3.25))
    }

    #[test]
    fn set_transformation_stores_column_major_values() {
        let rotation = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let m = TransformationMatrix::from_rotation_translation(&rotation, &Vector3::new(10.0, 11.0, 12.0));
        assert_eq!(
            m.values(),
            &[
                1.0, 4.0, 7.0, 0.0, 2.0, 5.0, 8.0, 0.0, 3.0, 6.0, 9.0, 0.0, 10.0, 11.0, 12.0, 1.0
            ]
        );
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.rotation(), rotation);
        assert_eq!(m.translation(), Vector3::new(10.0, 11.0, 12.0));
    }

    #[test]
    fn set_identity_resets_values_but_keeps_metadata() {
        let mut m = sample_matrix();
        m.id = Some("1".to_string());
        m.set_identity();
        assert!(m.is_identity());
        assert_eq!(m.id.as_deref(), Some("1"));
    }

    #[test]
    fn transform_point_applies_rotation_then_translation() {
        let m = sample_matrix();
        let p = Point3::new(1.0, 0.0, 0.0);
        let q = m.transform_point(&p);
        assert!((q - Point3::new(1.5, -1.0, 3.25)).norm() < TOLERANCE);
        assert_eq!(p, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn multiply_by_identity_is_exact() {
        let m = sample_matrix();
        let identity = TransformationMatrix::identity();
        assert_eq!(m.multiply(&identity).values(), m.values());
        assert_eq!(identity.multiply(&m).values(), m.values());
    }

    #[test]
    fn multiply_follows_column_major_operand_order() {
        let translate =
            TransformationMatrix::from_rotation_translation(&Matrix3::identity(), &Vector3::new(1.0, 0.0, 0.0));
        let rotate = sample_matrix();
        let p = Point3::new(0.0, 0.0, 0.0);

        // (A * B) p == A (B p)
        let ab = &translate * &rotate;
        let expected = translate.transform_point(&rotate.transform_point(&p));
        assert!((ab.transform_point(&p) - expected).norm() < TOLERANCE);

        let ba = rotate.multiply(&translate);
        assert_ne!(ab.values(), ba.values());
    }

    #[test]
    fn multiply_matches_nalgebra() {
        let a = sample_matrix();
        let b = TransformationMatrix::from_rotation_translation(
            &Matrix3::new(2.0, 0.5, 0.0, 0.0, 1.0, -1.0, 0.25, 0.0, 3.0),
            &Vector3::new(-1.0, 4.0, 0.5),
        );
        let expected = TransformationMatrix::from(a.to_matrix4() * b.to_matrix4());
        assert_matrix_close(&a.multiply(&b), &expected);
    }

    #[test]
    fn inverse_of_inverse_reproduces_matrix() {
        let m = TransformationMatrix::from_rotation_translation(
            &Matrix3::new(2.0, 0.5, 0.0, 0.0, 1.0, -1.0, 0.25, 0.0, 3.0),
            &Vector3::new(-1.0, 4.0, 0.5),
        );
        let inverse = m.inverse().unwrap();
        assert_matrix_close(&inverse.inverse().unwrap(), &m);
        assert_matrix_close(&m.multiply(&inverse), &TransformationMatrix::identity());
    }

    #[test]
    fn inverse_of_pivot_heavy_matrix_is_correct() {
        // Zero on the leading diagonal forces row exchanges.
        let m = TransformationMatrix::from_column_major([
            0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 6.0, 7.0, 1.0,
        ]);
        let inverse = m.inverse().unwrap();
        assert_matrix_close(&m.multiply(&inverse), &TransformationMatrix::identity());
        assert_matrix_close(&inverse.multiply(&m), &TransformationMatrix::identity());
    }

    #[test]
    fn inverse_matches_nalgebra_for_general_matrix() {
        let m = TransformationMatrix::from_column_major([
            4.0, 3.0, 2.0, 1.0, 0.5, -2.0, 1.0, 0.0, 1.0, 1.0, 3.0, 2.0, -1.0, 0.25, 2.0, 5.0,
        ]);
        let expected = TransformationMatrix::from(m.to_matrix4().try_inverse().unwrap());
        assert_matrix_close(&m.inverse().unwrap(), &expected);
    }

    #[test]
    fn inverse_reports_singular_matrices() {
        let zero_row = TransformationMatrix::from_column_major([
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ]);
        assert_eq!(zero_row.inverse(), Err(MatrixError::Singular));

        let dependent_rows = TransformationMatrix::from_rotation_translation(
            &Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0),
            &Vector3::zeros(),
        );
        assert_eq!(dependent_rows.inverse(), Err(MatrixError::Singular));
    }

    #[test]
    fn combining_operations_drops_metadata() {
        let mut m = sample_matrix();
        m.id = Some("7".to_string());
        assert!(m.multiply(&m).id.is_none());
        assert!(m.inverse().unwrap().id.is_none());
    }

    #[test]
    fn to_cartesian_snaps_noise_and_keeps_metadata() {
        let cell = UnitCell::new(10.0, 20.0, 30.0, 90.0, 90.0, 90.0);
        let mut op = TransformationMatrix::from_rotation_translation(
            &Matrix3::new(-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0),
            &Vector3::new(0.0, 0.5, 0.0),
        );
        op.symmetry_shorthand = Some("2_555".to_string());

        let cartesian = op.to_cartesian(&cell).unwrap();
        assert!((cartesian.translation() - Vector3::new(0.0, 10.0, 0.0)).norm() < TOLERANCE);
        assert_eq!(cartesian.get(0, 1), 0.0);
        assert_eq!(cartesian.get(1, 0), 0.0);
        assert!((cartesian.get(0, 0) + 1.0).abs() < TOLERANCE);
        assert_eq!(cartesian.symmetry_shorthand.as_deref(), Some("2_555"));
        assert_eq!(cartesian.cell.as_ref(), Some(&cell));
    }
}
