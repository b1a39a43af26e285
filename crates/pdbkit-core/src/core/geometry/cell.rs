use super::matrix::{MatrixError, TransformationMatrix};
use nalgebra::{Matrix3, Vector3};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitCellError {
    #[error("Cell edge lengths must be positive (a={a}, b={b}, c={c})")]
    NonPositiveEdge { a: f64, b: f64, c: f64 },
    #[error("Cell angles ({alpha}, {beta}, {gamma}) do not describe a cell with positive volume")]
    DegenerateAngles { alpha: f64, beta: f64, gamma: f64 },
    #[error("Orthogonalization matrix could not be inverted: {0}")]
    Matrix(#[from] MatrixError),
}

/// Crystallographic unit cell parameters as given by a CRYST1 record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitCell {
    /// Edge lengths in Angstroms.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Angles in degrees.
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    /// Hermann-Mauguin space group symbol, e.g. "P 21 21 21".
    pub space_group: String,
    /// Number of polymeric chains per unit cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<u32>,
}

impl UnitCell {
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
            space_group: String::new(),
            z: None,
        }
    }

    pub fn volume(&self) -> f64 {
        self.a * self.b * self.c * self.volume_factor()
    }

    fn volume_factor(&self) -> f64 {
        let (ca, cb, cg) = (
            self.alpha.to_radians().cos(),
            self.beta.to_radians().cos(),
            self.gamma.to_radians().cos(),
        );
        (1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg).max(0.0).sqrt()
    }

    /// The matrix taking fractional coordinates to Cartesian coordinates, using the
    /// PDB convention: `a` along x and `b` in the xy plane.
    pub fn orthogonalization(&self) -> Result<TransformationMatrix, UnitCellError> {
        if self.a <= 0.0 || self.b <= 0.0 || self.c <= 0.0 {
            return Err(UnitCellError::NonPositiveEdge {
                a: self.a,
                b: self.b,
                c: self.c,
            });
        }
        let volume_factor = self.volume_factor();
        let sin_gamma = self.gamma.to_radians().sin();
        if volume_factor <= 0.0 || sin_gamma.abs() < f64::EPSILON {
            return Err(UnitCellError::DegenerateAngles {
                alpha: self.alpha,
                beta: self.beta,
                gamma: self.gamma,
            });
        }

        let (cos_alpha, cos_beta, cos_gamma) = (
            self.alpha.to_radians().cos(),
            self.beta.to_radians().cos(),
            self.gamma.to_radians().cos(),
        );
        let rotation = Matrix3::new(
            self.a,
            self.b * cos_gamma,
            self.c * cos_beta,
            0.0,
            self.b * sin_gamma,
            self.c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma,
            0.0,
            0.0,
            self.c * volume_factor / sin_gamma,
        );

        Ok(TransformationMatrix::from_rotation_translation(
            &rotation,
            &Vector3::zeros(),
        ))
    }

    /// The matrix taking Cartesian coordinates to fractional coordinates.
    pub fn fractionalization(&self) -> Result<TransformationMatrix, UnitCellError> {
        Ok(self.orthogonalization()?.inverse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn orthorhombic_cell_is_diagonal() {
        let cell = UnitCell::new(10.0, 20.0, 30.0, 90.0, 90.0, 90.0);
        let m = cell.orthogonalization().unwrap();
        assert!((m.get(0, 0) - 10.0).abs() < 1e-9);
        assert!((m.get(1, 1) - 20.0).abs() < 1e-9);
        assert!((m.get(2, 2) - 30.0).abs() < 1e-9);
        assert!(m.get(0, 1).abs() < 1e-9);
        assert!((cell.volume() - 6000.0).abs() < 1e-6);
    }

    #[test]
    fn fractionalization_inverts_orthogonalization() {
        let cell = UnitCell::new(52.3, 61.9, 40.1, 90.0, 103.5, 90.0);
        let p = Point3::new(0.25, 0.5, 0.75);
        let cartesian = cell.orthogonalization().unwrap().transform_point(&p);
        let back = cell.fractionalization().unwrap().transform_point(&cartesian);
        assert!((back - p).norm() < 1e-9);
    }

    #[test]
    fn hexagonal_cell_places_b_in_xy_plane() {
        let cell = UnitCell::new(10.0, 10.0, 15.0, 90.0, 90.0, 120.0);
        let b = cell
            .orthogonalization()
            .unwrap()
            .transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert!((b.x + 5.0).abs() < 1e-9);
        assert!(b.z.abs() < 1e-9);
        assert!(((b.x * b.x + b.y * b.y).sqrt() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_cells_are_rejected() {
        assert!(matches!(
            UnitCell::new(0.0, 1.0, 1.0, 90.0, 90.0, 90.0).orthogonalization(),
            Err(UnitCellError::NonPositiveEdge { .. })
        ));
        assert!(matches!(
            UnitCell::new(1.0, 1.0, 1.0, 90.0, 90.0, 180.0).orthogonalization(),
            Err(UnitCellError::DegenerateAngles { .. })
        ));
    }
}
