use lincomb_kernel::{Tolerance, Vec2};
use nalgebra::{Matrix2, Vector2};

use crate::projector::Direction;

/// Closed-form solver for `k_a * a + k_c * c = r` with fixed `a` and `c`.
///
/// Uses Cramer's rule on the 2x2 matrix whose columns are `a` and `c`.
/// The determinant is the signed area spanned by the two directions and is
/// zero exactly when they are parallel.
#[derive(Debug, Clone, Copy)]
pub struct LinearSolver2 {
    a: Vector2<f64>,
    c: Vector2<f64>,
    det: f64,
}

impl LinearSolver2 {
    pub fn new(a: &Direction, c: &Direction) -> Self {
        let a: Vector2<f64> = a.vector().into();
        let c: Vector2<f64> = c.vector().into();
        let det = Matrix2::from_columns(&[a, c]).determinant();
        Self { a, c, det }
    }

    pub fn determinant(&self) -> f64 {
        self.det
    }

    /// Singular when the two directions are parallel within
    /// `tol.degenerate_sine`. The determinant is compared against
    /// `|a| |c|` so the check does not depend on how long the directions are.
    /// An exactly zero determinant is singular under any tolerance.
    pub fn is_singular(&self, tol: &Tolerance) -> bool {
        let scale = self.a.norm() * self.c.norm();
        self.det == 0.0 || self.det.abs() < tol.degenerate_sine * scale
    }

    /// Solve for `(k_a, k_c)`. Returns `None` for a singular system rather
    /// than dividing by a vanishing determinant.
    pub fn solve(&self, r: Vec2, tol: &Tolerance) -> Option<(f64, f64)> {
        if self.is_singular(tol) {
            return None;
        }
        let r: Vector2<f64> = r.into();
        let k_a = Matrix2::from_columns(&[r, self.c]).determinant() / self.det;
        let k_c = Matrix2::from_columns(&[self.a, r]).determinant() / self.det;
        Some((k_a, k_c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(x: f64, y: f64) -> Direction {
        Direction::new("test", Vec2::new(x, y)).unwrap()
    }

    #[test]
    fn test_determinant_matches_cross() {
        let s = LinearSolver2::new(&dir(2.0, 3.0), &dir(3.0, 1.0));
        assert!((s.determinant() + 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_reference_residual() {
        // b - k1*a1 with k1 = -1: (4,2) + (1,2) = (5,4)
        let s = LinearSolver2::new(&dir(2.0, 3.0), &dir(3.0, 1.0));
        let (k2, k3) = s.solve(Vec2::new(5.0, 4.0), &Tolerance::default()).unwrap();
        assert!((k2 - 1.0).abs() < 1e-12);
        assert!((k3 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_zero_residual() {
        let s = LinearSolver2::new(&dir(1.0, 2.0), &dir(3.0, 1.0));
        let (ka, kc) = s.solve(Vec2::ZERO, &Tolerance::default()).unwrap();
        assert!(ka.abs() < 1e-12);
        assert!(kc.abs() < 1e-12);
    }

    #[test]
    fn test_parallel_is_singular() {
        let tol = Tolerance::default();
        let s = LinearSolver2::new(&dir(1.0, 2.0), &dir(2.0, 4.0));
        assert!(s.is_singular(&tol));
        assert!(s.solve(Vec2::new(1.0, 1.0), &tol).is_none());

        let anti = LinearSolver2::new(&dir(1.0, 2.0), &dir(-0.5, -1.0));
        assert!(anti.solve(Vec2::new(1.0, 1.0), &tol).is_none());
    }

    #[test]
    fn test_zero_determinant_is_singular_without_threshold() {
        let tol = Tolerance {
            degenerate_sine: 0.0,
            ..Tolerance::default()
        };
        let s = LinearSolver2::new(&dir(1.0, 2.0), &dir(2.0, 4.0));
        assert_eq!(s.determinant(), 0.0);
        assert!(s.is_singular(&tol));
        assert!(s.solve(Vec2::new(1.0, 1.0), &tol).is_none());
    }

    #[test]
    fn test_singular_check_ignores_length() {
        let tol = Tolerance::default();
        // Tiny but perpendicular directions are well-conditioned.
        let s = LinearSolver2::new(&dir(1e-6, 0.0), &dir(0.0, 1e-6));
        assert!(!s.is_singular(&tol));
        let (ka, kc) = s.solve(Vec2::new(1e-6, 2e-6), &tol).unwrap();
        assert!((ka - 1.0).abs() < 1e-9);
        assert!((kc - 2.0).abs() < 1e-9);
    }
}
