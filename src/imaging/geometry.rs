//! Pure geometry for the rotate → flip → crop pipeline.
//!
//! All functions here are pure and testable without any I/O or images.

use std::f64::consts::PI;

/// Convert degrees to radians.
///
/// No normalization: negative angles and angles beyond a full turn are
/// converted as-is.
///
/// ```
/// # use icon_ingest::imaging::to_radians;
/// assert!((to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
/// ```
pub fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Axis-aligned box that contains a rectangle after rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedBoundingBox {
    pub width: f64,
    pub height: f64,
}

/// Calculate the bounding box of a `width`×`height` rectangle rotated about
/// its center by `rotation_degrees`.
///
/// # Examples
/// ```
/// # use icon_ingest::imaging::rotated_bounding_box;
/// // Quarter turn swaps the sides
/// let bbox = rotated_bounding_box(400.0, 300.0, 90.0);
/// assert!((bbox.width - 300.0).abs() < 1e-9);
/// assert!((bbox.height - 400.0).abs() < 1e-9);
/// ```
pub fn rotated_bounding_box(width: f64, height: f64, rotation_degrees: f64) -> RotatedBoundingBox {
    let theta = to_radians(rotation_degrees);
    let (sin, cos) = theta.sin_cos();

    RotatedBoundingBox {
        width: (cos * width).abs() + (sin * height).abs(),
        height: (sin * width).abs() + (cos * height).abs(),
    }
}

/// 2D affine transform with HTML canvas semantics.
///
/// Stored as the matrix
///
/// ```text
/// | a  c  e |
/// | b  d  f |
/// | 0  0  1 |
/// ```
///
/// [`translate`](Self::translate), [`rotate`](Self::rotate) and
/// [`scale`](Self::scale) post-multiply, so the operation added last is the
/// first one applied to a drawn point, the same order `CanvasRenderingContext2D`
/// uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self × other`
    fn then(self, other: Transform2D) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn translate(self, tx: f64, ty: f64) -> Self {
        self.then(Self {
            e: tx,
            f: ty,
            ..Self::identity()
        })
    }

    /// Rotate by `radians`; positive is clockwise on a y-down surface.
    pub fn rotate(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        self.then(Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        })
    }

    pub fn scale(self, sx: f64, sy: f64) -> Self {
        self.then(Self {
            a: sx,
            d: sy,
            ..Self::identity()
        })
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    // =========================================================================
    // to_radians tests
    // =========================================================================

    #[test]
    fn radians_of_common_angles() {
        assert_close(to_radians(0.0), 0.0);
        assert_close(to_radians(90.0), PI / 2.0);
        assert_close(to_radians(-180.0), -PI);
    }

    #[test]
    fn radians_are_not_normalized() {
        assert_close(to_radians(720.0), 4.0 * PI);
    }

    // =========================================================================
    // rotated_bounding_box tests
    // =========================================================================

    #[test]
    fn bbox_zero_rotation_keeps_dimensions() {
        let bbox = rotated_bounding_box(640.0, 480.0, 0.0);
        assert_close(bbox.width, 640.0);
        assert_close(bbox.height, 480.0);
    }

    #[test]
    fn bbox_half_turn_keeps_dimensions() {
        let bbox = rotated_bounding_box(640.0, 480.0, 180.0);
        assert_close(bbox.width, 640.0);
        assert_close(bbox.height, 480.0);
    }

    #[test]
    fn bbox_quarter_turn_swaps_dimensions() {
        for degrees in [90.0, 450.0, -270.0] {
            let bbox = rotated_bounding_box(640.0, 480.0, degrees);
            assert_close(bbox.width, 480.0);
            assert_close(bbox.height, 640.0);
        }
    }

    #[test]
    fn bbox_square_at_45_inflates_by_sqrt2() {
        let bbox = rotated_bounding_box(100.0, 100.0, 45.0);
        assert_close(bbox.width, 100.0 * 2f64.sqrt());
        assert_close(bbox.height, 100.0 * 2f64.sqrt());
    }

    // =========================================================================
    // Transform2D tests
    // =========================================================================

    #[test]
    fn translate_then_scale_applies_scale_first() {
        // Canvas order: the last call is applied to the point first
        let t = Transform2D::identity().translate(10.0, 0.0).scale(2.0, 2.0);
        assert_eq!(t.apply(1.0, 1.0), (12.0, 2.0));
    }

    #[test]
    fn quarter_turn_is_clockwise_on_y_down_surface() {
        let t = Transform2D::identity().rotate(to_radians(90.0));
        let (x, y) = t.apply(1.0, 0.0);
        assert_close(x, 0.0);
        assert_close(y, 1.0);
    }

    #[test]
    fn invert_round_trips_points() {
        let t = Transform2D::identity()
            .translate(50.0, 20.0)
            .rotate(to_radians(33.0))
            .scale(-1.0, 1.0)
            .translate(-7.0, -3.0);
        let inv = t.invert().unwrap();
        let (x, y) = t.apply(12.5, -4.0);
        let (bx, by) = inv.apply(x, y);
        assert_close(bx, 12.5);
        assert_close(by, -4.0);
    }

    #[test]
    fn invert_singular_is_none() {
        let t = Transform2D::identity().scale(0.0, 1.0);
        assert!(t.invert().is_none());
    }
}
