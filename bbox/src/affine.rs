use crate::{common::*, HW};

/// A 2-D affine map acting on `[x, y]` pixel coordinates.
///
/// ```text
/// | x' |   | a  b  tx |   | x |
/// | y' | = | c  d  ty | * | y |
/// | 1  |   | 0  0  1  |   | 1 |
/// ```
///
/// The `y` axis points down, so a positive rotation angle turns the image
/// clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine<T> {
    pub a: T,
    pub b: T,
    pub c: T,
    pub d: T,
    pub tx: T,
    pub ty: T,
}

impl<T> Affine<T>
where
    T: Float,
{
    pub fn identity() -> Self {
        let zero = T::zero();
        let one = T::one();
        Self {
            a: one,
            b: zero,
            c: zero,
            d: one,
            tx: zero,
            ty: zero,
        }
    }

    pub fn translation(tx: T, ty: T) -> Self {
        Self {
            tx,
            ty,
            ..Self::identity()
        }
    }

    pub fn scaling(sx: T, sy: T) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    pub fn rotation_degrees(angle: T) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self {
            a: cos,
            b: -sin,
            c: sin,
            d: cos,
            ..Self::identity()
        }
    }

    /// Shear parallel to the x axis, `x' = x + tan(angle) * y`.
    pub fn shear_x_degrees(angle: T) -> Self {
        Self {
            b: angle.to_radians().tan(),
            ..Self::identity()
        }
    }

    /// Mirrors columns of an image `width` pixels wide, `x' = W - 1 - x`.
    pub fn horizontal_flip(width: T) -> Self {
        Self {
            a: -T::one(),
            tx: width - T::one(),
            ..Self::identity()
        }
    }

    /// Mirrors rows of an image `height` pixels tall, `y' = H - 1 - y`.
    pub fn vertical_flip(height: T) -> Self {
        Self {
            d: -T::one(),
            ty: height - T::one(),
            ..Self::identity()
        }
    }

    /// Maps pixel indices of a `src`-sized image onto a `tgt`-sized one,
    /// aligning pixel centers the way half-pixel resampling does.
    pub fn resize(src: &HW<T>, tgt: &HW<T>) -> Result<Self> {
        ensure!(
            !src.is_empty(),
            "cannot derive a resize map from an empty source extent"
        );
        let half = T::from(0.5).unwrap_or_else(T::zero);
        let sx = tgt.w() / src.w();
        let sy = tgt.h() / src.h();

        Ok(Self {
            a: sx,
            d: sy,
            tx: half * sx - half,
            ty: half * sy - half,
            ..Self::identity()
        })
    }

    /// Applies `self` first and `next` after it.
    pub fn then(&self, next: &Self) -> Self {
        Self {
            a: next.a * self.a + next.b * self.c,
            b: next.a * self.b + next.b * self.d,
            c: next.c * self.a + next.d * self.c,
            d: next.c * self.b + next.d * self.d,
            tx: next.a * self.tx + next.b * self.ty + next.tx,
            ty: next.c * self.tx + next.d * self.ty + next.ty,
        }
    }

    /// Conjugates the map so that it pivots on `center` instead of the origin.
    pub fn about(&self, center: [T; 2]) -> Self {
        let [cx, cy] = center;
        Self::translation(-cx, -cy)
            .then(self)
            .then(&Self::translation(cx, cy))
    }

    pub fn determinant(&self) -> T {
        self.a * self.d - self.b * self.c
    }

    pub fn try_inverse(&self) -> Result<Self> {
        let det = self.determinant();
        ensure!(
            det.is_normal(),
            "the affine map is singular (determinant {:?})",
            det.to_f64()
        );

        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;

        Ok(Self {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + b * self.ty),
            ty: -(c * self.tx + d * self.ty),
        })
    }

    pub fn apply(&self, point: [T; 2]) -> [T; 2] {
        let [x, y] = point;
        [
            self.a * x + self.b * y + self.tx,
            self.c * x + self.d * y + self.ty,
        ]
    }
}

impl<T> Default for Affine<T>
where
    T: Float,
{
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_point_eq(lhs: [f64; 2], rhs: [f64; 2]) {
        assert_abs_diff_eq!(lhs[0], rhs[0], epsilon = 1e-9);
        assert_abs_diff_eq!(lhs[1], rhs[1], epsilon = 1e-9);
    }

    #[test]
    fn flip_is_involution() {
        let flip = Affine::<f64>::horizontal_flip(10.0);
        assert_point_eq(flip.apply([0.0, 3.0]), [9.0, 3.0]);
        assert_point_eq(flip.then(&flip).apply([4.0, 7.0]), [4.0, 7.0]);

        let flip = Affine::<f64>::vertical_flip(5.0);
        assert_point_eq(flip.apply([2.0, 4.0]), [2.0, 0.0]);
    }

    #[test]
    fn then_applies_in_order() {
        let scale = Affine::scaling(2.0, 3.0);
        let shift = Affine::translation(1.0, -1.0);
        // scale first, then shift
        assert_point_eq(scale.then(&shift).apply([1.0, 1.0]), [3.0, 2.0]);
        // shift first, then scale
        assert_point_eq(shift.then(&scale).apply([1.0, 1.0]), [4.0, 0.0]);
    }

    #[test]
    fn rotation_about_center_fixes_center() {
        let rot = Affine::rotation_degrees(37.0).about([4.5, 2.0]);
        assert_point_eq(rot.apply([4.5, 2.0]), [4.5, 2.0]);
        assert_point_eq(Affine::rotation_degrees(90.0).apply([1.0, 0.0]), [0.0, 1.0]);
    }

    #[test]
    fn inverse_roundtrip() {
        let map = Affine::scaling(1.3, 1.3)
            .then(&Affine::shear_x_degrees(20.0))
            .then(&Affine::rotation_degrees(-75.0))
            .about([31.5, 12.0]);
        let inv = map.try_inverse().unwrap();
        assert_point_eq(inv.apply(map.apply([3.0, 8.0])), [3.0, 8.0]);
        assert_abs_diff_eq!(map.then(&inv).determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn singular_map_has_no_inverse() {
        assert!(Affine::scaling(0.0, 1.0).try_inverse().is_err());
    }

    #[test]
    fn resize_aligns_pixel_centers() {
        let src = HW::try_from_hw([10.0, 10.0]).unwrap();
        let tgt = HW::try_from_hw([20.0, 5.0]).unwrap();
        let map = Affine::resize(&src, &tgt).unwrap();
        // the outer edges of the grid map onto each other
        assert_point_eq(map.apply([-0.5, -0.5]), [-0.5, -0.5]);
        assert_point_eq(map.apply([9.5, 9.5]), [4.5, 19.5]);
    }
}
