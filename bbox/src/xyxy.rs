use crate::{common::*, Affine, HW};

/// Axis-aligned box in `[x_min, y_min, x_max, y_max]` order.
///
/// Coordinates are pixel indices: `x` is the column and `y` is the row, and
/// both maxima are inclusive. A box covering the single pixel `(3, 5)` is
/// `[3, 5, 3, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XYXY<T> {
    pub(crate) x_min: T,
    pub(crate) y_min: T,
    pub(crate) x_max: T,
    pub(crate) y_max: T,
}

impl<T> XYXY<T>
where
    T: Copy + Num + PartialOrd,
{
    /// The all-zero box, used as the "empty instance" sentinel.
    pub fn zero() -> Self {
        let zero = T::zero();
        Self {
            x_min: zero,
            y_min: zero,
            x_max: zero,
            y_max: zero,
        }
    }

    pub fn try_from_xyxy(xyxy: [T; 4]) -> Result<Self> {
        let [x_min, y_min, x_max, y_max] = xyxy;
        ensure!(
            x_max >= x_min && y_max >= y_min,
            "x_max >= x_min and y_max >= y_min must hold"
        );
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// The tightest box enclosing all points, or `None` for an empty set.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [T; 2]>,
    {
        let mut points = points.into_iter();
        let [x, y] = points.next()?;
        let init = Self {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
        };

        let rect = points.fold(init, |rect, [x, y]| Self {
            x_min: if x < rect.x_min { x } else { rect.x_min },
            y_min: if y < rect.y_min { y } else { rect.y_min },
            x_max: if x > rect.x_max { x } else { rect.x_max },
            y_max: if y > rect.y_max { y } else { rect.y_max },
        });
        Some(rect)
    }

    pub fn x_min(&self) -> T {
        self.x_min
    }

    pub fn y_min(&self) -> T {
        self.y_min
    }

    pub fn x_max(&self) -> T {
        self.x_max
    }

    pub fn y_max(&self) -> T {
        self.y_max
    }

    pub fn xyxy(&self) -> [T; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// The four corners in clockwise order starting from the top-left.
    pub fn corners(&self) -> [[T; 2]; 4] {
        [
            [self.x_min, self.y_min],
            [self.x_max, self.y_min],
            [self.x_max, self.y_max],
            [self.x_min, self.y_max],
        ]
    }

    /// Clamp every coordinate into the pixel grid of a `frame`-sized image.
    pub fn clamp_to(&self, frame: &HW<T>) -> Self {
        let zero = T::zero();
        let x_last = frame.w() - T::one();
        let y_last = frame.h() - T::one();
        let clamp = |val: T, last: T| {
            if val < zero {
                zero
            } else if val > last {
                last
            } else {
                val
            }
        };

        Self {
            x_min: clamp(self.x_min, x_last),
            y_min: clamp(self.y_min, y_last),
            x_max: clamp(self.x_max, x_last),
            y_max: clamp(self.y_max, y_last),
        }
    }
}

impl<T> XYXY<T>
where
    T: Float,
{
    /// Maps the four corners and returns their enclosing box.
    pub fn transform(&self, affine: &Affine<T>) -> Self {
        let corners = self.corners().map(|point| affine.apply(point));
        // a non-empty corner set always has an enclosing box
        Self::enclosing(corners).unwrap_or(*self)
    }
}

impl<T> Serialize for XYXY<T>
where
    T: Copy + Num + PartialOrd + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.xyxy().serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for XYXY<T>
where
    T: Copy + Num + PartialOrd + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let xyxy = <[T; 4]>::deserialize(deserializer)?;
        Self::try_from_xyxy(xyxy).map_err(|err| D::Error::custom(format!("{:?}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn xyxy_rejects_inverted_box() {
        assert!(XYXY::try_from_xyxy([3, 1, 2, 4]).is_err());
        assert!(XYXY::try_from_xyxy([1, 1, 1, 1]).is_ok());
    }

    #[test]
    fn xyxy_enclosing_points() {
        let rect = XYXY::enclosing([[4, 2], [1, 7], [3, 3]]).unwrap();
        assert_eq!(rect.xyxy(), [1, 2, 4, 7]);
        assert_eq!(XYXY::<i64>::enclosing([]), None);
    }

    #[test]
    fn xyxy_clamp_to_frame() {
        let frame = HW::try_from_hw([10.0, 20.0]).unwrap();
        let rect = XYXY::try_from_xyxy([-3.0, 2.0, 25.0, 12.0]).unwrap();
        assert_eq!(rect.clamp_to(&frame).xyxy(), [0.0, 2.0, 19.0, 9.0]);
    }

    #[test]
    fn xyxy_transform_encloses_rotated_corners() {
        let rect = XYXY::try_from_xyxy([0.0, 0.0, 4.0, 2.0]).unwrap();
        let rotated = rect.transform(&Affine::rotation_degrees(90.0));
        let [x_min, y_min, x_max, y_max] = rotated.xyxy();
        assert_abs_diff_eq!(x_min, -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y_min, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(x_max, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y_max, 4.0, epsilon = 1e-9);
    }
}
