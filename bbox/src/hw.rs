use crate::common::*;

/// Image extent as `(height, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HW<T> {
    h: T,
    w: T,
}

impl<T> HW<T> {
    pub fn try_cast<U>(self) -> Option<HW<U>>
    where
        T: ToPrimitive,
        U: NumCast,
    {
        Some(HW {
            h: U::from(self.h)?,
            w: U::from(self.w)?,
        })
    }
}

impl<T> HW<T>
where
    T: Num + PartialOrd + Copy,
{
    pub fn try_from_hw(hw: [T; 2]) -> Result<Self> {
        let [h, w] = hw;
        let zero = T::zero();
        ensure!(
            h >= zero && w >= zero,
            "height and width parameters must be non-negative"
        );
        Ok(Self { h, w })
    }

    pub fn area(&self) -> T {
        self.w * self.h
    }

    pub fn h(&self) -> T {
        self.h
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn hw(&self) -> [T; 2] {
        [self.h, self.w]
    }

    pub fn is_empty(&self) -> bool {
        self.h == T::zero() || self.w == T::zero()
    }
}

impl HW<i64> {
    /// Scales the extent so that its shorter side equals `size`, keeping the
    /// aspect ratio. The longer side is truncated toward zero.
    pub fn resize_shorter_edge(&self, size: i64) -> Result<Self> {
        ensure!(size > 0, "target size must be positive, but get {}", size);
        ensure!(!self.is_empty(), "cannot resize an empty extent");

        let Self { h, w } = *self;
        let (h, w) = if w < h {
            (size * h / w, size)
        } else {
            (size, size * w / h)
        };

        Ok(Self { h, w })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn size_area() {
        let size = HW::try_from_hw([3.0, 2.0]).unwrap();
        let area: f64 = size.area();
        assert_abs_diff_eq!(area, 6.0);
    }

    #[test]
    fn negative_extent_is_rejected() {
        assert!(HW::try_from_hw([-1, 4]).is_err());
    }

    #[test]
    fn resize_shorter_edge_keeps_aspect() {
        let landscape = HW::try_from_hw([100, 200]).unwrap();
        assert_eq!(landscape.resize_shorter_edge(300).unwrap().hw(), [300, 600]);

        let portrait = HW::try_from_hw([90, 60]).unwrap();
        assert_eq!(portrait.resize_shorter_edge(40).unwrap().hw(), [60, 40]);

        let square = HW::try_from_hw([50, 50]).unwrap();
        assert_eq!(square.resize_shorter_edge(7).unwrap().hw(), [7, 7]);
    }

    #[test]
    fn resize_shorter_edge_truncates() {
        let size = HW::try_from_hw([3, 4]).unwrap();
        // 5 * 4 / 3 = 6.67
        assert_eq!(size.resize_shorter_edge(5).unwrap().hw(), [5, 6]);
    }
}
