use super::{should_apply, Transform};
use crate::{
    common::*,
    geometry::{map_boxes, map_keypoints},
    Sample,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RandomAffineInit {
    pub rate: Ratio,
    /// Rotation range in degrees.
    pub angle: (R64, R64),
    /// Shear range in degrees, parallel to the x axis.
    pub shear: (R64, R64),
    /// Isotropic scaling range.
    pub scale: (R64, R64),
}

impl RandomAffineInit {
    pub fn build(self) -> Result<RandomAffine> {
        let Self {
            rate,
            angle,
            shear,
            scale,
        } = self;

        let check_range = |name: &str, (lo, hi): (R64, R64)| -> Result<(f64, f64)> {
            ensure!(
                lo <= hi,
                "{} lower bound {} exceeds upper bound {}",
                name,
                lo,
                hi
            );
            Ok((lo.raw(), hi.raw()))
        };

        let angle = check_range("angle", angle)?;
        let shear = check_range("shear", shear)?;
        let scale = check_range("scale", scale)?;

        ensure!(
            shear.0 > -90.0 && shear.1 < 90.0,
            "shear must lie strictly within (-90, 90) degrees, but get {:?}",
            shear
        );
        ensure!(
            scale.0 > 0.0,
            "scale must be positive, but get {:?}",
            scale
        );

        Ok(RandomAffine {
            rate,
            angle,
            shear,
            scale,
        })
    }
}

impl Default for RandomAffineInit {
    fn default() -> Self {
        Self {
            rate: Ratio::half(),
            angle: (r64(-180.0), r64(180.0)),
            shear: (r64(-45.0), r64(45.0)),
            scale: (r64(0.9), r64(1.5)),
        }
    }
}

/// Randomly rotates, shears and scales the sample about the image center.
///
/// Masks are resampled with nearest neighbor so that their values survive.
/// Boxes only enclose the warped corners of the old boxes, so a
/// [CorrectBoxes](crate::CorrectBoxes) stage should follow.
#[derive(Debug, Clone)]
pub struct RandomAffine {
    rate: Ratio,
    angle: (f64, f64),
    shear: (f64, f64),
    scale: (f64, f64),
}

impl RandomAffine {
    /// The centered map `rotation ∘ shear ∘ scaling` for a frame of `size`.
    pub fn centered_affine(size: &HW<i64>, angle: f64, shear: f64, scale: f64) -> Affine<f64> {
        let center = [
            (size.w() - 1) as f64 / 2.0,
            (size.h() - 1) as f64 / 2.0,
        ];
        Affine::scaling(scale, scale)
            .then(&Affine::shear_x_degrees(shear))
            .then(&Affine::rotation_degrees(angle))
            .about(center)
    }

    /// Warps every spatial field of the sample through `affine`.
    pub fn warp(sample: Sample, affine: &Affine<f64>) -> Result<Sample> {
        let size = sample.spatial_size()?;
        let Sample {
            image,
            masks,
            boxes,
            labels,
            keypoints,
        } = sample;

        let image = image.f_warp_affine2d(affine, Interpolation::Bilinear)?;
        let masks = masks.f_warp_affine2d(affine, Interpolation::Nearest)?;
        let boxes = map_boxes(&boxes, affine, &size)?;
        let keypoints = keypoints
            .map(|keypoints| map_keypoints(&keypoints, affine))
            .transpose()?;

        Ok(Sample {
            image,
            masks,
            boxes,
            labels,
            keypoints,
        })
    }
}

impl Transform for RandomAffine {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        if !should_apply(self.rate, rng) {
            return Ok(sample);
        }

        let angle = rng.gen_range(self.angle.0..=self.angle.1);
        let shear = rng.gen_range(self.shear.0..=self.shear.1);
        let scale = rng.gen_range(self.scale.0..=self.scale.1);
        trace!("affine angle={} shear={} scale={}", angle, shear, scale);

        let affine = Self::centered_affine(&sample.spatial_size()?, angle, shear, scale);
        Self::warp(sample, &affine)
    }

    fn name(&self) -> &'static str {
        "RandomAffine"
    }
}
