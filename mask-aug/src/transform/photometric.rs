//! Intensity perturbations. They require a floating point image and never
//! touch annotations.

use super::{should_apply, Transform};
use crate::{common::*, Sample};

fn check_factor_range(name: &str, range: (R64, R64)) -> Result<(f64, f64)> {
    let (lo, hi) = range;
    ensure!(
        lo >= 0.0,
        "{} factor lower bound must be non-negative, but get {}",
        name,
        lo
    );
    ensure!(
        lo <= hi,
        "{} factor lower bound {} exceeds upper bound {}",
        name,
        lo,
        hi
    );
    Ok((lo.raw(), hi.raw()))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdjustBrightnessInit {
    pub rate: Ratio,
    /// Inclusive range of the multiplicative factor.
    pub range: (R64, R64),
}

impl AdjustBrightnessInit {
    pub fn build(self) -> Result<AdjustBrightness> {
        let Self { rate, range } = self;
        let (min_factor, max_factor) = check_factor_range("brightness", range)?;
        Ok(AdjustBrightness {
            rate,
            min_factor,
            max_factor,
        })
    }
}

impl Default for AdjustBrightnessInit {
    fn default() -> Self {
        Self {
            rate: Ratio::half(),
            range: (r64(0.3), r64(1.7)),
        }
    }
}

/// Randomly scales pixel intensities, `clamp(image * f, 0, 1)`.
#[derive(Debug, Clone)]
pub struct AdjustBrightness {
    rate: Ratio,
    min_factor: f64,
    max_factor: f64,
}

impl Transform for AdjustBrightness {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        if !should_apply(self.rate, rng) {
            return Ok(sample);
        }

        let factor = rng.gen_range(self.min_factor..=self.max_factor);
        trace!("brightness factor {}", factor);
        let image = sample.image.f_adjust_brightness(factor)?;
        Ok(Sample { image, ..sample })
    }

    fn name(&self) -> &'static str {
        "AdjustBrightness"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdjustContrastInit {
    pub rate: Ratio,
    /// Inclusive range of the blending factor.
    pub range: (R64, R64),
}

impl AdjustContrastInit {
    pub fn build(self) -> Result<AdjustContrast> {
        let Self { rate, range } = self;
        let (min_factor, max_factor) = check_factor_range("contrast", range)?;
        Ok(AdjustContrast {
            rate,
            min_factor,
            max_factor,
        })
    }
}

impl Default for AdjustContrastInit {
    fn default() -> Self {
        Self {
            rate: Ratio::half(),
            range: (r64(0.3), r64(1.7)),
        }
    }
}

/// Randomly blends the image with its mean gray level,
/// `clamp(f * image + (1 - f) * mean(gray(image)), 0, 1)`.
#[derive(Debug, Clone)]
pub struct AdjustContrast {
    rate: Ratio,
    min_factor: f64,
    max_factor: f64,
}

impl Transform for AdjustContrast {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        if !should_apply(self.rate, rng) {
            return Ok(sample);
        }

        let factor = rng.gen_range(self.min_factor..=self.max_factor);
        trace!("contrast factor {}", factor);
        let image = sample.image.f_adjust_contrast(factor)?;
        Ok(Sample { image, ..sample })
    }

    fn name(&self) -> &'static str {
        "AdjustContrast"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: Kind) -> Sample {
        let image = Tensor::rand(&[3, 6, 6], (Kind::Float, Device::Cpu)).to_kind(kind);
        let masks = Tensor::zeros(&[2, 6, 6], (Kind::Bool, Device::Cpu));
        let _ = masks.get(1).narrow(0, 1, 2).fill_(1i64);
        let boxes = Tensor::of_slice(&[0.0f32, 0.0, 0.0, 0.0, 0.0, 1.0, 5.0, 2.0]).view([2, 4]);
        let labels = Tensor::of_slice(&[4i64, 2]);
        Sample::new(image, masks, boxes, labels).unwrap()
    }

    #[test]
    fn factor_range_validation() {
        let brightness = |lo: f64, hi: f64| AdjustBrightnessInit {
            rate: Ratio::half(),
            range: (r64(lo), r64(hi)),
        };
        assert!(brightness(1.2, 0.8).build().is_err());
        assert!(brightness(-0.1, 0.8).build().is_err());
        assert!(brightness(1.0, 1.0).build().is_ok());

        let contrast = AdjustContrastInit {
            rate: Ratio::half(),
            range: (r64(2.0), r64(1.0)),
        };
        assert!(contrast.build().is_err());
    }

    #[test]
    fn photometric_leaves_annotations_alone() {
        let stages: Vec<Box<dyn Transform>> = vec![
            Box::new(
                AdjustBrightnessInit {
                    rate: Ratio::one(),
                    ..Default::default()
                }
                .build()
                .unwrap(),
            ),
            Box::new(
                AdjustContrastInit {
                    rate: Ratio::one(),
                    ..Default::default()
                }
                .build()
                .unwrap(),
            ),
        ];
        let mut rng = StdRng::seed_from_u64(3);

        for stage in stages {
            let input = sample(Kind::Float);
            let output = stage.apply(input.shallow_clone(), &mut rng).unwrap();
            assert!(output.masks.equal(&input.masks));
            assert!(output.boxes.equal(&input.boxes));
            assert!(output.labels.equal(&input.labels));

            let min = output.image.min().double_value(&[]);
            let max = output.image.max().double_value(&[]);
            assert!(min >= 0.0 && max <= 1.0);
        }
    }

    #[test]
    fn photometric_rejects_raw_image() {
        let brightness = AdjustBrightnessInit {
            rate: Ratio::one(),
            ..Default::default()
        }
        .build()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(brightness.apply(sample(Kind::Uint8), &mut rng).is_err());
    }
}
