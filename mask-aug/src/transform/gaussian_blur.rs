use super::{should_apply, Transform};
use crate::{common::*, Sample};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GaussianBlurInit {
    pub rate: Ratio,
    /// Candidate kernel sizes, drawn uniformly with replacement.
    pub kernel_sizes: Vec<i64>,
}

impl GaussianBlurInit {
    pub fn build(self) -> Result<GaussianBlur> {
        let Self { rate, kernel_sizes } = self;

        ensure!(
            !kernel_sizes.is_empty(),
            "at least one kernel size must be given"
        );
        for &size in &kernel_sizes {
            ensure!(
                size > 0 && size % 2 == 1,
                "kernel sizes must be positive odd numbers, but get {}",
                size
            );
        }

        Ok(GaussianBlur { rate, kernel_sizes })
    }
}

impl Default for GaussianBlurInit {
    fn default() -> Self {
        Self {
            rate: Ratio::half(),
            kernel_sizes: vec![3, 5, 7],
        }
    }
}

/// Randomly blurs the image. Annotations are left untouched.
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    rate: Ratio,
    kernel_sizes: Vec<i64>,
}

impl Transform for GaussianBlur {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        if !should_apply(self.rate, rng) {
            return Ok(sample);
        }

        let kernel_size = *self
            .kernel_sizes
            .choose(rng)
            .ok_or_else(|| format_err!("no kernel size to choose from"))?;
        trace!("blur with kernel size {}", kernel_size);

        let image = sample.image.f_gaussian_blur2d(kernel_size)?;
        Ok(Sample { image, ..sample })
    }

    fn name(&self) -> &'static str {
        "GaussianBlur"
    }
}
