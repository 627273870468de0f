use super::{should_apply, Transform};
use crate::{
    common::*,
    geometry::{map_boxes, map_keypoints},
    Sample,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FlipAxis {
    Vertical,
    Horizontal,
}

/// Mirrors every spatial field. Boxes and keypoints are mapped exactly.
fn flip_sample(sample: Sample, axis: FlipAxis) -> Result<Sample> {
    let size = sample.spatial_size()?;
    let Sample {
        image,
        masks,
        boxes,
        labels,
        keypoints,
    } = sample;

    let (dim, affine) = match axis {
        FlipAxis::Vertical => (-2, Affine::vertical_flip(size.h() as f64)),
        FlipAxis::Horizontal => (-1, Affine::horizontal_flip(size.w() as f64)),
    };

    let (image, masks) = tch::no_grad(|| -> Result<_> {
        Ok((image.f_flip(&[dim])?, masks.f_flip(&[dim])?))
    })?;
    let boxes = map_boxes(&boxes, &affine, &size)?;
    let keypoints = keypoints
        .map(|keypoints| map_keypoints(&keypoints, &affine))
        .transpose()?;

    Ok(Sample {
        image,
        masks,
        boxes,
        labels,
        keypoints,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerticalFlipInit {
    pub rate: Ratio,
}

impl VerticalFlipInit {
    pub fn build(self) -> Result<VerticalFlip> {
        let Self { rate } = self;
        Ok(VerticalFlip { rate })
    }
}

impl Default for VerticalFlipInit {
    fn default() -> Self {
        Self {
            rate: Ratio::half(),
        }
    }
}

/// Randomly flips the sample upside down.
#[derive(Debug, Clone)]
pub struct VerticalFlip {
    rate: Ratio,
}

impl Transform for VerticalFlip {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        if !should_apply(self.rate, rng) {
            return Ok(sample);
        }
        flip_sample(sample, FlipAxis::Vertical)
    }

    fn name(&self) -> &'static str {
        "VerticalFlip"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HorizontalFlipInit {
    pub rate: Ratio,
}

impl HorizontalFlipInit {
    pub fn build(self) -> Result<HorizontalFlip> {
        let Self { rate } = self;
        Ok(HorizontalFlip { rate })
    }
}

impl Default for HorizontalFlipInit {
    fn default() -> Self {
        Self {
            rate: Ratio::half(),
        }
    }
}

/// Randomly mirrors the sample left to right.
#[derive(Debug, Clone)]
pub struct HorizontalFlip {
    rate: Ratio,
}

impl Transform for HorizontalFlip {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        if !should_apply(self.rate, rng) {
            return Ok(sample);
        }
        flip_sample(sample, FlipAxis::Horizontal)
    }

    fn name(&self) -> &'static str {
        "HorizontalFlip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sample {
        let image = Tensor::arange(2 * 4 * 6, (Kind::Float, Device::Cpu)).view([2, 4, 6]) / 48.0;
        let masks = Tensor::zeros(&[1, 4, 6], (Kind::Uint8, Device::Cpu));
        let _ = masks.get(0).get(1).narrow(0, 0, 2).fill_(1i64);
        let boxes = Tensor::of_slice(&[0.0f32, 1.0, 1.0, 1.0]).view([1, 4]);
        let labels = Tensor::of_slice(&[3i64]);
        let keypoints = Tensor::of_slice(&[0.0f32, 1.0, 1.0]).view([1, 1, 3]);
        Sample::new(image, masks, boxes, labels)
            .unwrap()
            .with_keypoints(keypoints)
            .unwrap()
    }

    #[test]
    fn horizontal_flip_moves_annotations() {
        let flip = HorizontalFlipInit {
            rate: Ratio::one(),
        }
        .build()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let output = flip.apply(sample(), &mut rng).unwrap();

        assert_eq!(output.masks.int64_value(&[0, 1, 5]), 1);
        assert_eq!(output.masks.int64_value(&[0, 1, 0]), 0);
        let boxes: Vec<f32> = output.boxes.reshape(&[-1]).into();
        assert_eq!(boxes, vec![4.0, 1.0, 5.0, 1.0]);
        assert_eq!(output.keypoints.unwrap().double_value(&[0, 0, 0]), 5.0);
    }

    #[test]
    fn vertical_flip_twice_is_identity() {
        let flip = VerticalFlipInit {
            rate: Ratio::one(),
        }
        .build()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let input = sample();
        let output = flip
            .apply(input.shallow_clone(), &mut rng)
            .and_then(|sample| flip.apply(sample, &mut rng))
            .unwrap();

        assert!(output.image.equal(&input.image));
        assert!(output.masks.equal(&input.masks));
        assert!(output.boxes.equal(&input.boxes));
    }
}
