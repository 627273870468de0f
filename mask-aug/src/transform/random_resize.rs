use super::{should_apply, Transform};
use crate::{
    common::*,
    geometry::{map_keypoints, resize_boxes},
    Sample,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RandomResizeInit {
    pub rate: Ratio,
    /// Inclusive lower bound of the shorter edge.
    pub min_size: i64,
    /// Exclusive upper bound of the shorter edge.
    pub max_size: i64,
}

impl RandomResizeInit {
    pub fn build(self) -> Result<RandomResize> {
        let Self {
            rate,
            min_size,
            max_size,
        } = self;

        ensure!(
            min_size > 0,
            "min_size must be positive, but get {}",
            min_size
        );
        ensure!(
            min_size < max_size,
            "the size range [{}, {}) is empty",
            min_size,
            max_size
        );

        Ok(RandomResize {
            rate,
            min_size,
            max_size,
        })
    }
}

impl Default for RandomResizeInit {
    fn default() -> Self {
        Self {
            rate: Ratio::half(),
            min_size: 300,
            max_size: 1440,
        }
    }
}

/// Randomly rescales the sample so that its shorter edge hits a drawn size.
#[derive(Debug, Clone)]
pub struct RandomResize {
    rate: Ratio,
    min_size: i64,
    max_size: i64,
}

impl RandomResize {
    /// Resizes the sample so that the shorter edge becomes `size`.
    pub fn resize(sample: Sample, size: i64) -> Result<Sample> {
        let orig_size = sample.spatial_size()?;
        let new_size = orig_size.resize_shorter_edge(size)?;
        if new_size == orig_size {
            return Ok(sample);
        }

        let Sample {
            image,
            masks,
            boxes,
            labels,
            keypoints,
        } = sample;

        let affine = {
            let src: HW<f64> = orig_size
                .try_cast()
                .ok_or_else(|| format_err!("size is not representable"))?;
            let tgt: HW<f64> = new_size
                .try_cast()
                .ok_or_else(|| format_err!("size is not representable"))?;
            Affine::resize(&src, &tgt)?
        };

        let image = image.f_resize2d_exact(&new_size, Interpolation::Bilinear)?;
        let masks = masks.f_resize2d_exact(&new_size, Interpolation::Nearest)?;
        let boxes = resize_boxes(&boxes, &orig_size, &new_size)?;
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
}

impl Transform for RandomResize {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        if !should_apply(self.rate, rng) {
            return Ok(sample);
        }

        let size = rng.gen_range(self.min_size..self.max_size);
        trace!("resize shorter edge to {}", size);
        Self::resize(sample, size)
    }

    fn name(&self) -> &'static str {
        "RandomResize"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_range_validation() {
        let init = |min_size, max_size| RandomResizeInit {
            rate: Ratio::half(),
            min_size,
            max_size,
        };
        assert!(init(10, 10).build().is_err());
        assert!(init(20, 10).build().is_err());
        assert!(init(0, 10).build().is_err());
        assert!(init(10, 11).build().is_ok());
    }

    #[test]
    fn resize_keeps_masks_aligned_and_exact() {
        let image = Tensor::rand(&[3, 20, 40], (Kind::Float, Device::Cpu));
        let masks = Tensor::zeros(&[1, 20, 40], (Kind::Int64, Device::Cpu));
        let _ = masks.get(0).narrow(0, 4, 8).narrow(1, 10, 20).fill_(7i64);
        let boxes = Tensor::of_slice(&[10.0f32, 4.0, 29.0, 11.0]).view([1, 4]);
        let labels = Tensor::of_slice(&[1i64]);
        let sample = Sample::new(image, masks, boxes, labels).unwrap();

        let resize = RandomResizeInit {
            rate: Ratio::one(),
            min_size: 10,
            max_size: 11,
        }
        .build()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let output = resize.apply(sample, &mut rng).unwrap();

        assert_eq!(output.image.size(), vec![3, 10, 20]);
        assert_eq!(output.masks.size(), vec![1, 10, 20]);
        assert_eq!(output.masks.kind(), Kind::Int64);
        output.check().unwrap();

        let values: Vec<i64> = output.masks.reshape(&[-1]).into();
        assert!(values.iter().all(|&val| val == 0 || val == 7));

        let boxes: Vec<f32> = output.boxes.reshape(&[-1]).into();
        assert_eq!(boxes, vec![5.0, 2.0, 14.0, 5.0]);
    }

    #[test]
    fn resized_boxes_match_resized_masks() {
        let cases = [
            // (height, width, box, shorter edge)
            (10, 10, [0, 2, 9, 3], 25),
            (10, 10, [3, 3, 6, 7], 4),
            (17, 30, [5, 1, 22, 13], 13),
            (17, 30, [0, 0, 29, 16], 41),
            (24, 9, [2, 7, 6, 19], 7),
        ];

        for (height, width, [x_min, y_min, x_max, y_max], size) in cases {
            let image = Tensor::rand(&[3, height, width], (Kind::Float, Device::Cpu));
            let masks = Tensor::zeros(&[1, height, width], (Kind::Uint8, Device::Cpu));
            let _ = masks
                .get(0)
                .narrow(0, y_min, y_max - y_min + 1)
                .narrow(1, x_min, x_max - x_min + 1)
                .fill_(1i64);
            let boxes = Tensor::of_slice(&[x_min, y_min, x_max, y_max])
                .to_kind(Kind::Float)
                .view([1, 4]);
            let labels = Tensor::of_slice(&[1i64]);
            let sample = Sample::new(image, masks, boxes, labels).unwrap();

            let output = RandomResize::resize(sample, size).unwrap();
            let expect = crate::box_from_mask(&output.masks.get(0)).unwrap().xyxy();
            let boxes: Vec<f32> = output.boxes.reshape(&[-1]).into();
            let boxes: Vec<i64> = boxes.into_iter().map(|val| val as i64).collect();
            assert_eq!(boxes, expect.to_vec(), "{}x{} to {}", height, width, size);
        }
    }
}
