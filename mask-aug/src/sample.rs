use crate::common::*;

/// One training example.
///
/// - `image`: `[C, H, W]`, or a raw `[H, W]` buffer before [ToTensor](crate::ToTensor).
/// - `masks`: `[I, H, W]`, zero is background.
/// - `boxes`: `[I, 4]` rows of `[x_min, y_min, x_max, y_max]`, max inclusive.
/// - `labels`: `[I]` class ids.
/// - `keypoints`: `[I, K, 3]` rows of `(x, y, score)`.
#[derive(Debug, TensorLike)]
pub struct Sample {
    pub image: Tensor,
    pub masks: Tensor,
    pub boxes: Tensor,
    pub labels: Tensor,
    pub keypoints: Option<Tensor>,
}

impl Sample {
    pub const IMAGE_KEY: &'static str = "image";
    pub const MASKS_KEY: &'static str = "masks";
    pub const BOXES_KEY: &'static str = "boxes";
    pub const LABELS_KEY: &'static str = "labels";
    pub const KEYPOINTS_KEY: &'static str = "keypoints";

    pub fn new(image: Tensor, masks: Tensor, boxes: Tensor, labels: Tensor) -> Result<Self> {
        let sample = Self {
            image,
            masks,
            boxes,
            labels,
            keypoints: None,
        };
        sample.check()?;
        Ok(sample)
    }

    pub fn with_keypoints(self, keypoints: Tensor) -> Result<Self> {
        let sample = Self {
            keypoints: Some(keypoints),
            ..self
        };
        sample.check()?;
        Ok(sample)
    }

    /// Builds a sample from a string-keyed tensor map. Unknown keys are ignored.
    pub fn from_map(mut map: HashMap<String, Tensor>) -> Result<Self> {
        let mut take = |key: &str| {
            map.remove(key)
                .ok_or_else(|| format_err!("the required key '{}' is missing", key))
        };
        let image = take(Self::IMAGE_KEY)?;
        let masks = take(Self::MASKS_KEY)?;
        let boxes = take(Self::BOXES_KEY)?;
        let labels = take(Self::LABELS_KEY)?;
        let keypoints = map.remove(Self::KEYPOINTS_KEY);

        let sample = Self {
            image,
            masks,
            boxes,
            labels,
            keypoints,
        };
        sample.check()?;
        Ok(sample)
    }

    pub fn into_map(self) -> HashMap<String, Tensor> {
        let Self {
            image,
            masks,
            boxes,
            labels,
            keypoints,
        } = self;

        let mut map = HashMap::new();
        map.insert(Self::IMAGE_KEY.to_string(), image);
        map.insert(Self::MASKS_KEY.to_string(), masks);
        map.insert(Self::BOXES_KEY.to_string(), boxes);
        map.insert(Self::LABELS_KEY.to_string(), labels);
        if let Some(keypoints) = keypoints {
            map.insert(Self::KEYPOINTS_KEY.to_string(), keypoints);
        }
        map
    }

    /// Verifies the shape invariants that tie the fields together.
    pub fn check(&self) -> Result<()> {
        let image_size = self.spatial_size()?;

        let (num_masks, mask_h, mask_w) = match self.masks.size().as_slice() {
            &[i, h, w] => (i, h, w),
            shape => bail!("masks must have shape [I, H, W], but get {:?}", shape),
        };
        ensure!(
            [mask_h, mask_w] == image_size.hw(),
            "masks of spatial size {:?} do not match the image size {:?}",
            [mask_h, mask_w],
            image_size.hw()
        );

        match self.boxes.size().as_slice() {
            &[n, 4] => ensure!(
                n == num_masks,
                "expect {} boxes, but get {}",
                num_masks,
                n
            ),
            shape => bail!("boxes must have shape [I, 4], but get {:?}", shape),
        }
        ensure!(
            is_floating_kind(self.boxes.kind()),
            "boxes must be floating point, but get {:?}",
            self.boxes.kind()
        );

        match self.labels.size().as_slice() {
            &[n] => ensure!(
                n == num_masks,
                "expect {} labels, but get {}",
                num_masks,
                n
            ),
            shape => bail!("labels must have shape [I], but get {:?}", shape),
        }

        if let Some(keypoints) = &self.keypoints {
            match keypoints.size().as_slice() {
                &[n, _k, 3] => ensure!(
                    n == num_masks,
                    "expect keypoints for {} instances, but get {}",
                    num_masks,
                    n
                ),
                shape => bail!("keypoints must have shape [I, K, 3], but get {:?}", shape),
            }
        }

        Ok(())
    }

    pub fn num_instances(&self) -> i64 {
        self.masks.size().first().cloned().unwrap_or(0)
    }

    /// Height and width of the image.
    pub fn spatial_size(&self) -> Result<HW<i64>> {
        match self.image.dim() {
            2 | 3 => self.image.spatial_size(),
            _ => bail!(
                "image must have shape [C, H, W] or [H, W], but get {:?}",
                self.image.size()
            ),
        }
    }
}
