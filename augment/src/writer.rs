//! Output writer for augmented samples.

use crate::{common::*, config::OutputConfig};
use tch_tensor_like::TensorLike as _;

pub const MANIFEST_FILE_NAME: &str = "annotations.json";

/// One written sample in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Stem of the source image.
    pub source: String,
    pub repetition: usize,
    pub image: String,
    #[serde(default)]
    pub overlay: Option<String>,
    pub instances: Vec<InstanceAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceAnnotation {
    pub mask: String,
    pub label: i64,
    /// Inclusive `[x_min, y_min, x_max, y_max]` pixel box.
    pub bbox: [f32; 4],
    #[serde(default)]
    pub keypoints: Option<Vec<[f32; 3]>>,
}

#[derive(Debug, Clone)]
pub struct Writer {
    dir: PathBuf,
    draw_overlay: bool,
    keypoint_threshold: f64,
}

impl Writer {
    pub fn new<P>(dir: P, config: &OutputConfig) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            dir: dir.into(),
            draw_overlay: config.draw_overlay,
            keypoint_threshold: config.keypoint_threshold.raw(),
        }
    }

    /// Saves the image, one file per mask and optionally an overlay, all
    /// prefixed with `<stem>_<repetition>`.
    pub fn write(&self, stem: &str, repetition: usize, sample: &Sample) -> Result<ManifestEntry> {
        let sample = sample.to_device(Device::Cpu);
        let prefix = format!("{}_{}", stem, repetition);
        let num_instances = sample.num_instances();

        let image = to_uint8_image(&sample.image)?;
        let image_name = format!("{}.png", prefix);
        self.save(&image, &image_name)?;

        let boxes: Vec<f32> = sample
            .boxes
            .f_to_kind(Kind::Float)?
            .f_reshape(&[-1])?
            .into();
        let labels: Vec<i64> = sample.labels.f_to_kind(Kind::Int64)?.into();
        let keypoints: Option<(usize, Vec<f32>)> = sample
            .keypoints
            .as_ref()
            .map(|keypoints| -> Result<_> {
                let num_points = keypoints.size()[1] as usize;
                let values: Vec<f32> = keypoints.f_to_kind(Kind::Float)?.f_reshape(&[-1])?.into();
                Ok((num_points, values))
            })
            .transpose()?;

        let instances: Vec<_> = (0..num_instances)
            .map(|index| -> Result<_> {
                let mask_name = format!("{}_mask_{}.png", prefix, index);
                let mask = sample
                    .masks
                    .select(0, index)
                    .f_ne(0.0)?
                    .f_to_kind(Kind::Float)?
                    * 255.0;
                self.save(&mask.f_to_kind(Kind::Uint8)?, &mask_name)?;

                let index = index as usize;
                let bbox = [
                    boxes[index * 4],
                    boxes[index * 4 + 1],
                    boxes[index * 4 + 2],
                    boxes[index * 4 + 3],
                ];
                let keypoints = keypoints.as_ref().map(|(num_points, values)| {
                    values[(index * num_points * 3)..((index + 1) * num_points * 3)]
                        .chunks_exact(3)
                        .map(|point| [point[0], point[1], point[2]])
                        .collect()
                });

                Ok(InstanceAnnotation {
                    mask: mask_name,
                    label: labels[index],
                    bbox,
                    keypoints,
                })
            })
            .collect::<Result<_>>()?;

        let overlay = if self.draw_overlay {
            let overlay_name = format!("{}_overlay.png", prefix);
            let overlay = self.render_overlay(&image, &instances, &sample)?;
            self.save(&overlay, &overlay_name)?;
            Some(overlay_name)
        } else {
            None
        };

        debug!(
            "wrote '{}' with {} instances",
            image_name,
            instances.len()
        );

        Ok(ManifestEntry {
            source: stem.to_owned(),
            repetition,
            image: image_name,
            overlay,
            instances,
        })
    }

    fn render_overlay(
        &self,
        image: &Tensor,
        instances: &[InstanceAnnotation],
        sample: &Sample,
    ) -> Result<Tensor> {
        let mut canvas = match image.size()[0] {
            1 => image.f_repeat(&[3, 1, 1])?,
            _ => image.copy(),
        };
        let box_color = Tensor::of_slice(&[255u8, 0, 0]);
        let point_color = Tensor::of_slice(&[0u8, 255, 0]);

        for instance in instances {
            let [x_min, y_min, x_max, y_max] = instance.bbox;
            let rect = XYXY::try_from_xyxy([
                x_min.round() as i64,
                y_min.round() as i64,
                x_max.round() as i64,
                y_max.round() as i64,
            ])?;
            let _ = canvas.f_draw_rect_(&rect, 1, &box_color)?;
        }

        if let Some(keypoints) = &sample.keypoints {
            let size = sample.spatial_size()?;
            let (height, width) = (size.h() as f64, size.w() as f64);

            let points = visible_keypoints(keypoints, self.keypoint_threshold)?
                .into_iter()
                .flatten()
                .filter(|&[x, y]| (0.0..width).contains(&x) && (0.0..height).contains(&y));
            for [x, y] in points {
                let (x, y) = (x.round() as i64, y.round() as i64);
                let rect = XYXY::try_from_xyxy([x - 1, y - 1, x + 1, y + 1])?;
                let _ = canvas.f_fill_rect_(&rect, &point_color)?;
            }
        }

        Ok(canvas)
    }

    fn save(&self, tensor: &Tensor, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        tensor
            .try_into_image()?
            .save(&path)
            .with_context(|| format!("failed to save '{}'", path.display()))?;
        Ok(())
    }
}

/// Writes the manifest of a run as pretty-printed JSON.
pub fn save_manifest<P>(path: P, entries: &[ManifestEntry]) -> Result<()>
where
    P: AsRef<Path>,
{
    let text = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Floating point images in `[0, 1]` are scaled to `Uint8`.
fn to_uint8_image(image: &Tensor) -> Result<Tensor> {
    if image.kind() == Kind::Uint8 {
        return Ok(image.shallow_clone());
    }
    let image = (image.f_to_kind(Kind::Float)? * 255.0)
        .f_round()?
        .f_clamp(0.0, 255.0)?
        .f_to_kind(Kind::Uint8)?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sample {
        let image = Tensor::full(&[1, 10, 12], 0.5, (Kind::Float, Device::Cpu));
        let masks = Tensor::zeros(&[1, 10, 12], (Kind::Uint8, Device::Cpu));
        let _ = masks.get(0).narrow(0, 2, 3).narrow(1, 4, 5).fill_(1i64);
        let boxes = Tensor::of_slice(&[4.0f32, 2.0, 8.0, 4.0]).view([1, 4]);
        let labels = Tensor::of_slice(&[9i64]);
        let keypoints = Tensor::of_slice(&[5.0f32, 3.0, 0.8, 7.0, 3.0, 0.2]).view([1, 2, 3]);
        Sample::new(image, masks, boxes, labels)
            .unwrap()
            .with_keypoints(keypoints)
            .unwrap()
    }

    #[test]
    fn write_sample_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = OutputConfig {
            dir: dir.path().to_owned(),
            draw_overlay: true,
            keypoint_threshold: r64(0.5),
        };
        let writer = Writer::new(dir.path(), &config);
        let entry = writer.write("cat", 2, &sample()).unwrap();

        assert_eq!(entry.image, "cat_2.png");
        assert_eq!(entry.overlay.as_deref(), Some("cat_2_overlay.png"));
        assert_eq!(entry.instances.len(), 1);
        assert_eq!(entry.instances[0].mask, "cat_2_mask_0.png");
        assert_eq!(entry.instances[0].label, 9);
        assert_eq!(entry.instances[0].bbox, [4.0, 2.0, 8.0, 4.0]);
        assert_eq!(
            entry.instances[0].keypoints,
            Some(vec![[5.0, 3.0, 0.8], [7.0, 3.0, 0.2]])
        );

        let image = image::open(dir.path().join("cat_2.png")).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (12, 10));
        assert_eq!(image.get_pixel(0, 0).0, [128, 128, 128]);

        let mask = image::open(dir.path().join("cat_2_mask_0.png"))
            .unwrap()
            .to_luma8();
        assert_eq!(mask.get_pixel(4, 2).0, [255]);
        assert_eq!(mask.get_pixel(0, 0).0, [0]);

        let overlay = image::open(dir.path().join("cat_2_overlay.png"))
            .unwrap()
            .to_rgb8();
        assert_eq!(overlay.get_pixel(8, 4).0, [255, 0, 0]);
        assert_eq!(overlay.get_pixel(5, 3).0, [0, 255, 0]);
        assert_eq!(overlay.get_pixel(7, 3).0, [128, 128, 128]);
        assert_eq!(overlay.get_pixel(0, 0).0, [128, 128, 128]);
    }
}
