//! JSON annotation set loader.
//!
//! The annotation file is a list of records:
//!
//! ```json
//! [{ "image": "a.png",
//!    "instances": [{ "mask": "a_0.png", "label": 1, "keypoints": [[4.0, 2.0, 0.9]] }] }]
//! ```

use crate::common::*;

#[derive(Debug, Clone, Deserialize)]
struct RecordEntry {
    image: PathBuf,
    #[serde(default)]
    instances: Vec<InstanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct InstanceEntry {
    mask: PathBuf,
    label: i64,
    #[serde(default)]
    keypoints: Option<Vec<[f64; 3]>>,
}

/// An annotated image whose files are not read yet.
#[derive(Debug, Clone)]
pub struct Record {
    /// Output file name prefix, the image file stem.
    pub stem: String,
    pub image_file: PathBuf,
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub mask_file: PathBuf,
    pub label: i64,
    pub keypoints: Option<Vec<[f64; 3]>>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Parses the annotation file and resolves file paths. Images are loaded
    /// lazily by [Record::load].
    pub fn open<P>(annotation_file: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let annotation_file = annotation_file.as_ref();
        let base_dir = annotation_file.parent().unwrap_or_else(|| Path::new(""));

        let text = std::fs::read_to_string(annotation_file).with_context(|| {
            format!(
                "failed to read annotation file '{}'",
                annotation_file.display()
            )
        })?;
        let entries: Vec<RecordEntry> = serde_json::from_str(&text).with_context(|| {
            format!(
                "failed to parse annotation file '{}'",
                annotation_file.display()
            )
        })?;

        let mut stems = HashSet::new();
        let records: Vec<_> = entries
            .into_iter()
            .map(|entry| -> Result<_> {
                let RecordEntry { image, instances } = entry;
                let stem = image
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .ok_or_else(|| format_err!("invalid image path '{}'", image.display()))?
                    .to_owned();
                ensure!(
                    stems.insert(stem.clone()),
                    "the image file stem '{}' appears more than once",
                    stem
                );

                let instances = instances
                    .into_iter()
                    .map(|instance| {
                        let InstanceEntry {
                            mask,
                            label,
                            keypoints,
                        } = instance;
                        Instance {
                            mask_file: base_dir.join(mask),
                            label,
                            keypoints,
                        }
                    })
                    .collect();

                Ok(Record {
                    stem,
                    image_file: base_dir.join(image),
                    instances,
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Record {
    /// Decodes the image and masks into a raw sample.
    ///
    /// The image becomes a `Uint8` `[1, H, W]` or `[3, H, W]` tensor. Masks are
    /// read as 8-bit luma and stacked into `[I, H, W]`, and the initial boxes
    /// are extracted from them.
    pub fn load(&self) -> Result<Sample> {
        let image = open_image(&self.image_file)?;
        let image = match image {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
            DynamicImage::ImageRgb8(_) => image,
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        };
        let image = image.try_into_tensor()?;
        let (height, width) = match image.size().as_slice() {
            &[_c, h, w] => (h, w),
            shape => bail!("unexpected decoded image shape {:?}", shape),
        };

        let masks: Vec<Tensor> = self
            .instances
            .iter()
            .map(|instance| -> Result<_> {
                let mask = open_image(&instance.mask_file)?.to_luma8().into_tensor();
                ensure!(
                    mask.size()[1..] == [height, width],
                    "the mask '{}' has size {:?}, but the image '{}' has size {:?}",
                    instance.mask_file.display(),
                    &mask.size()[1..],
                    self.image_file.display(),
                    [height, width]
                );
                Ok(mask)
            })
            .collect::<Result<_>>()?;
        let masks = if masks.is_empty() {
            Tensor::zeros(&[0, height, width], (Kind::Uint8, Device::Cpu))
        } else {
            Tensor::f_cat(&masks, 0)?
        };

        let num_instances = masks.size()[0];
        let boxes: Vec<f32> = (0..num_instances)
            .map(|index| box_from_mask(&masks.select(0, index)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flat_map(|rect| rect.xyxy())
            .map(|val| val as f32)
            .collect();
        let boxes = Tensor::of_slice(&boxes).view([num_instances, 4]);

        let labels: Vec<i64> = self
            .instances
            .iter()
            .map(|instance| instance.label)
            .collect();
        let labels = Tensor::of_slice(&labels);

        let sample = Sample::new(image, masks, boxes, labels)
            .with_context(|| format!("invalid record '{}'", self.image_file.display()))?;

        match self.keypoints()? {
            Some(keypoints) => sample.with_keypoints(keypoints),
            None => Ok(sample),
        }
    }

    /// Stacks per-instance keypoints into `[I, K, 3]`. Either every instance
    /// lists the same number of keypoints or none of them lists any.
    fn keypoints(&self) -> Result<Option<Tensor>> {
        let points: Vec<_> = self
            .instances
            .iter()
            .map(|instance| instance.keypoints.as_ref())
            .collect();

        if points.iter().all(|points| points.is_none()) {
            return Ok(None);
        }

        let counts: HashSet<_> = points
            .iter()
            .map(|points| points.map(|points| points.len()))
            .collect();
        ensure!(
            counts.len() == 1,
            "inconsistent keypoint counts in record '{}'",
            self.image_file.display()
        );
        let num_points = points
            .iter()
            .flatten()
            .map(|points| points.len())
            .next()
            .unwrap_or(0) as i64;

        let values: Vec<f32> = points
            .into_iter()
            .flatten()
            .flatten()
            .flatten()
            .map(|val| *val as f32)
            .collect();
        let keypoints =
            Tensor::of_slice(&values).view([self.instances.len() as i64, num_points, 3]);
        Ok(Some(keypoints))
    }
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("failed to load image '{}'", path.display()))
}
