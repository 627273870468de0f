use super::Transform;
use crate::{common::*, Sample};

/// Converts a raw `Uint8` image into `Float` intensities in `[0, 1]`.
///
/// `[H, W]` buffers gain a channel dimension. Floating point images pass
/// through unchanged.
#[derive(Debug, Clone, Default)]
pub struct ToTensor;

impl Transform for ToTensor {
    fn apply(&self, sample: Sample, _rng: &mut dyn RngCore) -> Result<Sample> {
        let kind = sample.image.kind();
        if is_floating_kind(kind) {
            return Ok(sample);
        }
        ensure!(
            kind == Kind::Uint8,
            "expect a Uint8 or floating point image, but get {:?}",
            kind
        );

        let image = match sample.image.dim() {
            2 => sample.image.f_unsqueeze(0)?,
            3 => sample.image.shallow_clone(),
            _ => bail!(
                "image must have shape [C, H, W] or [H, W], but get {:?}",
                sample.image.size()
            ),
        };
        let image = image.f_to_kind(Kind::Float)? / 255.0;
        Ok(Sample { image, ..sample })
    }

    fn name(&self) -> &'static str {
        "ToTensor"
    }
}

/// Replicates a single channel image into three channels.
#[derive(Debug, Clone, Default)]
pub struct StackChannels;

impl Transform for StackChannels {
    fn apply(&self, sample: Sample, _rng: &mut dyn RngCore) -> Result<Sample> {
        let image = match sample.image.size().as_slice() {
            &[1, _h, _w] => sample.image.f_repeat(&[3, 1, 1])?,
            &[3, _h, _w] => return Ok(sample),
            shape => bail!(
                "expect an image with 1 or 3 channels, but get shape {:?}",
                shape
            ),
        };
        Ok(Sample { image, ..sample })
    }

    fn name(&self) -> &'static str {
        "StackChannels"
    }
}

/// Moves every field of the sample to a device.
#[derive(Debug, Clone)]
pub struct ToDevice {
    device: Device,
}

impl ToDevice {
    pub fn new(device: Device) -> Self {
        Self { device }
    }
}

impl Default for ToDevice {
    fn default() -> Self {
        Self::new(Device::Cpu)
    }
}

impl Transform for ToDevice {
    fn apply(&self, sample: Sample, _rng: &mut dyn RngCore) -> Result<Sample> {
        Ok(sample.to_device(self.device))
    }

    fn name(&self) -> &'static str {
        "ToDevice"
    }
}
