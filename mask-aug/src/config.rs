//! Declarative transform configuration.

use crate::{
    common::*, AdjustBrightnessInit, AdjustContrastInit, CorrectBoxes, GaussianBlurInit,
    HorizontalFlipInit, Pipeline, RandomAffineInit, RandomResizeInit, StackChannels, ToDevice,
    ToTensor, Transform, VerticalFlipInit,
};

/// One pipeline stage, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransformConfig {
    VerticalFlip {
        #[serde(default = "defaults::rate")]
        rate: Ratio,
    },
    HorizontalFlip {
        #[serde(default = "defaults::rate")]
        rate: Ratio,
    },
    GaussianBlur {
        #[serde(default = "defaults::rate")]
        rate: Ratio,
        #[serde(default = "defaults::kernel_sizes")]
        kernel_sizes: Vec<i64>,
    },
    RandomResize {
        #[serde(default = "defaults::rate")]
        rate: Ratio,
        #[serde(default = "defaults::min_size")]
        min_size: i64,
        #[serde(default = "defaults::max_size")]
        max_size: i64,
    },
    AdjustBrightness {
        #[serde(default = "defaults::rate")]
        rate: Ratio,
        #[serde(default = "defaults::factor_range")]
        range: (R64, R64),
    },
    AdjustContrast {
        #[serde(default = "defaults::rate")]
        rate: Ratio,
        #[serde(default = "defaults::factor_range")]
        range: (R64, R64),
    },
    RandomAffine {
        #[serde(default = "defaults::rate")]
        rate: Ratio,
        #[serde(default = "defaults::angle")]
        angle: (R64, R64),
        #[serde(default = "defaults::shear")]
        shear: (R64, R64),
        #[serde(default = "defaults::scale")]
        scale: (R64, R64),
    },
    ToTensor,
    StackChannels,
    ToDevice {
        #[serde(with = "tch_serde::serde_device", default = "defaults::device")]
        device: Device,
    },
    CorrectBoxes,
    /// A nested pipeline.
    Pipeline { stages: Vec<TransformConfig> },
}

impl TransformConfig {
    pub fn build(&self) -> Result<Box<dyn Transform>> {
        let transform: Box<dyn Transform> = match *self {
            Self::VerticalFlip { rate } => Box::new(VerticalFlipInit { rate }.build()?),
            Self::HorizontalFlip { rate } => Box::new(HorizontalFlipInit { rate }.build()?),
            Self::GaussianBlur {
                rate,
                ref kernel_sizes,
            } => Box::new(
                GaussianBlurInit {
                    rate,
                    kernel_sizes: kernel_sizes.clone(),
                }
                .build()?,
            ),
            Self::RandomResize {
                rate,
                min_size,
                max_size,
            } => Box::new(
                RandomResizeInit {
                    rate,
                    min_size,
                    max_size,
                }
                .build()?,
            ),
            Self::AdjustBrightness { rate, range } => {
                Box::new(AdjustBrightnessInit { rate, range }.build()?)
            }
            Self::AdjustContrast { rate, range } => {
                Box::new(AdjustContrastInit { rate, range }.build()?)
            }
            Self::RandomAffine {
                rate,
                angle,
                shear,
                scale,
            } => Box::new(
                RandomAffineInit {
                    rate,
                    angle,
                    shear,
                    scale,
                }
                .build()?,
            ),
            Self::ToTensor => Box::new(ToTensor),
            Self::StackChannels => Box::new(StackChannels),
            Self::ToDevice { device } => Box::new(ToDevice::new(device)),
            Self::CorrectBoxes => Box::new(CorrectBoxes),
            Self::Pipeline { ref stages } => Box::new(PipelineConfig::build_stages(stages)?),
        };
        Ok(transform)
    }
}

/// The ordered stages of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub stages: Vec<TransformConfig>,
}

impl PipelineConfig {
    pub fn build(&self) -> Result<Pipeline> {
        Self::build_stages(&self.stages)
    }

    fn build_stages(stages: &[TransformConfig]) -> Result<Pipeline> {
        stages
            .iter()
            .enumerate()
            .map(|(index, config)| {
                config
                    .build()
                    .with_context(|| format!("invalid configuration for stage {}", index))
            })
            .collect()
    }
}

impl Default for PipelineConfig {
    /// Conversion, every augmentation at its defaults, then box correction.
    fn default() -> Self {
        Self {
            stages: vec![
                TransformConfig::ToTensor,
                TransformConfig::StackChannels,
                TransformConfig::VerticalFlip {
                    rate: defaults::rate(),
                },
                TransformConfig::HorizontalFlip {
                    rate: defaults::rate(),
                },
                TransformConfig::GaussianBlur {
                    rate: defaults::rate(),
                    kernel_sizes: defaults::kernel_sizes(),
                },
                TransformConfig::AdjustBrightness {
                    rate: defaults::rate(),
                    range: defaults::factor_range(),
                },
                TransformConfig::AdjustContrast {
                    rate: defaults::rate(),
                    range: defaults::factor_range(),
                },
                TransformConfig::RandomAffine {
                    rate: defaults::rate(),
                    angle: defaults::angle(),
                    shear: defaults::shear(),
                    scale: defaults::scale(),
                },
                TransformConfig::RandomResize {
                    rate: defaults::rate(),
                    min_size: defaults::min_size(),
                    max_size: defaults::max_size(),
                },
                TransformConfig::CorrectBoxes,
            ],
        }
    }
}

mod defaults {
    use super::*;

    pub fn rate() -> Ratio {
        Ratio::half()
    }

    pub fn kernel_sizes() -> Vec<i64> {
        vec![3, 5, 7]
    }

    pub fn min_size() -> i64 {
        300
    }

    pub fn max_size() -> i64 {
        1440
    }

    pub fn factor_range() -> (R64, R64) {
        (r64(0.3), r64(1.7))
    }

    pub fn angle() -> (R64, R64) {
        (r64(-180.0), r64(180.0))
    }

    pub fn shear() -> (R64, R64) {
        (r64(-45.0), r64(45.0))
    }

    pub fn scale() -> (R64, R64) {
        (r64(0.9), r64(1.5))
    }

    pub fn device() -> Device {
        Device::Cpu
    }
}
