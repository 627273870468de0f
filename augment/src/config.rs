//! Augmentation program configuration format.

use crate::common::*;

/// The main augmentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    /// Number of augmented copies produced per input record.
    #[serde(default = "defaults::repeat")]
    pub repeat: NonZeroUsize,
    /// Base seed. Job `n` draws from a generator seeded with `seed + n`.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "defaults::num_workers")]
    pub num_workers: NonZeroUsize,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = std::fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// JSON annotation file. Image and mask paths inside are relative to it.
    pub annotation_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Parent directory of the timestamped run directories.
    pub dir: PathBuf,
    #[serde(default)]
    pub draw_overlay: bool,
    #[serde(default = "defaults::keypoint_threshold")]
    pub keypoint_threshold: R64,
}

mod defaults {
    use super::*;

    pub fn repeat() -> NonZeroUsize {
        NonZeroUsize::MIN
    }

    pub fn num_workers() -> NonZeroUsize {
        std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
    }

    pub fn keypoint_threshold() -> R64 {
        r64(KEYPOINT_SCORE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let text = r#"
        {
            dataset: { annotation_file: "data/annotations.json" },
            output: { dir: "runs" },
            seed: 7,
        }
        "#;
        let config: Config = json5::from_str(text).unwrap();

        assert_eq!(config.repeat.get(), 1);
        assert_eq!(config.seed, Some(7));
        assert!(!config.output.draw_overlay);
        assert_eq!(config.output.keypoint_threshold, r64(0.5));
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn reject_zero_workers() {
        let text = r#"
        {
            dataset: { annotation_file: "a.json" },
            output: { dir: "runs" },
            num_workers: 0,
        }
        "#;
        assert!(json5::from_str::<Config>(text).is_err());
    }
}
