use crate::{common::*, Sample, Transform};

/// An ordered chain of transforms applied left to right.
///
/// Debug builds re-validate the sample after every stage and report the
/// offending stage on failure.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage and returns the pipeline.
    pub fn then<T>(mut self, stage: T) -> Self
    where
        T: Transform + 'static,
    {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn push(&mut self, stage: Box<dyn Transform>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs the pipeline with a generator seeded from system entropy.
    pub fn apply_with_entropy(&self, sample: Sample) -> Result<Sample> {
        let mut rng = StdRng::from_entropy();
        self.apply(sample, &mut rng)
    }
}

impl FromIterator<Box<dyn Transform>> for Pipeline {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Transform>>,
    {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}

impl Transform for Pipeline {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample> {
        self.stages
            .iter()
            .enumerate()
            .try_fold(sample, |sample, (index, stage)| {
                debug!(
                    "stage {} ({}) on {} instances",
                    index,
                    stage.name(),
                    sample.num_instances()
                );

                let sample = stage
                    .apply(sample, &mut *rng)
                    .with_context(|| format!("stage {} ({}) failed", index, stage.name()))?;

                if cfg!(debug_assertions) {
                    sample.check().with_context(|| {
                        format!(
                            "stage {} ({}) produced an inconsistent sample",
                            index,
                            stage.name()
                        )
                    })?;
                }

                Ok(sample)
            })
    }

    fn name(&self) -> &'static str {
        "Pipeline"
    }
}
