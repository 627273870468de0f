use super::Transform;
use crate::{common::*, reconcile, Sample};

/// Re-derives boxes from masks and drops instances whose mask vanished.
#[derive(Debug, Clone, Default)]
pub struct CorrectBoxes;

impl Transform for CorrectBoxes {
    fn apply(&self, sample: Sample, _rng: &mut dyn RngCore) -> Result<Sample> {
        reconcile(sample)
    }

    fn name(&self) -> &'static str {
        "CorrectBoxes"
    }
}
