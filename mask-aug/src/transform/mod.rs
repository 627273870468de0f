//! The transform contract and the concrete augmentations.

mod conversion;
mod correct_boxes;
mod flip;
mod gaussian_blur;
mod photometric;
mod random_affine;
mod random_resize;

pub use conversion::*;
pub use correct_boxes::*;
pub use flip::*;
pub use gaussian_blur::*;
pub use photometric::*;
pub use random_affine::*;
pub use random_resize::*;

use crate::{common::*, Sample};

/// A unit of augmentation.
///
/// Implementors are immutable once built. All randomness comes from the
/// generator passed to [Transform::apply], so one instance can serve many
/// worker threads at once.
pub trait Transform: Debug + Send + Sync {
    fn apply(&self, sample: Sample, rng: &mut dyn RngCore) -> Result<Sample>;

    /// Short name used in logs and error contexts.
    fn name(&self) -> &'static str;
}

/// Tells whether a transform with the given `rate` fires on this draw.
pub fn should_apply(rate: Ratio, rng: &mut dyn RngCore) -> bool {
    let apply = rng.gen_bool(rate.to_f64());
    trace!("rate {}, apply = {}", rate, apply);
    apply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_bounds_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..1000).all(|_| !should_apply(Ratio::zero(), &mut rng)));
        assert!((0..1000).all(|_| should_apply(Ratio::one(), &mut rng)));
    }

    #[test]
    fn rate_is_a_probability() {
        let mut rng = StdRng::seed_from_u64(11);
        let rate = Ratio::try_from(0.3).unwrap();
        let hits = (0..10_000).filter(|_| should_apply(rate, &mut rng)).count();
        assert!((2_700..3_300).contains(&hits), "hits = {}", hits);
    }
}
