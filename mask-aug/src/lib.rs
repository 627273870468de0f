//! Randomized augmentation of instance segmentation samples.
//!
//! A [Sample] bundles an image with its per-instance masks, boxes, labels and
//! optional keypoints. [Transform]s perturb a sample while keeping every field
//! co-registered, and a [Pipeline] chains them. Geometric stages are usually
//! followed by [CorrectBoxes], which re-derives boxes from the masks and drops
//! instances that left the frame.

mod common;

pub mod boxes;
pub mod config;
pub mod geometry;
pub mod keypoints;
pub mod pipeline;
pub mod reconcile;
pub mod sample;
pub mod transform;

pub use boxes::*;
pub use config::*;
pub use pipeline::*;
pub use reconcile::*;
pub use sample::*;
pub use transform::*;
