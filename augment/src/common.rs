//! Common imports from external crates.

pub use anyhow::{bail, ensure, format_err, Context, Error, Result};
pub use bbox::XYXY;
pub use chrono::{DateTime, Local};
pub use futures::{
    future::FutureExt,
    stream::{self, StreamExt, TryStreamExt},
};
pub use image::DynamicImage;
pub use mask_aug::{
    box_from_mask,
    keypoints::{visible_keypoints, KEYPOINT_SCORE_THRESHOLD},
    Pipeline, PipelineConfig, Sample, Transform,
};
pub use noisy_float::prelude::*;
pub use rand::{prelude::*, rngs::StdRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    collections::HashSet,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};
pub use tch::{Device, Kind, Tensor};
pub use tch_goodies::{IntoTensor as _, TensorExt as _, TryIntoImage as _, TryIntoTensor as _};
pub use tracing::{debug, info, info_span, warn};
