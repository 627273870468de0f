pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use bbox::{Affine, HW, XYXY};
pub use log::{debug, trace, warn};
pub use noisy_float::prelude::*;
pub use rand::prelude::*;
pub use serde::{Deserialize, Serialize};
pub use std::{
    collections::HashMap,
    fmt::{self, Debug},
};
pub use tch::{Device, Kind, Tensor};
pub use tch_goodies::{is_floating_kind, Interpolation, Ratio, TensorExt as _};
pub use tch_tensor_like::TensorLike;
