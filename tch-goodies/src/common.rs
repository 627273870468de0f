pub use anyhow::{bail, ensure, format_err, Error, Result};
pub use approx::AbsDiffEq;
pub use bbox::{Affine, HW, XYXY};
pub use image::{DynamicImage, ImageBuffer, Luma, Pixel, Rgb, Rgba};
pub use itertools::Itertools;
pub use log::{trace, warn};
pub use noisy_float::prelude::*;
pub use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    convert::TryFrom,
    fmt::{self, Display, Formatter},
    ops::Deref,
};
pub use tch::{kind::Element, IndexOp, Kind, Tensor};
