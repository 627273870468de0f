//! Plain-number geometry for instance annotations: pixel boxes, image sizes
//! and 2-D affine maps.

mod common;

pub use affine::*;
pub mod affine;

pub use hw::*;
pub mod hw;

pub use xyxy::*;
pub mod xyxy;
