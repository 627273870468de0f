//! Moves point annotations along with a geometric warp.

use crate::common::*;

/// Maps `[I, 4]` boxes through `affine` and clips them to `frame`.
///
/// Each output box encloses the four mapped corners of its input box, so the
/// result is exact for flips and axis-aligned scaling and loose for
/// rotation and shear.
pub fn map_boxes(boxes: &Tensor, affine: &Affine<f64>, frame: &HW<i64>) -> Result<Tensor> {
    let num_boxes = match boxes.size().as_slice() {
        &[n, 4] => n,
        shape => bail!("boxes must have shape [I, 4], but get {:?}", shape),
    };
    let frame: HW<f64> = frame
        .try_cast()
        .ok_or_else(|| format_err!("frame size is not representable"))?;

    let values: Vec<f64> = boxes.f_to_kind(Kind::Double)?.f_reshape(&[-1])?.into();
    let mapped: Vec<f64> = values
        .chunks_exact(4)
        .flat_map(|row| {
            let corners = [
                [row[0], row[1]],
                [row[2], row[1]],
                [row[2], row[3]],
                [row[0], row[3]],
            ]
            .map(|point| affine.apply(point));

            XYXY::enclosing(corners)
                .map(|rect| rect.clamp_to(&frame).xyxy())
                .unwrap_or([0.0; 4])
        })
        .collect();

    let mapped = Tensor::of_slice(&mapped)
        .f_view([num_boxes, 4])?
        .f_to_kind(boxes.kind())?
        .to_device(boxes.device());
    Ok(mapped)
}

/// Maps `[I, 4]` boxes through a nearest neighbour resize from `from` to
/// `to`, the way [TensorExt::f_resize2d_exact] resamples masks.
///
/// Each output box spans exactly the output pixels that sample a source pixel
/// inside the input box, so a box that encloses its mask keeps enclosing the
/// resized mask. Fractional boxes are widened to whole pixels first.
///
/// [TensorExt::f_resize2d_exact]: tch_goodies::TensorExt::f_resize2d_exact
pub fn resize_boxes(boxes: &Tensor, from: &HW<i64>, to: &HW<i64>) -> Result<Tensor> {
    let num_boxes = match boxes.size().as_slice() {
        &[n, 4] => n,
        shape => bail!("boxes must have shape [I, 4], but get {:?}", shape),
    };
    ensure!(
        !from.is_empty() && !to.is_empty(),
        "cannot resize boxes between {:?} and {:?}",
        from,
        to
    );
    let xs = nearest_source_indices(from.w(), to.w());
    let ys = nearest_source_indices(from.h(), to.h());

    let values: Vec<f64> = boxes.f_to_kind(Kind::Double)?.f_reshape(&[-1])?.into();
    let resized: Vec<f64> = values
        .chunks_exact(4)
        .flat_map(|row| {
            let [x_min, x_max] = covering_range(&xs, row[0], row[2]);
            let [y_min, y_max] = covering_range(&ys, row[1], row[3]);
            [x_min, y_min, x_max, y_max].map(|val| val as f64)
        })
        .collect();

    let resized = Tensor::of_slice(&resized)
        .f_view([num_boxes, 4])?
        .f_to_kind(boxes.kind())?
        .to_device(boxes.device());
    Ok(resized)
}

/// The source index read by every output index of a nearest resize. The
/// scale is computed in single precision as `upsample_nearest2d` does.
fn nearest_source_indices(input: i64, output: i64) -> Vec<i64> {
    let scale = input as f32 / output as f32;
    (0..output)
        .map(|index| ((index as f32 * scale).floor() as i64).min(input - 1))
        .collect()
}

/// The inclusive output range whose sources fall in `[lo, hi]`. A range that
/// no output samples collapses onto the nearest output index.
fn covering_range(sources: &[i64], lo: f64, hi: f64) -> [i64; 2] {
    let (lo, hi) = (lo.floor() as i64, hi.ceil() as i64);
    let first = sources.partition_point(|&src| src < lo);
    let end = sources.partition_point(|&src| src <= hi);

    if first < end {
        [first as i64, end as i64 - 1]
    } else {
        let index = first.min(sources.len() - 1) as i64;
        [index, index]
    }
}

/// Maps the `(x, y)` part of `[I, K, 3]` keypoints through `affine`. Scores
/// are kept as they are.
pub fn map_keypoints(keypoints: &Tensor, affine: &Affine<f64>) -> Result<Tensor> {
    let (num_instances, num_points) = match keypoints.size().as_slice() {
        &[i, k, 3] => (i, k),
        shape => bail!("keypoints must have shape [I, K, 3], but get {:?}", shape),
    };

    let values: Vec<f64> = keypoints
        .f_to_kind(Kind::Double)?
        .f_reshape(&[-1])?
        .into();
    let mapped: Vec<f64> = values
        .chunks_exact(3)
        .flat_map(|row| {
            let [x, y] = affine.apply([row[0], row[1]]);
            [x, y, row[2]]
        })
        .collect();

    let mapped = Tensor::of_slice(&mapped)
        .f_view([num_instances, num_points, 3])?
        .f_to_kind(keypoints.kind())?
        .to_device(keypoints.device());
    Ok(mapped)
}
