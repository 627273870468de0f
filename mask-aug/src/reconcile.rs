//! Re-derives boxes from masks and drops vanished instances.

use crate::{boxes::mask_is_occupied, box_from_mask, common::*, Sample};

/// Recomputes the boxes of a sample from its masks.
///
/// Instances whose mask has no positive pixel are removed from masks, boxes,
/// labels and keypoints alike. The relative order of the survivors is kept
/// and the image is passed through. The incoming boxes are discarded.
pub fn reconcile(sample: Sample) -> Result<Sample> {
    let Sample {
        image,
        masks,
        labels,
        keypoints,
        ..
    } = sample;
    reconcile_parts(image, masks, labels, keypoints)
}

pub fn reconcile_parts(
    image: Tensor,
    masks: Tensor,
    labels: Tensor,
    keypoints: Option<Tensor>,
) -> Result<Sample> {
    let (num_masks, _height, _width) = match masks.size().as_slice() {
        &[i, h, w] => (i, h, w),
        shape => bail!("masks must have shape [I, H, W], but get {:?}", shape),
    };
    let num_labels = match labels.size().as_slice() {
        &[n] => n,
        shape => bail!("labels must have shape [I], but get {:?}", shape),
    };
    ensure!(
        num_labels == num_masks,
        "the number of labels ({}) does not match the number of masks ({})",
        num_labels,
        num_masks
    );

    let (keep, boxes) = tch::no_grad(|| -> Result<_> {
        let mut keep: Vec<i64> = vec![];
        let mut boxes: Vec<f32> = vec![];

        for index in 0..num_masks {
            let mask = masks.select(0, index);
            if !mask_is_occupied(&mask)? {
                continue;
            }
            let rect = box_from_mask(&mask)?;
            keep.push(index);
            boxes.extend(rect.xyxy().iter().map(|&val| val as f32));
        }

        Ok((keep, boxes))
    })?;

    if keep.len() as i64 != num_masks {
        debug!(
            "dropped {} of {} instances with empty masks",
            num_masks - keep.len() as i64,
            num_masks
        );
    }

    let device = masks.device();
    let num_kept = keep.len() as i64;
    let keep = Tensor::of_slice(&keep).to_device(device);
    let boxes = Tensor::of_slice(&boxes)
        .f_view([num_kept, 4])?
        .to_device(device);

    let masks = masks.f_index_select(0, &keep)?;
    let labels = labels.f_index_select(0, &keep.to_device(labels.device()))?;
    let keypoints = keypoints
        .map(|keypoints| -> Result<_> {
            let index = keep.to_device(keypoints.device());
            Ok(keypoints.f_index_select(0, &index)?)
        })
        .transpose()?;

    let sample = Sample {
        image,
        masks,
        boxes,
        labels,
        keypoints,
    };
    sample.check()?;
    Ok(sample)
}
