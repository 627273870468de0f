//! Keypoint visibility rules shared with annotation viewers.

use crate::common::*;

/// Keypoints scored below this value are hidden by default.
pub const KEYPOINT_SCORE_THRESHOLD: f64 = 0.5;

/// Returns, per instance, the `(x, y)` locations of keypoints whose score
/// reaches `threshold`.
pub fn visible_keypoints(keypoints: &Tensor, threshold: f64) -> Result<Vec<Vec<[f64; 2]>>> {
    let num_points = match keypoints.size().as_slice() {
        &[_i, k, 3] => k as usize,
        shape => bail!("keypoints must have shape [I, K, 3], but get {:?}", shape),
    };

    let values: Vec<f64> = keypoints
        .f_to_kind(Kind::Double)?
        .f_reshape(&[-1])?
        .into();
    if num_points == 0 {
        let num_instances = keypoints.size()[0] as usize;
        return Ok(vec![vec![]; num_instances]);
    }

    let visible = values
        .chunks_exact(num_points * 3)
        .map(|instance| {
            instance
                .chunks_exact(3)
                .filter(|point| point[2] >= threshold)
                .map(|point| [point[0], point[1]])
                .collect()
        })
        .collect();
    Ok(visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_score_keypoints_are_hidden() {
        let keypoints = Tensor::of_slice(&[
            1.0f32, 1.0, 0.9, // visible
            2.0, 2.0, 0.2, // hidden
            3.0, 3.0, 0.5, // visible, on the threshold
            4.0, 4.0, 0.0, // hidden
        ])
        .view([2, 2, 3]);

        let visible = visible_keypoints(&keypoints, KEYPOINT_SCORE_THRESHOLD).unwrap();
        assert_eq!(visible, vec![vec![[1.0, 1.0]], vec![[3.0, 3.0]]]);
    }

    #[test]
    fn instances_without_keypoints() {
        let keypoints = Tensor::zeros(&[2, 0, 3], (Kind::Float, Device::Cpu));
        let visible = visible_keypoints(&keypoints, KEYPOINT_SCORE_THRESHOLD).unwrap();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|points| points.is_empty()));
    }
}
