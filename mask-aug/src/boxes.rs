use crate::common::*;

/// Computes the tight box around the non-zero pixels of a `[H, W]` mask.
///
/// `x` is the column and `y` is the row, both maxima inclusive. A mask without
/// any non-zero pixel yields the all-zero box.
pub fn box_from_mask(mask: &Tensor) -> Result<XYXY<i64>> {
    ensure!(
        mask.dim() == 2,
        "expect a [H, W] mask, but get shape {:?}",
        mask.size()
    );

    tch::no_grad(|| {
        // [N, 2] rows of (y, x)
        let coords = mask.f_nonzero()?;
        if coords.size()[0] == 0 {
            return Ok(XYXY::zero());
        }

        let ys = coords.select(1, 0);
        let xs = coords.select(1, 1);
        XYXY::try_from_xyxy([
            xs.min().int64_value(&[]),
            ys.min().int64_value(&[]),
            xs.max().int64_value(&[]),
            ys.max().int64_value(&[]),
        ])
    })
}

/// Tells if the mask has any strictly positive pixel.
pub fn mask_is_occupied(mask: &Tensor) -> Result<bool> {
    if mask.numel() == 0 {
        return Ok(false);
    }
    let occupied = match mask.kind() {
        Kind::Bool => mask.f_any()?,
        _ => mask.f_gt(0.0)?.f_any()?,
    };
    Ok(occupied.int64_value(&[]) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_mask_box() {
        let mask = Tensor::eye(100, (Kind::Float, Device::Cpu));
        let _ = mask.get(0).get(0).fill_(0.0);
        let _ = mask.get(99).get(99).fill_(0.0);

        let rect = box_from_mask(&mask).unwrap();
        assert_eq!(rect.xyxy(), [1, 1, 98, 98]);
    }

    #[test]
    fn empty_mask_box() {
        let mask = Tensor::zeros(&[7, 9], (Kind::Uint8, Device::Cpu));
        assert_eq!(box_from_mask(&mask).unwrap(), XYXY::zero());
        assert!(!mask_is_occupied(&mask).unwrap());
    }

    #[test]
    fn box_uses_column_as_x() {
        let mask = Tensor::zeros(&[6, 10], (Kind::Bool, Device::Cpu));
        let _ = mask.get(2).get(7).fill_(1i64);
        let _ = mask.get(4).get(3).fill_(1i64);

        let rect = box_from_mask(&mask).unwrap();
        assert_eq!(rect.xyxy(), [3, 2, 7, 4]);
        assert!(mask_is_occupied(&mask).unwrap());
    }

    #[test]
    fn box_rejects_stacked_masks() {
        let masks = Tensor::zeros(&[2, 4, 4], (Kind::Uint8, Device::Cpu));
        assert!(box_from_mask(&masks).is_err());
    }
}
