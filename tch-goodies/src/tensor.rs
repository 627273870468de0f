use crate::common::*;

/// Resampling kernel used by [TensorExt::f_resize2d_exact] and
/// [TensorExt::f_warp_affine2d].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    Nearest,
    Bilinear,
}

impl Interpolation {
    fn grid_sampler_mode(&self) -> i64 {
        // See https://github.com/pytorch/pytorch/blob/f597ac6efc70431e66d945c16fa12b767989b032/aten/src/ATen/native/GridSampler.h#L10-L11
        match self {
            Self::Bilinear => 0,
            Self::Nearest => 1,
        }
    }
}

pub fn is_floating_kind(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::Half | Kind::BFloat16 | Kind::Float | Kind::Double
    )
}

/// Normalized 1-D Gaussian weights of length `kernel_size`.
pub fn gaussian_kernel1d(kernel_size: i64, sigma: f64) -> Vec<f64> {
    let half = (kernel_size - 1) as f64 * 0.5;
    let pdf: Vec<f64> = (0..kernel_size)
        .map(|index| {
            let x = index as f64 - half;
            (-0.5 * (x / sigma).powi(2)).exp()
        })
        .collect();
    let sum: f64 = pdf.iter().sum();
    pdf.into_iter().map(|val| val / sum).collect()
}

/// Sigma derived from the kernel size, `0.3 * ((k - 1) / 2 - 1) + 0.8`.
pub fn gaussian_sigma(kernel_size: i64) -> f64 {
    0.3 * ((kernel_size - 1) as f64 * 0.5 - 1.0) + 0.8
}

pub trait TensorExt {
    /// Height and width of a `[H, W]`, `[C, H, W]` or `[B, C, H, W]` tensor.
    fn spatial_size(&self) -> Result<HW<i64>>;

    fn f_gaussian_blur2d(&self, kernel_size: i64) -> Result<Tensor>;

    fn f_adjust_brightness(&self, factor: f64) -> Result<Tensor>;

    fn f_adjust_contrast(&self, factor: f64) -> Result<Tensor>;

    fn f_rgb_to_grayscale(&self) -> Result<Tensor>;

    /// Resizes the last two dimensions to exactly `size`.
    ///
    /// The kind of the input is preserved. Integer inputs resampled with
    /// [Interpolation::Bilinear] are rounded back.
    fn f_resize2d_exact(&self, size: &HW<i64>, interpolation: Interpolation) -> Result<Tensor>;

    /// Warps the last two dimensions through `affine`, which maps input pixel
    /// coordinates onto output pixel coordinates. The output keeps the input
    /// size and pixels mapped from outside the input are zero.
    fn f_warp_affine2d(
        &self,
        affine: &Affine<f64>,
        interpolation: Interpolation,
    ) -> Result<Tensor>;

    fn f_fill_rect_(&mut self, rect: &XYXY<i64>, color: &Tensor) -> Result<Tensor>;

    fn f_draw_rect_(&mut self, rect: &XYXY<i64>, stroke: usize, color: &Tensor)
        -> Result<Tensor>;
}

impl TensorExt for Tensor {
    fn spatial_size(&self) -> Result<HW<i64>> {
        let (height, width) = match self.size().as_slice() {
            &[h, w] => (h, w),
            &[_c, h, w] => (h, w),
            &[_b, _c, h, w] => (h, w),
            shape => bail!("expect 2, 3 or 4 dimensions, but get shape {:?}", shape),
        };
        HW::try_from_hw([height, width])
    }

    fn f_gaussian_blur2d(&self, kernel_size: i64) -> Result<Tensor> {
        ensure!(
            kernel_size > 0 && kernel_size % 2 == 1,
            "kernel size must be a positive odd number, but get {}",
            kernel_size
        );
        let (channels, height, width) = match self.size().as_slice() {
            &[c, h, w] => (c, h, w),
            &[h, w] => (1, h, w),
            shape => bail!("expect 2 or 3 dimensions, but get shape {:?}", shape),
        };
        if self.numel() == 0 {
            return Ok(self.shallow_clone());
        }

        let orig_kind = self.kind();
        let work_kind = if is_floating_kind(orig_kind) {
            orig_kind
        } else {
            Kind::Float
        };
        let sigma = gaussian_sigma(kernel_size);
        trace!("gaussian blur kernel_size={} sigma={}", kernel_size, sigma);

        tch::no_grad(|| -> Result<_> {
            let kernel = {
                let weights = gaussian_kernel1d(kernel_size, sigma);
                let kernel2d: Vec<f64> = weights
                    .iter()
                    .cartesian_product(weights.iter())
                    .map(|(wy, wx)| wy * wx)
                    .collect();
                Tensor::of_slice(&kernel2d)
                    .f_view([1, 1, kernel_size, kernel_size])?
                    .f_expand(&[channels, 1, kernel_size, kernel_size], false)?
                    .f_contiguous()?
                    .f_to_kind(work_kind)?
                    .to_device(self.device())
            };

            let input = self
                .f_reshape(&[1, channels, height, width])?
                .f_to_kind(work_kind)?;
            let pad = kernel_size / 2;
            let padding = [pad, pad, pad, pad];

            // reflection requires the padding to be smaller than the input
            let padded = if pad < height && pad < width {
                input.f_reflection_pad2d(&padding)?
            } else {
                warn!(
                    "image of size {}x{} is too small to reflect by {} pixels, replicate padding is used instead",
                    height, width, pad
                );
                input.f_replication_pad2d(&padding)?
            };

            let blurred =
                padded.f_conv2d(&kernel, None::<Tensor>, &[1, 1], &[0, 0], &[1, 1], channels)?;
            let blurred = if work_kind == orig_kind {
                blurred
            } else {
                blurred.f_round()?.f_to_kind(orig_kind)?
            };

            Ok(blurred.f_view(self.size().as_slice())?)
        })
    }

    fn f_adjust_brightness(&self, factor: f64) -> Result<Tensor> {
        ensure!(
            is_floating_kind(self.kind()),
            "brightness adjustment expects a floating point image, but get {:?}",
            self.kind()
        );
        ensure!(
            factor >= 0.0,
            "brightness factor must be non-negative, but get {}",
            factor
        );

        tch::no_grad(|| {
            let adjusted = (self * factor).f_clamp(0.0, 1.0)?;
            Ok(adjusted)
        })
    }

    fn f_adjust_contrast(&self, factor: f64) -> Result<Tensor> {
        ensure!(
            is_floating_kind(self.kind()),
            "contrast adjustment expects a floating point image, but get {:?}",
            self.kind()
        );
        ensure!(
            factor >= 0.0,
            "contrast factor must be non-negative, but get {}",
            factor
        );

        tch::no_grad(|| {
            let mean = self.f_rgb_to_grayscale()?.f_mean(self.kind())?;
            let adjusted = (self * factor + mean * (1.0 - factor)).f_clamp(0.0, 1.0)?;
            Ok(adjusted)
        })
    }

    fn f_rgb_to_grayscale(&self) -> Result<Tensor> {
        match self.size().as_slice() {
            &[3, _h, _w] => {
                let red = self.select(0, 0);
                let green = self.select(0, 1);
                let blue = self.select(0, 2);
                let gray = red * 0.2989 + green * 0.587 + blue * 0.114;
                Ok(gray.f_unsqueeze(0)?)
            }
            &[1, _h, _w] | &[_, _] => Ok(self.shallow_clone()),
            shape => bail!(
                "expect a 1 or 3 channel image, but get shape {:?}",
                shape
            ),
        }
    }

    fn f_resize2d_exact(&self, size: &HW<i64>, interpolation: Interpolation) -> Result<Tensor> {
        let orig_shape = self.size();
        let (channels, height, width) = match orig_shape.as_slice() {
            &[c, h, w] => (c, h, w),
            &[h, w] => (1, h, w),
            shape => bail!("expect 2 or 3 dimensions, but get shape {:?}", shape),
        };
        ensure!(
            !size.is_empty(),
            "target size must be non-empty, but get {:?}",
            size
        );

        let new_shape: Vec<i64> = match orig_shape.len() {
            3 => vec![channels, size.h(), size.w()],
            _ => vec![size.h(), size.w()],
        };
        if self.numel() == 0 {
            return Ok(Tensor::zeros(&new_shape, (self.kind(), self.device())));
        }

        let orig_kind = self.kind();
        let work_kind = if is_floating_kind(orig_kind) {
            orig_kind
        } else {
            Kind::Float
        };

        tch::no_grad(|| -> Result<_> {
            let input = self
                .f_reshape(&[1, channels, height, width])?
                .f_to_kind(work_kind)?;
            let output_size = [size.h(), size.w()];
            let resized = match interpolation {
                Interpolation::Nearest => input.f_upsample_nearest2d(&output_size, None, None)?,
                Interpolation::Bilinear => {
                    input.f_upsample_bilinear2d(&output_size, false, None, None)?
                }
            };
            let resized = restore_kind(resized, orig_kind, interpolation)?;
            Ok(resized.f_view(new_shape.as_slice())?)
        })
    }

    fn f_warp_affine2d(
        &self,
        affine: &Affine<f64>,
        interpolation: Interpolation,
    ) -> Result<Tensor> {
        let (channels, height, width) = match self.size().as_slice() {
            &[c, h, w] => (c, h, w),
            &[h, w] => (1, h, w),
            shape => bail!("expect 2 or 3 dimensions, but get shape {:?}", shape),
        };
        if self.numel() == 0 {
            return Ok(self.shallow_clone());
        }

        // sample each output pixel from its pre-image
        let inverse = affine.try_inverse()?;
        let orig_kind = self.kind();
        let work_kind = if is_floating_kind(orig_kind) {
            orig_kind
        } else {
            Kind::Float
        };
        let device = self.device();

        tch::no_grad(|| -> Result<_> {
            let xs = Tensor::arange(width, (Kind::Double, device))
                .f_view([1, width])?
                .f_expand(&[height, width], false)?;
            let ys = Tensor::arange(height, (Kind::Double, device))
                .f_view([height, 1])?
                .f_expand(&[height, width], false)?;

            let src_x = &xs * inverse.a + &ys * inverse.b + inverse.tx;
            let src_y = &xs * inverse.c + &ys * inverse.d + inverse.ty;

            // normalize to [-1, 1] with align_corners = false
            let grid_x = (src_x * 2.0 + 1.0) / width as f64 - 1.0;
            let grid_y = (src_y * 2.0 + 1.0) / height as f64 - 1.0;
            let grid = Tensor::stack(&[grid_x, grid_y], 2)
                .f_unsqueeze(0)?
                .f_to_kind(work_kind)?;

            let input = self
                .f_reshape(&[1, channels, height, width])?
                .f_to_kind(work_kind)?;
            let sampled =
                input.f_grid_sampler(&grid, interpolation.grid_sampler_mode(), 0, false)?;
            let sampled = restore_kind(sampled, orig_kind, interpolation)?;

            Ok(sampled.f_view(self.size().as_slice())?)
        })
    }

    fn f_fill_rect_(&mut self, rect: &XYXY<i64>, color: &Tensor) -> Result<Tensor> {
        let (n_channels, height, width) = self.size3()?;
        ensure!(
            color.size1()? == n_channels,
            "the number of channels of input and color tensors do not match"
        );
        let rect = rect.clamp_to(&HW::try_from_hw([height, width])?);

        tch::no_grad(|| -> Result<_> {
            let mut region = self.i((
                ..,
                rect.y_min()..(rect.y_max() + 1),
                rect.x_min()..(rect.x_max() + 1),
            ));
            let expanded_color = color
                .f_to_kind(self.kind())?
                .f_view([n_channels, 1, 1])?
                .f_expand_as(&region)?;
            region.f_copy_(&expanded_color)?;
            Ok(())
        })?;

        Ok(self.shallow_clone())
    }

    fn f_draw_rect_(
        &mut self,
        rect: &XYXY<i64>,
        stroke: usize,
        color: &Tensor,
    ) -> Result<Tensor> {
        ensure!(stroke > 0, "stroke must be positive");
        let stroke = stroke as i64 - 1;
        let [x_min, y_min, x_max, y_max] = rect.xyxy();

        let edges = [
            [x_min, y_min, x_max, (y_min + stroke).min(y_max)],
            [x_min, (y_max - stroke).max(y_min), x_max, y_max],
            [x_min, y_min, (x_min + stroke).min(x_max), y_max],
            [(x_max - stroke).max(x_min), y_min, x_max, y_max],
        ];

        for edge in edges {
            let edge = XYXY::try_from_xyxy(edge)?;
            let _ = self.f_fill_rect_(&edge, color)?;
        }

        Ok(self.shallow_clone())
    }
}

fn restore_kind(tensor: Tensor, kind: Kind, interpolation: Interpolation) -> Result<Tensor> {
    if tensor.kind() == kind {
        return Ok(tensor);
    }
    let tensor = match (kind, interpolation) {
        (Kind::Bool, _) => tensor.f_ne(0.0)?,
        (_, Interpolation::Bilinear) => tensor.f_round()?.f_to_kind(kind)?,
        (_, Interpolation::Nearest) => tensor.f_to_kind(kind)?,
    };
    Ok(tensor)
}
