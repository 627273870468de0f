//! Conversions between `image` crate buffers and `[C, H, W]` tensors.

use crate::common::*;

pub trait IntoTensor {
    fn into_tensor(self) -> Tensor;
}

impl<P, Container> IntoTensor for &ImageBuffer<P, Container>
where
    P: Pixel + 'static,
    P::Subpixel: 'static + Element,
    Container: Deref<Target = [P::Subpixel]>,
{
    fn into_tensor(self) -> Tensor {
        let (width, height) = self.dimensions();
        let channels = P::CHANNEL_COUNT as i64;

        // the buffer is laid out as interleaved [H, W, C]
        let samples: &[P::Subpixel] = self;
        Tensor::of_slice(samples)
            .view([height as i64, width as i64, channels])
            .permute(&[2, 0, 1])
            .contiguous()
    }
}

pub trait TryIntoTensor {
    type Error;

    fn try_into_tensor(self) -> Result<Tensor, Self::Error>;
}

impl TryIntoTensor for &DynamicImage {
    type Error = Error;

    fn try_into_tensor(self) -> Result<Tensor, Self::Error> {
        let tensor = match self {
            DynamicImage::ImageLuma8(image) => image.into_tensor(),
            DynamicImage::ImageLumaA8(image) => image.into_tensor(),
            DynamicImage::ImageRgb8(image) => image.into_tensor(),
            DynamicImage::ImageRgba8(image) => image.into_tensor(),
            DynamicImage::ImageBgr8(_) => self.to_rgb8().into_tensor(),
            DynamicImage::ImageBgra8(_) => self.to_rgba8().into_tensor(),
            _ => bail!("cannot convert an image with u16 components to a tensor"),
        };
        Ok(tensor)
    }
}

pub trait TryIntoImage {
    fn try_into_image(&self) -> Result<DynamicImage>;
}

impl TryIntoImage for Tensor {
    /// Accepts `Uint8` tensors shaped `[H, W]` or `[C, H, W]` with 1, 3 or 4
    /// channels.
    fn try_into_image(&self) -> Result<DynamicImage> {
        ensure!(
            self.kind() == Kind::Uint8,
            "expect a Uint8 tensor, but get {:?}",
            self.kind()
        );
        let (channels, height, width) = match self.size().as_slice() {
            &[h, w] => (1, h, w),
            &[c, h, w] => (c, h, w),
            shape => bail!("expect 2 or 3 dimensions, but get shape {:?}", shape),
        };

        let samples: Vec<u8> = self
            .f_reshape(&[channels, height, width])?
            .f_permute(&[1, 2, 0])?
            .f_reshape(&[-1])?
            .into();
        let (height, width) = (height as u32, width as u32);
        let size_error = || format_err!("the sample count does not match the image size");

        let image = match channels {
            1 => DynamicImage::ImageLuma8(
                ImageBuffer::<Luma<u8>, _>::from_raw(width, height, samples)
                    .ok_or_else(size_error)?,
            ),
            3 => DynamicImage::ImageRgb8(
                ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, samples)
                    .ok_or_else(size_error)?,
            ),
            4 => DynamicImage::ImageRgba8(
                ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, samples)
                    .ok_or_else(size_error)?,
            ),
            _ => bail!(
                "expect 1, 3 or 4 channels to form an image, but get {}",
                channels
            ),
        };
        Ok(image)
    }
}
