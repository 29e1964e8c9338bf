//! 整幅图像驱动.
//!
//! 在 `image` crate 的 8 位缓冲与编解码上下文之间搬运数据:
//! 读入时 `v = b / 255 - 0.5`, 写出时四舍五入并钳位. 每幅图像使用一个新上下文,
//! 行按从上到下的顺序处理.

use composite_codec::{CompositeContext, DiagnosticSink};
use composite_core::sample::{bytes_to_samples, samples_to_bytes};
use composite_core::{CompositeError, CompositeResult, try_alloc};
use image::{GrayImage, RgbImage};
use log::debug;

use crate::create_context;

/// 编码 RGB 图像为单通道复合信号图像
///
/// `diagnostics` 存在时在处理前输出载波参数.
pub fn encode_image(
    image: &RgbImage,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
) -> CompositeResult<GrayImage> {
    let (w, h) = checked_dimensions(image.width(), image.height())?;
    let mut ctx = prepare(w, false, diagnostics)?;

    let mut rgb: Vec<f32> = try_alloc(w * 3, "RGB 行缓冲")?;
    let mut signal: Vec<f32> = try_alloc(w, "复合信号行缓冲")?;
    let mut output = GrayImage::new(image.width(), image.height());

    for (src, dst) in image
        .as_raw()
        .chunks_exact(w * 3)
        .zip(output.chunks_exact_mut(w))
    {
        bytes_to_samples(src, &mut rgb);
        ctx.encode_line(&rgb, &mut signal)?;
        samples_to_bytes(&signal, dst);
    }

    debug!("编码完成: {w}x{h}");
    Ok(output)
}

/// 解码单通道复合信号图像为 RGB 图像
///
/// `harmonic` 选择谐波分离, 否则使用梳状分离.
pub fn decode_image(
    image: &GrayImage,
    harmonic: bool,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
) -> CompositeResult<RgbImage> {
    let (w, h) = checked_dimensions(image.width(), image.height())?;
    let mut ctx = prepare(w, harmonic, diagnostics)?;

    let mut signal: Vec<f32> = try_alloc(w, "复合信号行缓冲")?;
    let mut rgb: Vec<f32> = try_alloc(w * 3, "RGB 行缓冲")?;
    let mut output = RgbImage::new(image.width(), image.height());

    for (src, dst) in image
        .as_raw()
        .chunks_exact(w)
        .zip(output.chunks_exact_mut(w * 3))
    {
        bytes_to_samples(src, &mut signal);
        ctx.decode_line(&signal, &mut rgb)?;
        samples_to_bytes(&rgb, dst);
    }

    debug!("解码完成: {w}x{h}, 分离模式={}", ctx.separator_mode());
    Ok(output)
}

fn checked_dimensions(width: u32, height: u32) -> CompositeResult<(usize, usize)> {
    if width == 0 || height == 0 {
        return Err(CompositeError::InvalidArgument(format!(
            "图像尺寸无效: {width}x{height}",
        )));
    }
    Ok((width as usize, height as usize))
}

fn prepare(
    width: usize,
    harmonic: bool,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
) -> CompositeResult<CompositeContext> {
    let mut ctx = create_context(width, harmonic)?;
    if let Some(sink) = diagnostics {
        ctx.enable_diagnostics(sink);
    }
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_空图像报错() {
        let empty = RgbImage::new(0, 4);
        assert!(matches!(
            encode_image(&empty, None),
            Err(CompositeError::InvalidArgument(_))
        ));
        let empty = GrayImage::new(4, 0);
        assert!(matches!(
            decode_image(&empty, false, None),
            Err(CompositeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_编码尺寸不变() {
        let image = RgbImage::from_pixel(20, 6, Rgb([200, 40, 90]));
        let encoded = encode_image(&image, None).unwrap();
        assert_eq!(encoded.dimensions(), (20, 6));
    }

    #[test]
    fn test_中灰往返() {
        // 中灰没有色度, 亮度直接穿过, 复合信号即为亮度
        let image = RgbImage::from_pixel(24, 8, Rgb([128, 128, 128]));
        let encoded = encode_image(&image, None).unwrap();
        for p in encoded.pixels() {
            assert!((p.0[0] as i32 - 128).abs() <= 1);
        }

        let decoded = decode_image(&encoded, false, None).unwrap();
        assert_eq!(decoded.dimensions(), (24, 8));
        for p in decoded.pixels() {
            for c in p.0 {
                assert!((c as i32 - 128).abs() <= 2, "通道值 {c} 偏离中灰");
            }
        }
    }

    #[test]
    fn test_谐波解码尺寸() {
        let image = GrayImage::from_pixel(40, 3, Luma([100]));
        let decoded = decode_image(&image, true, None).unwrap();
        assert_eq!(decoded.dimensions(), (40, 3));
    }
}
