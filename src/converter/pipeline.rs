//! # 解码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 像素面”的过程集中管理，并在关键节点增加资源上限控制。
//! 先做签名与尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 源为 SVG 时走矢量光栅化分支（位图解码器不认识 SVG 文本）
//! 2. 其余格式先做字节签名校验，再读取 header 尺寸
//! 3. 按像素与内存上限快速拒绝
//! 4. 完整解码并复核尺寸
//!
//! 图标策略所需的定尺寸拉伸也放在本模块：优先 `fast_image_resize`，
//! 失败时回退 `image::resize_exact`。

use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, Rgba};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;

use super::source::{DecodedSurface, SourceImage};
use super::{ConvertConfig, ConvertError, ImageConverter, resolver};

impl ImageConverter {
    /// 将源文件字节解码为像素面。
    ///
    /// 失败即终止本次请求：解码问题映射 `Decode`，预算问题映射 `ResourceLimit`。
    pub(super) fn decode_surface(
        &self,
        source: &SourceImage,
        config: &ConvertConfig,
    ) -> Result<DecodedSurface, ConvertError> {
        if source.bytes.is_empty() {
            return Err(ConvertError::Decode("图片内容为空".to_string()));
        }

        if source.bytes.len() as u64 > config.max_file_size {
            return Err(ConvertError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                source.bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        // SVG 是文本格式，签名探测与位图解码器都无法处理
        if resolver::format_tag(&source.mime_type) == "svg" {
            return Self::rasterize_svg(&source.bytes, config);
        }

        Self::validate_image_signature(&source.bytes)?;

        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&source.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&source.bytes)
            .map_err(|e| ConvertError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(config, width, height)?;
        Self::validate_decoded_memory_limits(config, width, height)?;

        Ok(DecodedSurface {
            image: decoded,
            width,
            height,
        })
    }

    /// 校验字节签名属于图片类型。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), ConvertError> {
        let kind = infer::get(bytes)
            .ok_or_else(|| ConvertError::Decode("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ConvertError::Decode(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }

    /// 仅通过内存中的图片头信息读取宽高。
    ///
    /// 用于在完整解码前做像素限制检查。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ConvertError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ConvertError::Decode(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ConvertError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(
        config: &ConvertConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ConvertError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ConvertError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ConvertError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &ConvertConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ConvertError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| ConvertError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(ConvertError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 将 SVG 文本按文档原生尺寸光栅化为 RGBA 像素面。
    fn rasterize_svg(bytes: &[u8], config: &ConvertConfig) -> Result<DecodedSurface, ConvertError> {
        let options = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &options)
            .map_err(|e| ConvertError::Decode(format!("SVG 解析失败：{}", e)))?;

        let size = tree.size();
        let width = (size.width().ceil() as u32).max(1);
        let height = (size.height().ceil() as u32).max(1);

        Self::validate_pixel_limits(config, width, height)?;
        Self::validate_decoded_memory_limits(config, width, height)?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| ConvertError::Decode("SVG 画布尺寸无效".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width, height, pixmap.take())
            .ok_or_else(|| ConvertError::Decode("SVG 光栅化输出缓冲长度异常".to_string()))?;

        Ok(DecodedSurface {
            image: DynamicImage::ImageRgba8(rgba),
            width,
            height,
        })
    }

    /// 直接拉伸进 `side x side` 的方形画布，不保持宽高比。
    pub(super) fn stretch_to_canvas(
        image: &DynamicImage,
        side: u32,
        filter: image::imageops::FilterType,
    ) -> DynamicImage {
        match Self::stretch_with_fast_image_resize(image, side, filter) {
            Ok(stretched) => stretched,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 拉伸失败，回退 image::resize_exact：{}", err);
                image.resize_exact(side, side, filter)
            }
        }
    }

    fn stretch_with_fast_image_resize(
        image: &DynamicImage,
        side: u32,
        filter: image::imageops::FilterType,
    ) -> Result<DynamicImage, ConvertError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| ConvertError::Encode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(side, side, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(Self::to_fast_filter(filter)));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ConvertError::Encode(format!("fast_image_resize 执行失败：{}", e)))?;

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(side, side, dst_image.into_vec())
            .ok_or_else(|| ConvertError::Encode("fast_image_resize 输出缓冲长度异常".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
        match filter {
            image::imageops::FilterType::Nearest => fr::FilterType::Box,
            image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
            image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
            image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
            image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}
