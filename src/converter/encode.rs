//! # 编码与产物组装模块
//!
//! ## 设计思路
//!
//! 三种策略在此收敛为“像素面/源字节 → 产物字节”：
//! - 标准重编码：按目标格式原生编码，默认质量，原生尺寸
//! - 图标：拉伸进固定画布后写入 ICO 容器
//! - SVG 包装：不触碰像素，原始字节以 data URI 形式内嵌进 SVG 文档
//!
//! 输出文件名的派生规则也在本模块：去掉最后一个扩展名段，拼接目标关键字，
//! 重复转换不会堆叠扩展名。

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use super::source::{DecodedSurface, SourceImage};
use super::{ConvertConfig, ConvertError, ImageConverter};

impl ImageConverter {
    /// 标准重编码：原生尺寸，目标格式默认质量。
    pub(super) fn encode_standard(
        surface: &DecodedSurface,
        target: &str,
    ) -> Result<Vec<u8>, ConvertError> {
        let format = match target {
            "png" => ImageFormat::Png,
            "jpg" => ImageFormat::Jpeg,
            "webp" => ImageFormat::WebP,
            "bmp" => ImageFormat::Bmp,
            other => {
                return Err(ConvertError::InvalidRequest(format!(
                    "目标格式没有对应的重编码器：{}",
                    other
                )));
            }
        };

        let mut cursor = Cursor::new(Vec::new());

        // JPEG 编码器不接受带 alpha 通道的像素
        if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(surface.image.to_rgb8())
                .write_to(&mut cursor, format)
                .map_err(|e| ConvertError::Encode(format!("JPEG 编码失败：{}", e)))?;
        } else {
            surface
                .image
                .write_to(&mut cursor, format)
                .map_err(|e| ConvertError::Encode(format!("{} 编码失败：{}", target, e)))?;
        }

        Ok(cursor.into_inner())
    }

    /// 图标策略：拉伸进 `icon_size` 方形画布后写入 ICO 容器。
    ///
    /// 不保持宽高比，与源实现的 canvas 直接绘制行为一致。
    pub(super) fn encode_icon(
        surface: &DecodedSurface,
        config: &ConvertConfig,
    ) -> Result<Vec<u8>, ConvertError> {
        let canvas = Self::stretch_to_canvas(&surface.image, config.icon_size, config.resize_filter);

        let mut cursor = Cursor::new(Vec::new());
        canvas
            .write_to(&mut cursor, ImageFormat::Ico)
            .map_err(|e| ConvertError::Encode(format!("ICO 编码失败：{}", e)))?;

        Ok(cursor.into_inner())
    }

    /// SVG 包装：像素零重编码，原始字节按声明 MIME 内嵌为 data URI。
    ///
    /// 文档声明的宽高取解码后的原生尺寸。
    pub(super) fn wrap_svg(source: &SourceImage, surface: &DecodedSurface) -> Vec<u8> {
        let encoded = general_purpose::STANDARD.encode(&source.bytes);
        let data_uri = format!("data:{};base64,{}", source.mime_type, encoded);

        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">\n    <image href=\"{data_uri}\" width=\"{width}\" height=\"{height}\"/>\n</svg>\n",
            width = surface.width,
            height = surface.height,
        )
        .into_bytes()
    }
}

/// 派生输出文件名：去掉最后一个扩展名段，拼接目标关键字。
///
/// 点号开头的隐藏文件名不视为扩展名，保留主干。
pub(super) fn replace_extension(file_name: &str, target: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    format!("{}.{}", stem, target)
}
