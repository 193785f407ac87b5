//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageConverter` 只负责流程编排与配置管理，不持有任何请求状态。
//! 单次转换的链路固定为：
//! 1. 读取配置快照
//! 2. 解析源格式与目标策略
//! 3. 解码为像素面
//! 4. 按策略编码并组装产物
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ConvertConfig>>` 支持运行时切换校验模式。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `resolve/decode/encode/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::encode;
use super::resolver::{self, Resolution, Strategy, TARGET_FORMATS};
use super::source::{OutputArtifact, SourceImage};
use super::{ConvertConfig, ConvertError, ConvertLimits, ValidationMode};

/// 图片转换器。
///
/// 封装配置状态并编排各子模块，自身不保存“当前文件”之类的全局状态。
pub struct ImageConverter {
    config: Arc<RwLock<ConvertConfig>>,
}

impl ImageConverter {
    /// 根据初始配置创建转换器。
    pub fn new(config: ConvertConfig) -> Result<Self, ConvertError> {
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub(super) fn config_snapshot(&self) -> Result<ConvertConfig, ConvertError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ConvertError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 切换源格式校验模式。
    pub fn set_validation_mode(&self, mode: ValidationMode) -> Result<(), ConvertError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ConvertError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.validation = mode;

        log::info!("⚙️ 已切换源校验模式：{}", mode.as_str());
        Ok(())
    }

    /// 读取当前生效的校验模式。
    pub fn validation_mode(&self) -> Result<ValidationMode, ConvertError> {
        Ok(self.config_snapshot()?.validation)
    }

    /// 应用预算配置（含区间校验）。
    pub fn set_limits(&self, limits: ConvertLimits) -> Result<(), ConvertError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ConvertError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.set_limits(limits)
    }

    /// 导出当前预算快照。
    pub fn limits(&self) -> Result<ConvertLimits, ConvertError> {
        Ok(self.config_snapshot()?.limits())
    }

    /// 解析源文件：校验 MIME 并产出格式标签与可选目标列表。
    ///
    /// 调用方在装载新文件时调用一次，可选列表永远不含源标签。
    pub fn resolve_source(&self, source: &SourceImage) -> Result<Resolution, ConvertError> {
        let config = self.config_snapshot()?;
        resolver::resolve(&source.mime_type, &TARGET_FORMATS, config.validation)
    }

    /// 转换主入口：单个源文件 + 目标关键字 → 可下载产物。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use image_converter::converter::{ConvertConfig, SourceImage};
    ///
    /// let converter = ImageConverter::new(ConvertConfig::default())?;
    /// let artifact = converter.convert(&source, "webp")?;
    /// assert_eq!(artifact.mime_type, "image/webp");
    /// # Ok::<(), image_converter::converter::ConvertError>(())
    /// ```
    pub fn convert(&self, source: &SourceImage, target: &str) -> Result<OutputArtifact, ConvertError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let target = target.trim().to_lowercase();
        if target.is_empty() {
            return Err(ConvertError::InvalidRequest("未选择目标格式".to_string()));
        }
        if !TARGET_FORMATS.contains(&target.as_str()) {
            return Err(ConvertError::InvalidRequest(format!(
                "未知目标格式：{}",
                target
            )));
        }

        let resolve_start = Instant::now();
        let resolution =
            resolver::resolve(&source.mime_type, &TARGET_FORMATS, config.validation)?;
        if resolution.source_tag == target {
            return Err(ConvertError::InvalidRequest(format!(
                "目标格式与源格式相同：{}",
                target
            )));
        }
        let strategy = Strategy::for_target(&target);
        let resolve_elapsed = resolve_start.elapsed();

        let decode_start = Instant::now();
        let surface = self.decode_surface(source, &config)?;
        let decode_elapsed = decode_start.elapsed();

        let encode_start = Instant::now();
        let bytes = match strategy {
            Strategy::StandardReencode => Self::encode_standard(&surface, &target)?,
            Strategy::Icon => Self::encode_icon(&surface, &config)?,
            Strategy::SvgWrap => Self::wrap_svg(source, &surface),
        };
        let encode_elapsed = encode_start.elapsed();

        let artifact = OutputArtifact {
            bytes,
            mime_type: resolver::target_mime(&target),
            file_name: encode::replace_extension(&source.file_name, &target),
        };

        log::info!(
            "✅ 转换完成 - {} → {}（{:?}, {}x{}）resolve={}ms decode={}ms encode={}ms total={}ms",
            resolution.source_tag,
            target,
            strategy,
            surface.width,
            surface.height,
            resolve_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn init_test_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn create_image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        // JPEG 编码器不接受 alpha 通道
        let dyn_img = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8())
        } else {
            DynamicImage::ImageRgba8(img)
        };

        let mut cursor = Cursor::new(Vec::new());
        dyn_img
            .write_to(&mut cursor, format)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn converter() -> ImageConverter {
        ImageConverter::new(ConvertConfig::default()).expect("converter init failed")
    }

    #[test]
    fn png_to_ico_yields_fixed_canvas_and_derived_name() {
        init_test_logger();
        let converter = converter();

        let source = SourceImage {
            bytes: create_image_bytes(100, 50, ImageFormat::Png),
            mime_type: "image/png".to_string(),
            file_name: "a.png".to_string(),
        };

        let artifact = converter
            .convert(&source, "ico")
            .expect("png→ico should succeed");

        assert_eq!(artifact.mime_type, "image/x-icon");
        assert_eq!(artifact.file_name, "a.ico");

        let decoded = image::load_from_memory(&artifact.bytes).expect("ico output should decode");
        assert_eq!(decoded.dimensions(), (32, 32));
    }

    #[test]
    fn standard_targets_report_exact_mime_and_extension() {
        let converter = converter();

        let source = SourceImage {
            bytes: create_image_bytes(40, 30, ImageFormat::Png),
            mime_type: "image/png".to_string(),
            file_name: "photo.png".to_string(),
        };

        for target in ["jpg", "webp", "bmp"] {
            let artifact = converter
                .convert(&source, target)
                .expect("standard reencode should succeed");

            assert_eq!(artifact.mime_type, format!("image/{}", target));
            assert!(artifact.file_name.ends_with(&format!(".{}", target)));

            let decoded =
                image::load_from_memory(&artifact.bytes).expect("output should decode back");
            assert_eq!(decoded.dimensions(), (40, 30));
        }
    }

    #[test]
    fn jpeg_to_svg_wraps_original_bytes_at_native_size() {
        let converter = converter();

        let bytes = create_image_bytes(60, 40, ImageFormat::Jpeg);
        let source = SourceImage {
            bytes: bytes.clone(),
            mime_type: "image/jpeg".to_string(),
            file_name: "c.jpeg".to_string(),
        };

        let artifact = converter
            .convert(&source, "svg")
            .expect("jpeg→svg should succeed");

        assert_eq!(artifact.mime_type, "image/svg+xml");
        assert_eq!(artifact.file_name, "c.svg");

        let document =
            String::from_utf8(artifact.bytes).expect("svg wrapper should be valid UTF-8");
        assert!(document.contains(r#"width="60" height="40""#));
        assert!(document.contains("data:image/jpeg;base64,"));
    }

    #[test]
    fn svg_source_reencodes_into_raster_target() {
        let converter = converter();

        let source = SourceImage {
            bytes: br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="8"><rect width="10" height="8" fill="#996633"/></svg>"##
                .to_vec(),
            mime_type: "image/svg+xml".to_string(),
            file_name: "box.svg".to_string(),
        };

        let artifact = converter
            .convert(&source, "png")
            .expect("svg→png should succeed");

        assert_eq!(artifact.mime_type, "image/png");
        assert_eq!(artifact.file_name, "box.png");

        let decoded = image::load_from_memory(&artifact.bytes).expect("png output should decode");
        assert_eq!(decoded.dimensions(), (10, 8));
    }

    #[test]
    fn converting_into_source_format_is_invalid() {
        let converter = converter();

        let source = SourceImage {
            bytes: create_image_bytes(8, 8, ImageFormat::Png),
            mime_type: "image/png".to_string(),
            file_name: "same.png".to_string(),
        };

        let result = converter.convert(&source, "png");
        assert!(matches!(result, Err(ConvertError::InvalidRequest(_))));
    }

    #[test]
    fn unknown_or_missing_target_is_invalid() {
        let converter = converter();

        let source = SourceImage {
            bytes: create_image_bytes(8, 8, ImageFormat::Png),
            mime_type: "image/png".to_string(),
            file_name: "x.png".to_string(),
        };

        assert!(matches!(
            converter.convert(&source, "gif"),
            Err(ConvertError::InvalidRequest(_))
        ));
        assert!(matches!(
            converter.convert(&source, "  "),
            Err(ConvertError::InvalidRequest(_))
        ));
    }

    #[test]
    fn strict_mode_blocks_tiff_before_decoding() {
        let converter = converter();

        let source = SourceImage {
            bytes: create_image_bytes(8, 8, ImageFormat::Png),
            mime_type: "image/tiff".to_string(),
            file_name: "scan.tiff".to_string(),
        };

        let result = converter.convert(&source, "png");
        assert!(matches!(result, Err(ConvertError::UnsupportedSource(_))));
    }

    #[test]
    fn lenient_mode_accepts_unlisted_image_subtype() {
        let converter = converter();
        converter
            .set_validation_mode(ValidationMode::Lenient)
            .expect("mode switch should succeed");

        let source = SourceImage {
            bytes: create_image_bytes(8, 8, ImageFormat::Png),
            mime_type: "image/tiff".to_string(),
            file_name: "scan.tiff".to_string(),
        };

        let artifact = converter
            .convert(&source, "webp")
            .expect("lenient mode should convert by byte signature");
        assert_eq!(artifact.mime_type, "image/webp");
        assert_eq!(artifact.file_name, "scan.webp");
    }

    #[test]
    fn custom_icon_canvas_size_is_honored() {
        let converter = converter();
        converter
            .set_limits(ConvertLimits {
                icon_size: 64,
                ..converter.limits().expect("limits snapshot failed")
            })
            .expect("limits update should succeed");

        let source = SourceImage {
            bytes: create_image_bytes(100, 50, ImageFormat::Png),
            mime_type: "image/png".to_string(),
            file_name: "a.png".to_string(),
        };

        let artifact = converter
            .convert(&source, "ico")
            .expect("png→ico should succeed");

        let decoded = image::load_from_memory(&artifact.bytes).expect("ico output should decode");
        assert_eq!(decoded.dimensions(), (64, 64));
    }

    #[test]
    fn resolve_source_excludes_own_tag() {
        let converter = converter();

        let source = SourceImage {
            bytes: create_image_bytes(8, 8, ImageFormat::Bmp),
            mime_type: "image/bmp".to_string(),
            file_name: "b.bmp".to_string(),
        };

        let resolution = converter
            .resolve_source(&source)
            .expect("bmp source should resolve");
        assert_eq!(resolution.source_tag, "bmp");
        assert_eq!(
            resolution.selectable,
            vec!["png", "jpg", "webp", "ico", "svg"]
        );
    }
}
