//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ConvertConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中源格式校验模式（strict / lenient）作为高层语义开关，
//! 对应历史上并存的两套校验行为：固定白名单与任意 `image/*` 前缀。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的保守配置（strict）。
//! - `ValidationMode` 负责模式字符串解析与反向输出。
//! - `set_limits` 在写入前做区间校验，避免调用方传入无意义预算。

use image::imageops::FilterType;

use super::ConvertError;

/// 图标画布允许的最大边长（ICO 容器上限为 256）。
const ICON_SIZE_MAX: u32 = 256;

/// 图片转换配置。
///
/// 字段覆盖了源校验、解码预算与图标画布三类策略。
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// 源 MIME 校验模式。
    pub validation: ValidationMode,
    /// 源文件允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 图标策略的固定画布边长（像素）。
    pub icon_size: u32,
    /// 图标拉伸使用的滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::Strict,
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            icon_size: 32,
            resize_filter: FilterType::Triangle,
        }
    }
}

/// 源格式校验模式。
///
/// - `Strict`：仅接受固定白名单中的 MIME 类型
/// - `Lenient`：接受任意 `image/*` 前缀的 MIME 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Strict,
    Lenient,
}

impl ValidationMode {
    /// 从外部字符串解析校验模式。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use image_converter::converter::ValidationMode;
    ///
    /// let mode = ValidationMode::from_str("lenient")?;
    /// assert_eq!(mode.as_str(), "lenient");
    /// # Ok::<(), image_converter::converter::ConvertError>(())
    /// ```
    pub(crate) fn from_str(mode: &str) -> Result<Self, ConvertError> {
        match mode.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(ConvertError::InvalidRequest(format!(
                "未知校验模式：{}（可选：strict / lenient）",
                other
            ))),
        }
    }

    /// 将模式输出为稳定字符串，供调用方展示与持久化。
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }
}

/// 可对外暴露的预算快照。
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConvertLimits {
    pub max_file_size: u64,
    pub max_decoded_pixels: u64,
    pub max_decoded_bytes: u64,
    pub icon_size: u32,
}

impl ConvertConfig {
    /// 应用预算配置，写入前做区间校验。
    pub(crate) fn set_limits(&mut self, limits: ConvertLimits) -> Result<(), ConvertError> {
        if limits.max_file_size < 1024 * 1024 {
            return Err(ConvertError::InvalidRequest(
                "max_file_size 不能小于 1MB".to_string(),
            ));
        }
        if limits.max_decoded_pixels < 1_000_000 {
            return Err(ConvertError::InvalidRequest(
                "max_decoded_pixels 不能小于 1M 像素".to_string(),
            ));
        }
        if limits.max_decoded_bytes < 8 * 1024 * 1024 {
            return Err(ConvertError::InvalidRequest(
                "max_decoded_bytes 不能小于 8MB".to_string(),
            ));
        }
        if !(1..=ICON_SIZE_MAX).contains(&limits.icon_size) {
            return Err(ConvertError::InvalidRequest(format!(
                "icon_size 必须在 1~{} 像素之间",
                ICON_SIZE_MAX
            )));
        }

        self.max_file_size = limits.max_file_size;
        self.max_decoded_pixels = limits.max_decoded_pixels;
        self.max_decoded_bytes = limits.max_decoded_bytes;
        self.icon_size = limits.icon_size;

        Ok(())
    }

    /// 导出当前预算快照。
    pub(crate) fn limits(&self) -> ConvertLimits {
        ConvertLimits {
            max_file_size: self.max_file_size,
            max_decoded_pixels: self.max_decoded_pixels,
            max_decoded_bytes: self.max_decoded_bytes,
            icon_size: self.icon_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_mode_roundtrip() {
        let strict = ValidationMode::from_str("strict").expect("parse strict should succeed");
        assert_eq!(strict.as_str(), "strict");

        let lenient = ValidationMode::from_str(" Lenient ").expect("parse lenient should succeed");
        assert_eq!(lenient.as_str(), "lenient");
    }

    #[test]
    fn validation_mode_rejects_unknown_keyword() {
        let result = ValidationMode::from_str("permissive");
        assert!(matches!(result, Err(ConvertError::InvalidRequest(_))));
    }

    #[test]
    fn limits_reject_out_of_range_values() {
        let mut config = ConvertConfig::default();

        let too_small_file = ConvertLimits {
            max_file_size: 1024,
            ..config.limits()
        };
        assert!(matches!(
            config.set_limits(too_small_file),
            Err(ConvertError::InvalidRequest(_))
        ));

        let oversized_icon = ConvertLimits {
            icon_size: 512,
            ..config.limits()
        };
        assert!(matches!(
            config.set_limits(oversized_icon),
            Err(ConvertError::InvalidRequest(_))
        ));
    }

    #[test]
    fn limits_accept_valid_values() {
        let mut config = ConvertConfig::default();

        config
            .set_limits(ConvertLimits {
                max_file_size: 8 * 1024 * 1024,
                max_decoded_pixels: 10_000_000,
                max_decoded_bytes: 64 * 1024 * 1024,
                icon_size: 64,
            })
            .expect("valid limits should be accepted");

        let snapshot = config.limits();
        assert_eq!(snapshot.max_file_size, 8 * 1024 * 1024);
        assert_eq!(snapshot.icon_size, 64);
    }
}
