//! # 格式解析模块
//!
//! ## 设计思路
//!
//! 把“源 MIME → 格式标签”“可选目标列表”“目标关键字 → 编码策略”三件事
//! 集中在一个无状态解析器里，调用方在装载新文件时重算一次，
//! 保证可选列表永远不含源文件自身的格式标签。
//!
//! ## 实现思路
//!
//! - 标签映射：`image/svg+xml → svg`、`image/x-icon → ico`，其余取 `/` 后子类型。
//! - strict 模式按固定白名单校验；lenient 模式仅要求 `image/` 前缀。
//! - 策略只由目标关键字决定，与源标签无关。

use super::{ConvertError, ValidationMode};

/// 固定目标格式关键字集合，按展示顺序排列。
pub const TARGET_FORMATS: [&str; 6] = ["png", "jpg", "webp", "bmp", "ico", "svg"];

/// strict 模式接受的源 MIME 白名单。
const STRICT_SOURCE_MIMES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/bmp",
    "image/svg+xml",
    "image/x-icon",
];

/// 目标关键字对应的编码策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// 以目标格式原生编码全尺寸重编码。
    StandardReencode,
    /// 拉伸进固定小画布后按图标容器编码。
    Icon,
    /// 不重编码像素，仅产出内嵌原始字节的 SVG 包装文档。
    SvgWrap,
}

impl Strategy {
    /// 仅根据目标关键字选择策略，与源格式无关。
    pub fn for_target(target: &str) -> Self {
        match target {
            "ico" => Self::Icon,
            "svg" => Self::SvgWrap,
            _ => Self::StandardReencode,
        }
    }
}

/// 解析结果：源标签与剔除源标签后的可选目标序列。
#[derive(Debug, Clone)]
pub struct Resolution {
    /// 源文件的格式标签。
    pub source_tag: String,
    /// 可选目标关键字，顺序保持候选集原有顺序。
    pub selectable: Vec<String>,
}

/// 将声明 MIME 映射为短格式标签。
pub(crate) fn format_tag(mime_type: &str) -> String {
    let normalized = mime_type.trim().to_lowercase();
    match normalized.as_str() {
        "image/svg+xml" => "svg".to_string(),
        "image/x-icon" => "ico".to_string(),
        _ => normalized
            .split_once('/')
            .map(|(_, subtype)| subtype.to_string())
            .unwrap_or(normalized),
    }
}

/// 按当前校验模式校验源 MIME。
pub(crate) fn validate_source_mime(
    mime_type: &str,
    mode: ValidationMode,
) -> Result<(), ConvertError> {
    let normalized = mime_type.trim().to_lowercase();

    match mode {
        ValidationMode::Strict => {
            if !STRICT_SOURCE_MIMES.contains(&normalized.as_str()) {
                return Err(ConvertError::UnsupportedSource(format!(
                    "{}（支持：JPG / PNG / WebP / BMP / SVG / ICO）",
                    mime_type
                )));
            }
        }
        ValidationMode::Lenient => {
            if !normalized.starts_with("image/") {
                return Err(ConvertError::UnsupportedSource(format!(
                    "{}（仅接受 image/* 类型）",
                    mime_type
                )));
            }
        }
    }

    Ok(())
}

/// 解析源 MIME，产出格式标签与可选目标列表。
///
/// 校验失败时不产出任何候选集。
pub fn resolve(
    source_mime: &str,
    candidates: &[&str],
    mode: ValidationMode,
) -> Result<Resolution, ConvertError> {
    validate_source_mime(source_mime, mode)?;

    let source_tag = format_tag(source_mime);
    let selectable = candidates
        .iter()
        .filter(|candidate| **candidate != source_tag)
        .map(|candidate| candidate.to_string())
        .collect();

    Ok(Resolution {
        source_tag,
        selectable,
    })
}

/// 目标关键字对应的产物 MIME。
pub(crate) fn target_mime(target: &str) -> String {
    match target {
        "ico" => "image/x-icon".to_string(),
        "svg" => "image/svg+xml".to_string(),
        _ => format!("image/{}", target),
    }
}
