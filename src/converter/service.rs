//! # 服务层（调用方会话）
//!
//! ## 设计思路
//!
//! `ConverterService` 是 UI 调用方的唯一入口，替代全局可变“当前文件”状态：
//! 源文件按请求传入，服务自身只持有配置与一个代次计数器。
//!
//! 代次（generation）用来消除“旧请求完成后覆盖新状态”的竞态：
//! 装载新文件或清空选择都会推进代次；转换完成时校验自己携带的代次，
//! 过期产物以 `Superseded` 丢弃，而不是交付给调用方。
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `register_source`：装载新文件，重算可选目标列表
//! - `convert` / `convert_at`：执行完整转换链路（带代次校验）
//! - `set_validation_mode` / `get_validation_mode`：切换与读取校验模式

use std::sync::atomic::{AtomicU64, Ordering};

use super::{
    ConvertConfig, ConvertError, ConvertLimits, ImageConverter, OutputArtifact, SourceImage,
    ValidationMode,
};

/// 装载新文件后的解析结果，交给 UI 渲染目标下拉列表。
#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceSelection {
    /// 源文件的格式标签。
    pub source_tag: String,
    /// 可选目标关键字（已剔除源标签，顺序稳定）。
    pub selectable: Vec<String>,
    /// 本次装载对应的代次，转换请求可携带它做过期检查。
    pub generation: u64,
}

/// 面向调用方的结构化失败信息。
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConvertFailure {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<ConvertError> for ConvertFailure {
    fn from(error: ConvertError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

/// 图片转换服务。
///
/// 由宿主（UI 层）持有，内部封装 `ImageConverter` 与代次计数器。
pub struct ConverterService {
    converter: ImageConverter,
    generation: AtomicU64,
}

impl ConverterService {
    /// 使用默认配置创建服务。
    pub fn new() -> Result<Self, ConvertError> {
        Self::with_config(ConvertConfig::default())
    }

    /// 使用自定义配置创建服务。
    ///
    /// 主要用于测试或按场景注入不同校验模式。
    pub fn with_config(config: ConvertConfig) -> Result<Self, ConvertError> {
        let converter = ImageConverter::new(config)?;
        Ok(Self {
            converter,
            generation: AtomicU64::new(0),
        })
    }

    /// 装载新文件：校验源格式并重算可选目标列表。
    ///
    /// 推进代次，使尚未完成的旧转换在交付前过期。
    pub fn register_source(&self, source: &SourceImage) -> Result<SourceSelection, ConvertError> {
        let resolution = self.converter.resolve_source(source)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        log::info!(
            "📁 已装载源文件 - {}（{}），可选目标 {} 个，代次 {}",
            source.file_name,
            resolution.source_tag,
            resolution.selectable.len(),
            generation
        );

        Ok(SourceSelection {
            source_tag: resolution.source_tag,
            selectable: resolution.selectable,
            generation,
        })
    }

    /// 清空当前选择。推进代次，在途转换的产物将被丢弃。
    pub fn clear_source(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 当前代次。
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 以当前代次执行转换。
    pub fn convert(&self, source: &SourceImage, target: &str) -> Result<OutputArtifact, ConvertError> {
        self.convert_at(self.current_generation(), source, target)
    }

    /// 以显式代次执行转换。
    ///
    /// 完成时若代次已被 `register_source` / `clear_source` 推进，
    /// 产物不交付，返回 `Superseded`。
    pub fn convert_at(
        &self,
        generation: u64,
        source: &SourceImage,
        target: &str,
    ) -> Result<OutputArtifact, ConvertError> {
        let artifact = self.converter.convert(source, target)?;

        let current = self.current_generation();
        if current != generation {
            log::warn!(
                "🗑️ 丢弃过期转换产物 - {}（请求代次 {}，当前代次 {}）",
                artifact.file_name,
                generation,
                current
            );
            return Err(ConvertError::Superseded(format!(
                "请求代次 {} 已被代次 {} 取代",
                generation, current
            )));
        }

        Ok(artifact)
    }

    /// 切换源校验模式（`strict` / `lenient`）。
    pub fn set_validation_mode(&self, mode: &str) -> Result<(), ConvertError> {
        let mode = ValidationMode::from_str(mode)?;
        self.converter.set_validation_mode(mode)
    }

    /// 读取当前生效校验模式（字符串）。
    pub fn get_validation_mode(&self) -> Result<String, ConvertError> {
        let mode = self.converter.validation_mode()?;
        Ok(mode.as_str().to_string())
    }

    /// 应用预算配置。
    pub fn set_limits(&self, limits: ConvertLimits) -> Result<(), ConvertError> {
        self.converter.set_limits(limits)
    }

    /// 导出当前预算快照。
    pub fn get_limits(&self) -> Result<ConvertLimits, ConvertError> {
        self.converter.limits()
    }
}
