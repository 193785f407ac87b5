//! # 图片格式转换模块（converter）
//!
//! ## 设计思路
//!
//! 该模块将“源格式解析 → 解码校验 → 策略编码 → 产物组装 → 会话交付”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：调用方会话入口（代次校验、模式切换）
//! - `handler`：编排整条转换流水线
//! - `resolver`：MIME → 格式标签、可选目标列表、策略选择
//! - `pipeline`：负责解码、资源限制、SVG 光栅化、定尺寸拉伸
//! - `encode`：负责三种策略的编码与文件名派生
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 实现思路
//!
//! 对外仅暴露必要类型与服务入口，内部细节保持 `mod` 私有。
//! 调用链：
//!
//! ```text
//! UI 调用方
//!    ↓
//! service.rs（代次管理、模式切换、结构化失败信息）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ resolver.rs（源校验 + 标签 + 策略）
//!    ├─ pipeline.rs（签名/尺寸探测 + 解码 + 光栅化）
//!    └─ encode.rs（重编码 / ICO 画布 / SVG 包装 + 文件名）
//!    ↓
//! OutputArtifact 交付下载（或 ConvertError 终止本次请求）
//! ```

mod config;
mod encode;
mod error;
mod handler;
mod pipeline;
mod resolver;
mod service;
mod source;

pub use config::{ConvertConfig, ConvertLimits, ValidationMode};
pub use error::ConvertError;
pub use resolver::{Resolution, Strategy, TARGET_FORMATS, resolve};
pub use service::{ConvertFailure, ConverterService, SourceSelection};
pub use source::{OutputArtifact, SourceImage};

/// 内部核心编排器，调用方统一走 `ConverterService`。
pub(crate) use handler::ImageConverter;
