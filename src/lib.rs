//! # 单文件图片格式转换核心 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 宿主 UI（拖拽 / 文件选择 / 下载触发）      │
//! │                                                          │
//! │   SourceImage（字节 + 声明 MIME + 文件名，按请求传入）     │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Result<T, ConvertError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            转换核心 (Rust)                        │
//! │                                                          │
//! │  converter::service   会话入口：代次校验、模式切换        │
//! │  converter::handler   编排：解析 → 解码 → 编码            │
//! │  converter::resolver  MIME → 标签 / 可选目标 / 策略       │
//! │  converter::pipeline  签名与尺寸探测、解码、光栅化        │
//! │  converter::encode    重编码 / ICO / SVG 包装 / 文件名    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`converter`] | 完整转换链路：格式解析、解码、三种编码策略、会话交付 |
//!
//! 核心不变式：可选目标列表永远不含源文件自身的格式标签；
//! 单次请求内配置使用同一快照；过期代次的产物一律丢弃。

pub mod converter;

pub use converter::{
    ConvertConfig, ConvertError, ConvertFailure, ConvertLimits, ConverterService, OutputArtifact,
    SourceImage, SourceSelection, ValidationMode,
};
