//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”“流水线中间结果”和“最终产物”解耦：
//! - `SourceImage` 表示调用方传入的单个文件（字节 + 声明 MIME + 原始文件名）
//! - `DecodedSurface` 表示解码后的像素面，仅在单次请求内存活
//! - `OutputArtifact` 表示交付下载的产物，二进制与文本包装统一为字节
//!
//! `SourceImage` 由调用方按请求持有并传入，流水线内部不保存任何
//! 进程级“当前文件”状态。

use image::DynamicImage;

/// 调用方传入的源图片。加载后不可变，单槽所有权（同一时刻至多一个）。
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// 原始文件字节。
    pub bytes: Vec<u8>,
    /// 声明的 MIME 类型（来自拖拽或文件选择器）。
    pub mime_type: String,
    /// 原始文件名（用于派生输出文件名）。
    pub file_name: String,
}

/// 解码阶段输出：像素面与原生尺寸。
pub(crate) struct DecodedSurface {
    /// 解码后的位图。
    pub(crate) image: DynamicImage,
    /// 图像宽度（像素）。
    pub(crate) width: u32,
    /// 图像高度（像素）。
    pub(crate) height: u32,
}

/// 单次转换的产物，交付调用方触发下载后即释放。
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    /// 编码后的产物字节（SVG 包装同样以 UTF-8 字节交付）。
    pub bytes: Vec<u8>,
    /// 产物 MIME 类型。
    pub mime_type: String,
    /// 派生后的建议文件名（原始主干 + 新扩展名）。
    pub file_name: String,
}
