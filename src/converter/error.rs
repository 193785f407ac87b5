//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载转换链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 每个分支额外提供稳定的机器码（`code`）与所属阶段（`stage`），
//! 供 UI 调用方做结构化的用户提示。

/// 图片转换统一错误类型。
///
/// 所有错误对单次请求都是终止性的：不重试、不产生部分结果、无回退格式。
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// 源文件声明的 MIME 类型未通过当前校验模式。
    #[error("不支持的源格式：{0}")]
    UnsupportedSource(String),

    /// 请求本身不成立（目标关键字缺失、未知，或与源格式相同）。
    #[error("无效的转换请求：{0}")]
    InvalidRequest(String),

    /// 字节无法解析为声明类型的图片。
    #[error("解码错误：{0}")]
    Decode(String),

    /// 目标编码在当前宿主上无法产出。
    #[error("编码错误：{0}")]
    Encode(String),

    /// 输入体积或解码预算超出配置上限。
    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// 结果完成时已不是当前代次，产物被丢弃。
    #[error("请求已过期：{0}")]
    Superseded(String),
}

impl ConvertError {
    /// 稳定错误码，供调用方做分支展示与埋点。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedSource(_) => "E_UNSUPPORTED_SOURCE",
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::Decode(_) => "E_DECODE",
            Self::Encode(_) => "E_ENCODE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::Superseded(_) => "E_SUPERSEDED",
        }
    }

    /// 错误发生的流水线阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedSource(_) | Self::InvalidRequest(_) => "resolve",
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Encode(_) => "encode",
            Self::Superseded(_) => "deliver",
        }
    }
}

impl From<ConvertError> for String {
    /// 兼容部分仍使用字符串错误的调用点。
    fn from(error: ConvertError) -> Self {
        error.to_string()
    }
}
