//! # BPIO Protocol
//!
//! BPIO2 请求/响应协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `messages`: 线上报文结构（请求包、响应包及其内容）
//! - `mode`: 强类型模式配置（UART/SPI/I2C/LED）与设备设置
//! - `status`: 状态查询选择器与结构化状态快照
//! - `codec`: 帧编解码（postcard 报文体 + COBS 定界；真实设备需要自行提供 FlatBuffers 编解码器）
//!
//! ## 帧格式
//!
//! 每个报文先序列化为字节串，再经 COBS 编码，并以 `0x00` 哨兵字节结尾。
//! 因此报文体内部永远不会出现 `0x00`，接收端只需按 `0x00` 切分字节流。

pub mod codec;
pub mod messages;
pub mod mode;
pub mod status;

pub use codec::{FrameAccumulator, FrameCodec, PacketCodec};
pub use messages::*;
pub use mode::*;
pub use status::*;

use thiserror::Error;

/// 协议主版本号（不兼容变更时递增）
pub const PROTOCOL_VERSION_MAJOR: u8 = 2;

/// 协议次版本号
pub const PROTOCOL_VERSION_MINOR: u16 = 0;

/// 帧定界符（COBS 哨兵字节）
pub const FRAME_DELIMITER: u8 = 0x00;

/// 单帧最大长度（编码后，不含定界符）
///
/// 超过此长度仍未遇到定界符的数据视为噪声，接收端会丢弃。
pub const MAX_FRAME_LEN: usize = 4096;

/// 协议层错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// 报文序列化/反序列化失败
    #[error("Serialization error: {0}")]
    Serialization(#[from] postcard::Error),

    /// COBS 解码失败（帧内容损坏）
    #[error("COBS decode failed for {len}-byte frame")]
    Cobs { len: usize },

    #[error("Empty frame")]
    EmptyFrame,

    #[error("Frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    /// 收到的响应类型与请求不匹配
    #[error("Unexpected response: expected {expected}, got {actual:?}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: ResponseKind,
    },

    /// 设备返回的错误信息（ErrorResponse 或响应中的 error 字段）
    #[error("Device reported error: {0}")]
    Device(String),

    /// 在超时时间内未收到对应响应
    #[error("No response within {0:?}")]
    ResponseTimeout(std::time::Duration),

    /// 状态响应字段不完整或互相矛盾
    #[error("Malformed status response: {0}")]
    MalformedStatus(String),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Unsupported protocol version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u16 },
}

impl ProtocolError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
        }
    }
}
