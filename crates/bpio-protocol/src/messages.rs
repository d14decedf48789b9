//! 线上报文结构
//!
//! 请求包与响应包都带有一个 contents 联合体，与设备端 schema 的
//! `RequestPacketContents` / `ResponsePacketContents` 一一对应。
//! 字段全部为可选（`Option`），未设置的字段由设备保持原值或使用默认值。

use crate::status::{StatusQuery, StatusResponse};
use crate::{PROTOCOL_VERSION_MAJOR, PROTOCOL_VERSION_MINOR};
use serde::{Deserialize, Serialize};

// ============================================================================
// 请求
// ============================================================================

/// 请求包（所有请求的外层封装）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPacket {
    pub version_major: u8,
    pub version_minor: u16,
    pub contents: RequestContents,
}

impl RequestPacket {
    /// 使用当前协议版本封装请求内容
    pub fn new(contents: RequestContents) -> Self {
        Self {
            version_major: PROTOCOL_VERSION_MAJOR,
            version_minor: PROTOCOL_VERSION_MINOR,
            contents,
        }
    }

    pub fn status(query: Vec<StatusQuery>) -> Self {
        Self::new(RequestContents::Status(StatusRequest { query }))
    }

    pub fn configuration(request: ConfigurationRequest) -> Self {
        Self::new(RequestContents::Configuration(request))
    }

    pub fn data(request: DataRequest) -> Self {
        Self::new(RequestContents::Data(request))
    }
}

/// 请求内容联合体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestContents {
    Status(StatusRequest),
    Configuration(ConfigurationRequest),
    Data(DataRequest),
}

/// 状态查询请求
///
/// `query` 为空时等价于 `[StatusQuery::All]`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub query: Vec<StatusQuery>,
}

/// 配置请求
///
/// `mode` 为设备端模式名（如 `"UART"`），`mode_configuration` 携带该模式的参数。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRequest {
    pub mode: Option<String>,
    pub mode_configuration: Option<ModeConfiguration>,
    pub psu_disable: Option<bool>,
    pub psu_enable: Option<bool>,
    /// PSU 输出电压（毫伏）
    pub psu_set_mv: Option<u32>,
    /// PSU 限流（毫安，0 表示不限流）
    pub psu_set_ma: Option<u16>,
    pub pullup_disable: Option<bool>,
    pub pullup_enable: Option<bool>,
    /// 恢复板载 LED 的系统控制
    pub led_resume: Option<bool>,
}

/// 模式参数（线上格式）
///
/// 所有模式共用一个结构体，每种模式只填写自己关心的字段。
/// 强类型的入口是 [`ModeConfig`](crate::mode::ModeConfig)，
/// 不建议直接构造此结构体。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeConfiguration {
    pub speed: Option<u32>,
    pub data_bits: Option<u8>,
    pub parity: Option<bool>,
    pub stop_bits: Option<u8>,
    pub flow_control: Option<bool>,
    pub signal_inversion: Option<bool>,
    pub clock_stretch: Option<bool>,
    pub clock_polarity: Option<bool>,
    pub clock_phase: Option<bool>,
    pub chip_select_idle: Option<bool>,
    pub submode: Option<u8>,
}

/// 数据请求（一次同步事务）
///
/// - `start_main`/`stop_main`: 主起始/停止条件（I2C START/STOP、SPI 片选、LED 复位帧）
/// - `start_alt`/`stop_alt`: 备用起始/停止条件（模式相关）
/// - `data_write`: 写入的字节
/// - `bytes_read`: 写入之后读取的字节数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRequest {
    pub start_main: bool,
    pub start_alt: bool,
    pub data_write: Vec<u8>,
    pub bytes_read: u16,
    pub stop_main: bool,
    pub stop_alt: bool,
}

impl DataRequest {
    /// 是否为空操作（无写入、无读取、无起止条件）
    pub fn is_noop(&self) -> bool {
        self.data_write.is_empty()
            && self.bytes_read == 0
            && !self.start_main
            && !self.start_alt
            && !self.stop_main
            && !self.stop_alt
    }
}

// ============================================================================
// 响应
// ============================================================================

/// 响应包
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePacket {
    pub contents: ResponseContents,
}

impl ResponsePacket {
    pub fn new(contents: ResponseContents) -> Self {
        Self { contents }
    }

    /// 响应分类
    ///
    /// 带 `is_async` 标记的数据响应是设备主动上报的异步数据，
    /// 不对应任何请求。
    pub fn kind(&self) -> ResponseKind {
        match &self.contents {
            ResponseContents::Error(_) => ResponseKind::Error,
            ResponseContents::Status(_) => ResponseKind::Status,
            ResponseContents::Configuration(_) => ResponseKind::ConfigAck,
            ResponseContents::Data(data) if data.is_async => ResponseKind::AsyncData,
            ResponseContents::Data(_) => ResponseKind::DataReply,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ResponseContents::Error(ErrorResponse {
            error: message.into(),
        }))
    }

    pub fn config_ack(error: Option<String>) -> Self {
        Self::new(ResponseContents::Configuration(ConfigurationResponse { error }))
    }

    pub fn data_reply(data_read: Vec<u8>) -> Self {
        Self::new(ResponseContents::Data(DataResponse {
            error: None,
            data_read,
            is_async: false,
        }))
    }

    pub fn async_data(data_read: Vec<u8>) -> Self {
        Self::new(ResponseContents::Data(DataResponse {
            error: None,
            data_read,
            is_async: true,
        }))
    }

    pub fn status(status: StatusResponse) -> Self {
        Self::new(ResponseContents::Status(Box::new(status)))
    }
}

/// 响应内容联合体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseContents {
    Error(ErrorResponse),
    Status(Box<StatusResponse>),
    Configuration(ConfigurationResponse),
    Data(DataResponse),
}

/// 响应类别（由 [`ResponsePacket::kind`] 给出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Status,
    ConfigAck,
    DataReply,
    AsyncData,
    Error,
}

impl ResponseKind {
    /// 是否为主动上报（非同步应答）
    pub fn is_async(self) -> bool {
        self == Self::AsyncData
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationResponse {
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse {
    pub error: Option<String>,
    pub data_read: Vec<u8>,
    pub is_async: bool,
}
