//! 状态查询
//!
//! 状态请求携带一组查询标志；设备只填写被请求的字段。
//! [`StatusInfo`] 是校验后的结构化快照：要么完整解析，要么返回错误，
//! 不会出现“一半字段有效”的部分结果。

use crate::ProtocolError;
use crate::mode::Mode;
use serde::{Deserialize, Serialize};

/// 状态查询标志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusQuery {
    All,
    Version,
    Mode,
    Pullup,
    Psu,
    Adc,
    Io,
    Disk,
    Led,
}

impl StatusQuery {
    /// 规范化选择器：空集合表示查询全部字段
    pub fn normalize(selector: &[StatusQuery]) -> Vec<StatusQuery> {
        if selector.is_empty() || selector.contains(&StatusQuery::All) {
            return vec![StatusQuery::All];
        }
        let mut query = Vec::with_capacity(selector.len());
        for q in selector {
            if !query.contains(q) {
                query.push(*q);
            }
        }
        query
    }
}

/// 状态响应（线上格式）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub error: Option<String>,

    pub version_flatbuffers_major: Option<u8>,
    pub version_flatbuffers_minor: Option<u16>,
    pub version_hardware_major: Option<u8>,
    pub version_hardware_minor: Option<u8>,
    pub version_firmware_major: Option<u8>,
    pub version_firmware_minor: Option<u8>,
    pub version_firmware_git_hash: Option<String>,
    pub version_firmware_date: Option<String>,

    pub modes_available: Option<Vec<String>>,
    pub mode_current: Option<String>,
    pub mode_pin_labels: Option<Vec<String>>,
    pub mode_bitorder_msb: Option<bool>,
    pub mode_max_packet_size: Option<u32>,
    pub mode_max_write: Option<u32>,
    pub mode_max_read: Option<u32>,

    pub psu_enabled: Option<bool>,
    pub psu_set_mv: Option<u32>,
    pub psu_set_ma: Option<u32>,
    pub psu_measured_mv: Option<u32>,
    pub psu_measured_ma: Option<u32>,
    pub psu_current_error: Option<bool>,

    pub pullup_enabled: Option<bool>,

    pub adc_mv: Option<Vec<u32>>,

    pub io_direction: Option<u8>,
    pub io_value: Option<u8>,

    pub disk_size_mb: Option<f32>,
    pub disk_used_mb: Option<f32>,

    pub led_count: Option<u32>,
}

/// 版本信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// 协议（schema）版本
    pub protocol_major: u8,
    pub protocol_minor: u16,
    pub hardware: Option<(u8, u8)>,
    pub firmware: Option<(u8, u8)>,
    pub firmware_git_hash: Option<String>,
    pub firmware_date: Option<String>,
}

/// 当前模式信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeInfo {
    /// 设备报告的当前模式名（原样保留）
    pub current: String,
    /// 解析后的模式（设备支持但本库未建模的模式为 `None`）
    pub mode: Option<Mode>,
    pub available: Vec<String>,
    pub pin_labels: Vec<String>,
    pub bitorder_msb: Option<bool>,
    pub max_packet_size: Option<u32>,
    pub max_write: Option<u32>,
    pub max_read: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsuInfo {
    pub enabled: bool,
    pub set_mv: Option<u32>,
    pub set_ma: Option<u32>,
    pub measured_mv: Option<u32>,
    pub measured_ma: Option<u32>,
    pub current_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoInfo {
    /// 方向位掩码（1 = 输出）
    pub direction: u8,
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskInfo {
    pub size_mb: f32,
    pub used_mb: f32,
}

/// 结构化状态快照
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusInfo {
    pub version: Option<VersionInfo>,
    pub mode: Option<ModeInfo>,
    pub psu: Option<PsuInfo>,
    pub pullup_enabled: Option<bool>,
    pub adc_mv: Option<Vec<u32>>,
    pub io: Option<IoInfo>,
    pub disk: Option<DiskInfo>,
    pub led_count: Option<u32>,
}

impl StatusInfo {
    /// 协议版本（若已查询）
    pub fn protocol_version(&self) -> Option<(u8, u16)> {
        self.version
            .as_ref()
            .map(|v| (v.protocol_major, v.protocol_minor))
    }

    /// 当前模式允许的最大写入字节数（若设备报告）
    pub fn max_write(&self) -> Option<u32> {
        self.mode.as_ref().and_then(|m| m.max_write)
    }

    pub fn max_read(&self) -> Option<u32> {
        self.mode.as_ref().and_then(|m| m.max_read)
    }
}

impl TryFrom<StatusResponse> for StatusInfo {
    type Error = ProtocolError;

    fn try_from(r: StatusResponse) -> Result<Self, Self::Error> {
        if let Some(error) = r.error {
            return Err(ProtocolError::Device(error));
        }

        // 版本组：协议主次版本必须同时出现
        let version = match (r.version_flatbuffers_major, r.version_flatbuffers_minor) {
            (Some(protocol_major), Some(protocol_minor)) => Some(VersionInfo {
                protocol_major,
                protocol_minor,
                hardware: r.version_hardware_major.zip(r.version_hardware_minor),
                firmware: r.version_firmware_major.zip(r.version_firmware_minor),
                firmware_git_hash: r.version_firmware_git_hash,
                firmware_date: r.version_firmware_date,
            }),
            (None, None) => {
                if r.version_firmware_major.is_some() || r.version_hardware_major.is_some() {
                    return Err(ProtocolError::MalformedStatus(
                        "firmware/hardware version without protocol version".to_string(),
                    ));
                }
                None
            },
            _ => {
                return Err(ProtocolError::MalformedStatus(
                    "protocol version major/minor must be reported together".to_string(),
                ));
            },
        };

        let mode = match r.mode_current {
            Some(current) => Some(ModeInfo {
                mode: Mode::from_wire_name(&current),
                current,
                available: r.modes_available.unwrap_or_default(),
                pin_labels: r.mode_pin_labels.unwrap_or_default(),
                bitorder_msb: r.mode_bitorder_msb,
                max_packet_size: r.mode_max_packet_size,
                max_write: r.mode_max_write,
                max_read: r.mode_max_read,
            }),
            None if r.mode_max_write.is_some() || r.mode_max_read.is_some() => {
                return Err(ProtocolError::MalformedStatus(
                    "mode limits reported without current mode".to_string(),
                ));
            },
            None => None,
        };

        let psu = match r.psu_enabled {
            Some(enabled) => Some(PsuInfo {
                enabled,
                set_mv: r.psu_set_mv,
                set_ma: r.psu_set_ma,
                measured_mv: r.psu_measured_mv,
                measured_ma: r.psu_measured_ma,
                current_error: r.psu_current_error.unwrap_or(false),
            }),
            None => None,
        };

        let io = match (r.io_direction, r.io_value) {
            (Some(direction), Some(value)) => Some(IoInfo { direction, value }),
            (None, None) => None,
            _ => {
                return Err(ProtocolError::MalformedStatus(
                    "io direction/value must be reported together".to_string(),
                ));
            },
        };

        let disk = match (r.disk_size_mb, r.disk_used_mb) {
            (Some(size_mb), Some(used_mb)) => {
                if used_mb > size_mb {
                    return Err(ProtocolError::MalformedStatus(format!(
                        "disk used {used_mb} MB exceeds size {size_mb} MB"
                    )));
                }
                Some(DiskInfo { size_mb, used_mb })
            },
            (None, None) => None,
            _ => {
                return Err(ProtocolError::MalformedStatus(
                    "disk size/used must be reported together".to_string(),
                ));
            },
        };

        Ok(StatusInfo {
            version,
            mode,
            psu,
            pullup_enabled: r.pullup_enabled,
            adc_mv: r.adc_mv,
            io,
            disk,
            led_count: r.led_count,
        })
    }
}
