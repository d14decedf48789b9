//! 模式状态
//!
//! 通过 `ArcSwap` 发布，读取无锁；只在持有配置锁时写入。

use bpio_protocol::{Mode, ModeConfig, StatusInfo};

/// 当前激活的模式及其最后一次成功应用的配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeState {
    pub config: ModeConfig,
}

impl ModeState {
    pub fn new(config: ModeConfig) -> Self {
        Self { config }
    }

    pub fn mode(&self) -> Mode {
        self.config.mode()
    }

    pub fn is_configured(&self) -> bool {
        !self.mode().is_none()
    }
}

/// 设备报告的单次事务负载上限
///
/// `None` 表示设备未报告，不做限制。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PayloadLimits {
    pub max_write: Option<usize>,
    pub max_read: Option<usize>,
}

impl PayloadLimits {
    /// 从状态快照中提取限制（仅当快照中的模式与 `mode` 一致时）
    pub fn from_status(info: &StatusInfo, mode: Mode) -> Option<Self> {
        let mode_info = info.mode.as_ref()?;
        if mode_info.mode != Some(mode) {
            return None;
        }
        Some(Self {
            max_write: mode_info.max_write.map(|v| v as usize),
            max_read: mode_info.max_read.map(|v| v as usize),
        })
    }

    pub fn check(&self, write_len: usize, read_len: usize) -> Result<(), String> {
        if let Some(max) = self.max_write
            && write_len > max
        {
            return Err(format!("write of {write_len} bytes exceeds device limit {max}"));
        }
        if let Some(max) = self.max_read
            && read_len > max
        {
            return Err(format!("read of {read_len} bytes exceeds device limit {max}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpio_protocol::{ModeInfo, UartConfig};

    fn status_with_mode(current: &str, max_write: Option<u32>) -> StatusInfo {
        StatusInfo {
            mode: Some(ModeInfo {
                current: current.to_string(),
                mode: Mode::from_wire_name(current),
                available: Vec::new(),
                pin_labels: Vec::new(),
                bitorder_msb: None,
                max_packet_size: None,
                max_write,
                max_read: Some(64),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_mode_state_default_is_unconfigured() {
        let state = ModeState::default();
        assert_eq!(state.mode(), Mode::None);
        assert!(!state.is_configured());

        let state = ModeState::new(ModeConfig::Uart(UartConfig::default()));
        assert_eq!(state.mode(), Mode::Uart);
        assert!(state.is_configured());
    }

    #[test]
    fn test_limits_from_matching_status() {
        let info = status_with_mode("UART", Some(128));
        let limits = PayloadLimits::from_status(&info, Mode::Uart).unwrap();
        assert_eq!(limits.max_write, Some(128));
        assert_eq!(limits.max_read, Some(64));

        assert!(PayloadLimits::from_status(&info, Mode::Spi).is_none());
        assert!(PayloadLimits::from_status(&StatusInfo::default(), Mode::Uart).is_none());
    }

    #[test]
    fn test_limits_check() {
        let limits = PayloadLimits {
            max_write: Some(4),
            max_read: None,
        };
        assert!(limits.check(4, 10_000).is_ok());
        assert!(limits.check(5, 0).is_err());
        assert!(PayloadLimits::default().check(usize::MAX, usize::MAX).is_ok());
    }
}
