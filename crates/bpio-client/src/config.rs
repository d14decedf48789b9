//! 客户端配置

use std::time::Duration;

/// 客户端配置
///
/// 所有阻塞操作的上界都来自这里。
///
/// # Example
///
/// ```
/// use bpio_client::ClientConfig;
///
/// let config = ClientConfig {
///     transaction_timeout_ms: 500,
///     ..Default::default()
/// };
/// assert_eq!(config.transaction_timeout().as_millis(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// 同步事务（配置、数据、状态）等待应答的超时（毫秒）
    pub transaction_timeout_ms: u64,
    /// 打开时版本握手的超时（毫秒）
    pub handshake_timeout_ms: u64,
    /// 异步监视器单次轮询的超时（毫秒），包括等待链路锁的时间
    pub poll_timeout_ms: u64,
    /// 异步监视器两次轮询之间的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 停止异步监视器时等待线程退出的上限（毫秒）
    pub monitor_stop_timeout_ms: u64,
    /// 单次 transport 读取的缓冲区大小
    pub read_chunk_size: usize,
    /// 串口波特率
    pub baud_rate: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transaction_timeout_ms: 1_000,
            handshake_timeout_ms: 2_000,
            poll_timeout_ms: 100,
            poll_interval_ms: 10,
            monitor_stop_timeout_ms: 1_000,
            read_chunk_size: 512,
            baud_rate: bpio_transport::DEFAULT_BAUD_RATE,
        }
    }
}

impl ClientConfig {
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn monitor_stop_timeout(&self) -> Duration {
        Duration::from_millis(self.monitor_stop_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.transaction_timeout(), Duration::from_secs(1));
        assert_eq!(config.handshake_timeout(), Duration::from_secs(2));
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.read_chunk_size, 512);
        assert_eq!(config.baud_rate, 115_200);
    }

    #[test]
    fn test_monitor_stop_outlasts_one_poll_cycle() {
        let config = ClientConfig::default();
        assert!(config.monitor_stop_timeout() > config.poll_timeout() + config.poll_interval());
    }
}
