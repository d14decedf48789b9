//! UART 适配器

use crate::{PeripheralError, Result, require_mode};
use bpio_client::{AsyncSink, Client};
use bpio_protocol::{DeviceSettings, Mode, ModeConfig, UartConfig};
use tracing::debug;

/// UART 适配器
///
/// 设备在 UART 模式下会主动上报收到的数据；未启动监视时这些数据
/// 在客户端的异步队列中累积，通过 [`take_async_data`](Self::take_async_data) 取出。
pub struct Uart<'a> {
    client: &'a Client,
}

impl<'a> Uart<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn configure(&self, config: UartConfig) -> Result<()> {
        self.configure_with(config, DeviceSettings::default())
    }

    pub fn configure_with(&self, config: UartConfig, settings: DeviceSettings) -> Result<()> {
        self.client
            .configure_with(ModeConfig::Uart(config), settings)?;
        debug!("UART configured: {} baud", config.speed);
        Ok(())
    }

    /// 当前 UART 参数
    pub fn config(&self) -> Result<UartConfig> {
        match require_mode(self.client, Mode::Uart)? {
            ModeConfig::Uart(config) => Ok(config),
            other => Err(PeripheralError::WrongMode {
                expected: Mode::Uart,
                actual: other.mode(),
            }),
        }
    }

    pub fn write(&self, data: &[u8]) -> Result<()> {
        require_mode(self.client, Mode::Uart)?;
        self.client.transact(data, 0)?;
        Ok(())
    }

    /// 读取设备接收缓冲区中的数据（可能少于 `len`）
    pub fn read(&self, len: usize) -> Result<Vec<u8>> {
        require_mode(self.client, Mode::Uart)?;
        Ok(self.client.transact(&[], len)?.data)
    }

    /// 写后读
    pub fn transfer(&self, data: &[u8], read_len: usize) -> Result<Vec<u8>> {
        require_mode(self.client, Mode::Uart)?;
        Ok(self.client.transact(data, read_len)?.data)
    }

    /// 在后台接收异步数据，放入客户端队列
    pub fn start_async_monitoring(&self) -> Result<()> {
        require_mode(self.client, Mode::Uart)?;
        self.client.start_async_monitor(AsyncSink::Queue)?;
        Ok(())
    }

    /// 在后台接收异步数据，并对每一块调用 `callback`
    pub fn start_async_monitoring_with<F>(&self, callback: F) -> Result<()>
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        require_mode(self.client, Mode::Uart)?;
        self.client
            .start_async_monitor(AsyncSink::callback(move |frame| callback(&frame.data)))?;
        Ok(())
    }

    pub fn stop_async_monitoring(&self) -> Result<()> {
        self.client.stop_async_monitor()?;
        Ok(())
    }

    /// 取出累积的异步数据（按到达顺序，每块对应一帧）
    pub fn take_async_data(&self) -> Vec<Vec<u8>> {
        self.client
            .drain_async_queue()
            .into_iter()
            .map(|frame| frame.data)
            .collect()
    }
}
