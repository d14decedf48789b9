//! SPI 适配器
//!
//! 每次传输都由主起止条件包围，设备据此拉低/释放片选。

use crate::{PeripheralError, Result, require_mode};
use bpio_client::{Client, TransactionRequest};
use bpio_protocol::{DeviceSettings, Mode, ModeConfig, SpiConfig};
use std::fmt;

/// JEDEC "Read Identification" 命令
pub const CMD_READ_JEDEC_ID: u8 = 0x9F;

/// SPI Flash 的 JEDEC ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JedecId {
    pub manufacturer: u8,
    pub memory_type: u8,
    pub capacity: u8,
}

impl JedecId {
    /// 容量编码为 2 的幂时的字节数（常见 SPI NOR）
    pub fn capacity_bytes(&self) -> Option<u64> {
        (self.capacity < 64).then(|| 1u64 << self.capacity)
    }
}

impl fmt::Display for JedecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X} {:02X} {:02X}",
            self.manufacturer, self.memory_type, self.capacity
        )
    }
}

pub struct Spi<'a> {
    client: &'a Client,
}

impl<'a> Spi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn configure(&self, config: SpiConfig) -> Result<()> {
        self.configure_with(config, DeviceSettings::default())
    }

    pub fn configure_with(&self, config: SpiConfig, settings: DeviceSettings) -> Result<()> {
        self.client.configure_with(ModeConfig::Spi(config), settings)?;
        Ok(())
    }

    /// 片选有效期间先写后读
    pub fn transfer(&self, write: &[u8], read_len: usize) -> Result<Vec<u8>> {
        require_mode(self.client, Mode::Spi)?;
        let request = TransactionRequest::new(write, read_len).bracketed();
        Ok(self.client.transact_request(request)?.data)
    }

    pub fn write(&self, data: &[u8]) -> Result<()> {
        self.transfer(data, 0).map(|_| ())
    }

    pub fn read(&self, len: usize) -> Result<Vec<u8>> {
        self.transfer(&[], len)
    }

    pub fn read_jedec_id(&self) -> Result<JedecId> {
        let data = self.transfer(&[CMD_READ_JEDEC_ID], 3)?;
        match data[..] {
            [manufacturer, memory_type, capacity, ..] => Ok(JedecId {
                manufacturer,
                memory_type,
                capacity,
            }),
            _ => Err(PeripheralError::ShortRead {
                expected: 3,
                actual: data.len(),
            }),
        }
    }
}
