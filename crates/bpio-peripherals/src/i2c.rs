//! I2C 适配器
//!
//! 地址以 7 位形式传入，写入 `data_write` 的第一个字节是 8 位写地址；
//! 需要读取时由设备自行设置读位并发出重复起始。

use crate::{PeripheralError, Result, require_mode};
use bpio_client::{Client, ClientError, TransactionRequest};
use bpio_protocol::{DeviceSettings, I2cConfig, Mode, ModeConfig, ProtocolError};
use std::ops::RangeInclusive;
use tracing::{debug, trace};

/// 常规扫描范围（排除保留地址）
pub const SCAN_RANGE: RangeInclusive<u8> = 0x08..=0x77;

pub struct I2c<'a> {
    client: &'a Client,
}

impl<'a> I2c<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn configure(&self, config: I2cConfig) -> Result<()> {
        self.configure_with(config, DeviceSettings::default())
    }

    pub fn configure_with(&self, config: I2cConfig, settings: DeviceSettings) -> Result<()> {
        self.client.configure_with(ModeConfig::I2c(config), settings)?;
        Ok(())
    }

    pub fn write(&self, address: u8, data: &[u8]) -> Result<()> {
        self.write_read(address, data, 0).map(|_| ())
    }

    pub fn read(&self, address: u8, len: usize) -> Result<Vec<u8>> {
        self.write_read(address, &[], len)
    }

    /// START, 写地址+数据, 重复 START, 读 `read_len` 字节, STOP
    pub fn write_read(&self, address: u8, data: &[u8], read_len: usize) -> Result<Vec<u8>> {
        require_mode(self.client, Mode::I2c)?;
        let request = TransactionRequest::new(frame(address, data)?, read_len).bracketed();
        Ok(self.client.transact_request(request)?.data)
    }

    /// 探测 [`SCAN_RANGE`] 内应答的设备地址
    pub fn scan(&self) -> Result<Vec<u8>> {
        self.scan_range(SCAN_RANGE)
    }

    /// 设备对未应答的地址返回错误；其他错误照常传播
    pub fn scan_range(&self, range: RangeInclusive<u8>) -> Result<Vec<u8>> {
        require_mode(self.client, Mode::I2c)?;
        let mut found = Vec::new();
        for address in range {
            let request = TransactionRequest::new(frame(address, &[])?, 0).bracketed();
            match self.client.transact_request(request) {
                Ok(_) => {
                    debug!("I2C device at 0x{:02X}", address);
                    found.push(address);
                },
                Err(ClientError::Protocol(ProtocolError::Device(reason))) => {
                    trace!("No ACK at 0x{:02X}: {}", address, reason);
                },
                Err(e) => return Err(e.into()),
            }
        }
        Ok(found)
    }
}

fn frame(address: u8, data: &[u8]) -> Result<Vec<u8>> {
    if address > 0x7F {
        return Err(PeripheralError::InvalidArgument(format!(
            "I2C address 0x{address:02X} is not a 7-bit address"
        )));
    }
    let mut bytes = Vec::with_capacity(data.len() + 1);
    bytes.push(address << 1);
    bytes.extend_from_slice(data);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_prefixes_write_address() {
        assert_eq!(frame(0x50, &[0x10]).unwrap(), vec![0xA0, 0x10]);
        assert_eq!(frame(0x08, &[]).unwrap(), vec![0x10]);
    }

    #[test]
    fn test_frame_rejects_eight_bit_address() {
        assert!(matches!(
            frame(0xA0, &[]),
            Err(PeripheralError::InvalidArgument(_))
        ));
    }
}
