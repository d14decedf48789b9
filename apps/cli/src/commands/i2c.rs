//! I2C 命令

use super::ConnectionArgs;
use crate::utils;
use anyhow::Result;
use bpio_peripherals::I2c;
use bpio_protocol::{DeviceSettings, I2cConfig};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum I2cCommand {
    /// 扫描总线上应答的地址
    Scan {
        /// 同时开启上拉电阻
        #[arg(long)]
        pullups: bool,
    },

    /// 从设备读取（可先写入寄存器地址）
    Read {
        /// 7 位地址（如 0x50）
        #[arg(value_parser = utils::parse_address)]
        address: u8,

        /// 读取字节数
        #[arg(short, long, default_value_t = 1)]
        len: usize,

        /// 读取前写入的十六进制数据（如寄存器地址 "10"）
        #[arg(short, long)]
        write: Option<String>,

        #[arg(long)]
        pullups: bool,
    },
}

impl I2cCommand {
    fn settings(&self) -> DeviceSettings {
        let pullups = match self {
            I2cCommand::Scan { pullups } | I2cCommand::Read { pullups, .. } => *pullups,
        };
        DeviceSettings {
            pullups: pullups.then_some(true),
            ..Default::default()
        }
    }

    pub fn execute(&self, conn: &ConnectionArgs) -> Result<()> {
        let client = conn.connect()?;
        let i2c = I2c::new(&client);
        i2c.configure_with(I2cConfig::default(), self.settings())?;

        match self {
            I2cCommand::Scan { .. } => {
                let found = i2c.scan()?;
                if found.is_empty() {
                    println!("(没有设备应答)");
                }
                for address in found {
                    println!("0x{:02X}", address);
                }
            },
            I2cCommand::Read {
                address,
                len,
                write,
                ..
            } => {
                let prefix = match write {
                    Some(hex) => utils::parse_hex_bytes(hex)?,
                    None => Vec::new(),
                };
                let data = i2c.write_read(*address, &prefix, *len)?;
                println!("0x{:02X}: {}", address, utils::format_bytes(&data));
            },
        }

        client.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pullups_only_set_when_requested() {
        assert_eq!(I2cCommand::Scan { pullups: false }.settings().pullups, None);
        assert_eq!(I2cCommand::Scan { pullups: true }.settings().pullups, Some(true));
    }
}
