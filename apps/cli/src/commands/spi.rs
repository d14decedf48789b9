//! SPI 命令

use super::ConnectionArgs;
use crate::utils;
use anyhow::Result;
use bpio_peripherals::Spi;
use bpio_protocol::SpiConfig;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum SpiCommand {
    /// 读取 SPI flash 的 JEDEC ID
    Jedec {
        /// 时钟频率（Hz）
        #[arg(short, long, default_value_t = 1_000_000)]
        speed: u32,
    },

    /// 片选包围的一次传输
    Transfer {
        /// 写入的十六进制数据
        data: String,

        /// 写入后读取的字节数
        #[arg(short, long, default_value_t = 0)]
        read: usize,

        #[arg(short, long, default_value_t = 1_000_000)]
        speed: u32,
    },
}

impl SpiCommand {
    fn speed(&self) -> u32 {
        match self {
            SpiCommand::Jedec { speed } | SpiCommand::Transfer { speed, .. } => *speed,
        }
    }

    pub fn execute(&self, conn: &ConnectionArgs) -> Result<()> {
        let client = conn.connect()?;
        let spi = Spi::new(&client);
        spi.configure(SpiConfig {
            speed: self.speed(),
            ..Default::default()
        })?;

        match self {
            SpiCommand::Jedec { .. } => {
                let id = spi.read_jedec_id()?;
                println!("JEDEC ID: {}", id);
                match id.capacity_bytes() {
                    Some(bytes) => println!("Capacity: {} KiB", bytes / 1024),
                    None => println!("Capacity: unknown"),
                }
            },
            SpiCommand::Transfer { data, read, .. } => {
                let write = utils::parse_hex_bytes(data)?;
                let reply = spi.transfer(&write, *read)?;
                println!("RX {}", utils::format_bytes(&reply));
            },
        }

        client.close();
        Ok(())
    }
}
