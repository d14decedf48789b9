//! 命令定义和实现
//!
//! 除 `config` 外，每个命令独立执行：读取配置、连接设备、执行操作、断开。

pub mod config;
pub mod i2c;
pub mod led;
pub mod spi;
pub mod status;
pub mod uart;

pub use config::ConfigCommand;
pub use i2c::I2cCommand;
pub use led::LedCommand;
pub use spi::SpiCommand;
pub use status::StatusCommand;
pub use uart::UartCommand;

use anyhow::{Context, Result};
use bpio_client::{Client, ClientBuilder};
use clap::Args;
use config::CliConfig;
use tracing::info;

/// 连接参数（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// 串口（如 /dev/ttyACM1, COM5）
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// 串口波特率
    #[arg(long, global = true)]
    pub baud: Option<u32>,
}

impl ConnectionArgs {
    /// 打开设备并完成版本握手
    pub fn connect(&self) -> Result<Client> {
        let config = CliConfig::load()?;
        let port = config.resolve_port(self.port.as_deref())?;

        let mut builder = ClientBuilder::new().port(&port).config(config.client);
        if let Some(baud) = self.baud {
            builder = builder.baud_rate(baud);
        }

        let client = builder.build().with_context(|| format!("连接 {} 失败", port))?;
        let (major, minor) = client.protocol_version();
        info!("Connected to {} (protocol {}.{})", port, major, minor);
        Ok(client)
    }
}
