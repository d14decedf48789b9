//! # BPIO CLI
//!
//! BPIO2 设备命令行工具。每个命令独立执行：连接 -> 配置模式 -> 操作 -> 断开。
//!
//! ```bash
//! # 配置默认串口
//! bpio-cli config set --port /dev/ttyACM1
//!
//! # 查询状态
//! bpio-cli status --query version,mode
//!
//! # UART 发送并监视（Ctrl-C 结束）
//! bpio-cli uart --speed 9600 --send "AT\r" --monitor
//!
//! # SPI flash JEDEC ID
//! bpio-cli spi jedec
//!
//! # I2C EEPROM 读取 16 字节
//! bpio-cli i2c read 0x50 --write 00 --len 16
//!
//! # 板载 LED
//! bpio-cli led FF0000 00FF00
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod utils;

use commands::{
    ConfigCommand, ConnectionArgs, I2cCommand, LedCommand, SpiCommand, StatusCommand, UartCommand,
};

/// BPIO CLI - BPIO2 设备命令行工具
#[derive(Parser, Debug)]
#[command(name = "bpio-cli")]
#[command(about = "Command-line interface for BPIO2 devices", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 查询设备状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// UART 发送与监视
    Uart {
        #[command(flatten)]
        args: UartCommand,
    },

    /// SPI 操作
    #[command(subcommand)]
    Spi(SpiCommand),

    /// I2C 操作
    #[command(subcommand)]
    I2c(I2cCommand),

    /// 设置 LED 颜色
    Led {
        #[command(flatten)]
        args: LedCommand,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("bpio_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let conn = &cli.connection;

    match cli.command {
        Commands::Config(cmd) => cmd.execute(conn),
        Commands::Status { args } => args.execute(conn),
        Commands::Uart { args } => args.execute(conn),
        Commands::Spi(cmd) => cmd.execute(conn),
        Commands::I2c(cmd) => cmd.execute(conn),
        Commands::Led { args } => args.execute(conn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_port_after_subcommand() {
        let cli = Cli::parse_from(["bpio-cli", "spi", "jedec", "--port", "/dev/ttyACM1"]);
        assert_eq!(cli.connection.port.as_deref(), Some("/dev/ttyACM1"));
        assert!(matches!(cli.command, Commands::Spi(SpiCommand::Jedec { .. })));
    }

    #[test]
    fn test_config_set_uses_global_port() {
        let cli = Cli::parse_from(["bpio-cli", "config", "set", "--port", "COM5"]);
        assert_eq!(cli.connection.port.as_deref(), Some("COM5"));
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Set { .. })));
    }

    #[test]
    fn test_i2c_read_parses_address() {
        let cli = Cli::parse_from(["bpio-cli", "i2c", "read", "0x50", "--len", "4"]);
        match cli.command {
            Commands::I2c(I2cCommand::Read { address, len, .. }) => {
                assert_eq!(address, 0x50);
                assert_eq!(len, 4);
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
