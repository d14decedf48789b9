//! UART 发送与监视

use super::ConnectionArgs;
use crate::utils;
use anyhow::{Result, bail};
use bpio_peripherals::Uart;
use bpio_protocol::UartConfig;
use clap::Args;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

/// UART 命令参数
#[derive(Args, Debug)]
pub struct UartCommand {
    /// 波特率
    #[arg(short, long, default_value_t = 115_200)]
    pub speed: u32,

    /// 数据位（5-8）
    #[arg(long, default_value_t = 8)]
    pub data_bits: u8,

    /// 停止位（1 或 2）
    #[arg(long, default_value_t = 1)]
    pub stop_bits: u8,

    /// 偶校验
    #[arg(long)]
    pub parity: bool,

    /// 发送的文本
    #[arg(long, conflicts_with = "send_hex")]
    pub send: Option<String>,

    /// 发送的十六进制数据（如 "48 69 0d"）
    #[arg(long)]
    pub send_hex: Option<String>,

    /// 持续打印接收到的数据，Ctrl-C 结束
    #[arg(short, long)]
    pub monitor: bool,
}

impl UartCommand {
    pub fn uart_config(&self) -> UartConfig {
        UartConfig {
            speed: self.speed,
            data_bits: self.data_bits,
            parity: self.parity,
            stop_bits: self.stop_bits,
            ..Default::default()
        }
    }

    /// 待发送的数据（可能为空）
    pub fn payload(&self) -> Result<Vec<u8>> {
        match (&self.send, &self.send_hex) {
            (Some(text), _) => Ok(text.as_bytes().to_vec()),
            (None, Some(hex)) => utils::parse_hex_bytes(hex),
            (None, None) => Ok(Vec::new()),
        }
    }

    pub fn execute(&self, conn: &ConnectionArgs) -> Result<()> {
        let payload = self.payload()?;
        if payload.is_empty() && !self.monitor {
            bail!("没有要做的事：使用 --send/--send-hex 或 --monitor");
        }

        let client = conn.connect()?;
        let uart = Uart::new(&client);
        uart.configure(self.uart_config())?;

        if !payload.is_empty() {
            uart.write(&payload)?;
            println!("TX {}", utils::format_bytes(&payload));
        }

        if self.monitor {
            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();
            ctrlc::set_handler(move || {
                r.store(false, Ordering::SeqCst);
            })?;

            uart.start_async_monitoring_with(|data| {
                println!("RX {}", utils::format_bytes(data));
            })?;
            info!("Monitoring UART at {} baud, press Ctrl-C to stop", self.speed);

            while running.load(Ordering::SeqCst) && !client.is_failed() {
                std::thread::sleep(Duration::from_millis(100));
            }
            uart.stop_async_monitoring()?;
        }

        client.close();
        Ok(())
    }
}
