//! # BPIO Peripherals
//!
//! 基于 [`bpio_client::Client`] 的外设适配器。适配器只借用客户端，
//! 不持有自己的模式状态：当前模式与参数始终从客户端读取。
//!
//! - [`Uart`]: 配置、读写、异步接收
//! - [`Spi`]: 片选包围的全双工传输、JEDEC ID
//! - [`I2c`]: 写、读、写后读（重复起始）、总线扫描
//! - [`Led`]: WS2812 / APA102 / 板载 RGB 颜色帧

use bpio_client::{Client, ClientError};
use bpio_protocol::{Mode, ModeConfig};
use thiserror::Error;

pub mod i2c;
pub mod led;
pub mod spi;
pub mod uart;

pub use i2c::I2c;
pub use led::{Led, Rgb};
pub use spi::{JedecId, Spi};
pub use uart::Uart;

/// 外设层错误类型
#[derive(Error, Debug)]
pub enum PeripheralError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// 客户端当前不处于该外设的模式
    #[error("Wrong mode: expected {expected}, device is in {actual}")]
    WrongMode { expected: Mode, actual: Mode },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 设备返回的字节数少于所需
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, PeripheralError>;

/// 检查客户端处于 `expected` 模式，返回当前模式配置
pub(crate) fn require_mode(client: &Client, expected: Mode) -> Result<ModeConfig> {
    let state = client.mode_state();
    if state.mode() != expected {
        return Err(PeripheralError::WrongMode {
            expected,
            actual: state.mode(),
        });
    }
    Ok(state.config)
}
