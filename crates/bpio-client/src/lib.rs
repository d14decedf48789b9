//! # BPIO Client
//!
//! BPIO2 协议客户端：在一条串口链路上同时承载同步事务与设备主动上报的异步数据。
//!
//! - 同步事务：发送请求，读取第一帧同步应答（FIFO，同一时刻至多一个未完成请求）
//! - 异步数据：与应答交错到达的主动上报帧，按到达顺序进入异步队列，
//!   或在监视器运行时转发给它的 sink
//! - 模式状态：`ArcSwap` 无锁读取，只在配置锁内写入
//!
//! # Example
//!
//! ```no_run
//! use bpio_client::{AsyncSink, ClientBuilder};
//! use bpio_protocol::{ModeConfig, UartConfig};
//!
//! let client = ClientBuilder::new().port("/dev/ttyACM1").build()?;
//! client.configure(ModeConfig::Uart(UartConfig::default()))?;
//! client.start_async_monitor(AsyncSink::callback(|frame| {
//!     println!("#{}: {:02x?}", frame.seq, frame.data);
//! }))?;
//! client.transact(b"ATI\r\n", 0)?;
//! # Ok::<(), bpio_client::ClientError>(())
//! ```

mod builder;
mod client;
mod config;
mod error;
mod monitor;
pub mod queue;
pub mod state;
mod transaction;

pub use builder::ClientBuilder;
pub use client::{Client, SUPPORTED_PROTOCOL};
pub use config::ClientConfig;
pub use error::ClientError;
pub use monitor::{AsyncCallback, AsyncSink};
pub use queue::{AsyncFrame, AsyncQueue};
pub use state::{ModeState, PayloadLimits};
pub use transaction::{TransactionRequest, TransactionResult};
