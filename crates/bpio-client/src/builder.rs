//! Builder 模式实现
//!
//! 提供链式构造 `Client` 实例的便捷方式。

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::ClientError;
use bpio_protocol::{FrameCodec, PacketCodec};
use bpio_transport::{SerialTransport, Transport};

/// Client Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use bpio_client::ClientBuilder;
///
/// let client = ClientBuilder::new()
///     .port("/dev/ttyACM1")
///     .transaction_timeout_ms(500)
///     .build()
///     .unwrap();
/// ```
pub struct ClientBuilder {
    /// 串口路径
    port: Option<String>,
    config: ClientConfig,
    codec: Option<Box<dyn FrameCodec>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            port: None,
            config: ClientConfig::default(),
            codec: None,
        }
    }

    /// 设置串口路径（`build()` 必需）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 整体替换配置
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.config.baud_rate = baud_rate;
        self
    }

    pub fn transaction_timeout_ms(mut self, ms: u64) -> Self {
        self.config.transaction_timeout_ms = ms;
        self
    }

    pub fn handshake_timeout_ms(mut self, ms: u64) -> Self {
        self.config.handshake_timeout_ms = ms;
        self
    }

    pub fn poll_timeout_ms(mut self, ms: u64) -> Self {
        self.config.poll_timeout_ms = ms;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn monitor_stop_timeout_ms(mut self, ms: u64) -> Self {
        self.config.monitor_stop_timeout_ms = ms;
        self
    }

    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    /// 使用自定义帧编解码器（默认 [`PacketCodec`]）
    ///
    /// 默认编解码器不是 FlatBuffers，真实设备必须在这里传入 FlatBuffers 实现。
    pub fn codec(mut self, codec: Box<dyn FrameCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// 打开串口并握手
    ///
    /// # Errors
    /// - `ClientError::Connect`: 未设置端口、端口无法打开或握手失败
    pub fn build(self) -> Result<Client, ClientError> {
        let port = self
            .port
            .clone()
            .ok_or_else(|| ClientError::Connect("no serial port specified".to_string()))?;
        let transport = SerialTransport::open_with_baud(&port, self.config.baud_rate)
            .map_err(|e| ClientError::Connect(format!("cannot open {port}: {e}")))?;
        self.build_with_transport(transport)
    }

    /// 在给定的 transport 上握手
    pub fn build_with_transport<T>(self, transport: T) -> Result<Client, ClientError>
    where
        T: Transport + 'static,
    {
        let codec = self.codec.unwrap_or_else(|| Box::new(PacketCodec::new()));
        Client::with_codec(transport, codec, self.config)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
