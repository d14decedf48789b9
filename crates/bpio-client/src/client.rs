//! 协议客户端
//!
//! 一条物理链路同时承载同步事务和设备主动上报的异步数据。
//! 所有链路读写都在 `Shared::link` 互斥锁内完成；读到的帧在锁内分类：
//! 同步应答交给发起请求的调用者，异步帧按到达顺序转发给
//! 正在运行的监视器 sink，或放入异步队列。

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::monitor::{AsyncMonitor, AsyncSink};
use crate::queue::{AsyncFrame, AsyncQueue};
use crate::state::{ModeState, PayloadLimits};
use crate::transaction::{TransactionRequest, TransactionResult};
use arc_swap::ArcSwap;
use bpio_protocol::{
    DeviceSettings, FrameAccumulator, FrameCodec, Mode, ModeConfig, PacketCodec, ProtocolError,
    RequestPacket, ResponseContents, ResponsePacket, StatusInfo, StatusQuery,
    build_configuration_request,
};
use bpio_transport::{SerialTransport, Transport, TransportError};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use semver::{Version, VersionReq};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// 兼容的协议版本范围
pub const SUPPORTED_PROTOCOL: &str = "^2.0";

/// 写请求前清理链路时的最大读取次数（持续上报的设备不会让清理无限进行）
const MAX_FLUSH_READS: usize = 64;

/// 同步事务期间读到的异步帧如何处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AsyncPolicy {
    /// 按到达顺序分发给 sink 或队列
    Route,
    /// 丢弃（切换模式时它们属于旧模式）
    Discard,
}

/// 已打开的链路：transport + 未成帧的接收缓存
struct Link {
    transport: Box<dyn Transport>,
    rx: FrameAccumulator,
    buf: Vec<u8>,
}

/// 客户端与监视器线程共享的状态
pub(crate) struct Shared {
    /// `None` 表示已关闭
    link: Mutex<Option<Link>>,
    codec: Box<dyn FrameCodec>,
    config: ClientConfig,
    mode: ArcSwap<ModeState>,
    limits: ArcSwap<PayloadLimits>,
    queue: AsyncQueue,
    /// 监视器运行时的实时 sink（只在持有链路锁时发送）
    live_sink: Mutex<Option<Sender<AsyncFrame>>>,
    seq: AtomicU64,
    failed: AtomicBool,
    closed: AtomicBool,
}

impl Shared {
    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn set_live_sink(&self, sink: Option<Sender<AsyncFrame>>) {
        *self.live_sink.lock() = sink;
    }

    fn ensure_usable(&self) -> Result<(), ClientError> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        if self.is_failed() {
            return Err(ClientError::ConnectionFailed);
        }
        Ok(())
    }

    /// 记录 transport 错误；致命错误使客户端进入失败状态
    fn fail(&self, err: TransportError) -> ClientError {
        if err.is_fatal() && !self.failed.swap(true, Ordering::AcqRel) {
            error!("Transport failed, client is now unusable: {}", err);
        }
        ClientError::Transport(err)
    }

    /// 取下一完整帧，最多等到 `deadline`
    ///
    /// 至少尝试一次读取，因此 deadline 已过时仍会取走已到达的字节。
    fn read_frame(&self, link: &mut Link, deadline: Instant) -> Result<Option<Vec<u8>>, ClientError> {
        loop {
            if let Some(frame) = link.rx.next_frame() {
                trace!("RX frame ({} bytes)", frame.len());
                return Ok(Some(frame));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match link.transport.read(&mut link.buf, remaining) {
                Ok(n) => link.rx.push(&link.buf[..n]),
                Err(TransportError::Timeout) => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                },
                Err(e) => return Err(self.fail(e)),
            }
        }
    }

    fn next_async_frame(&self, data: Vec<u8>) -> AsyncFrame {
        AsyncFrame {
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            data,
            received_at: Instant::now(),
        }
    }

    /// 分发一帧异步数据（调用方必须持有链路锁以保证顺序）
    fn route_async(&self, data: Vec<u8>) {
        let frame = self.next_async_frame(data);
        debug!("Async frame #{} ({} bytes)", frame.seq, frame.data.len());
        let frame = match self.live_sink.lock().as_ref() {
            Some(tx) => match tx.send(frame) {
                Ok(()) => return,
                Err(e) => {
                    warn!("Async sink disconnected, queueing frame");
                    e.into_inner()
                },
            },
            None => frame,
        };
        self.queue.push(frame);
    }

    /// 写请求之前取走已经到达的数据
    ///
    /// 这些帧不可能是新请求的应答：同步帧（例如超时事务的迟到应答）被丢弃，
    /// 异步帧按 `policy` 处理。
    fn flush_stale(&self, link: &mut Link, policy: AsyncPolicy) -> Result<(), ClientError> {
        for _ in 0..MAX_FLUSH_READS {
            while let Some(raw) = link.rx.next_frame() {
                self.handle_unsolicited(raw, policy);
            }
            match link.transport.try_read(&mut link.buf) {
                Ok(Some(n)) if n > 0 => link.rx.push(&link.buf[..n]),
                Ok(_) => return Ok(()),
                Err(e) => return Err(self.fail(e)),
            }
        }
        while let Some(raw) = link.rx.next_frame() {
            self.handle_unsolicited(raw, policy);
        }
        Ok(())
    }

    /// 处理不属于当前请求的帧
    fn handle_unsolicited(&self, raw: Vec<u8>, policy: AsyncPolicy) {
        match self.codec.decode_response(&raw) {
            Ok(ResponsePacket {
                contents: ResponseContents::Data(data),
            }) if data.is_async => self.handle_async(data.data_read, policy),
            Ok(packet) => warn!("Discarding stale {:?} frame", packet.kind()),
            Err(e) => warn!("Discarding undecodable stale frame: {}", e),
        }
    }

    fn handle_async(&self, data: Vec<u8>, policy: AsyncPolicy) {
        match policy {
            AsyncPolicy::Route => self.route_async(data),
            AsyncPolicy::Discard => {
                warn!("Discarding {} bytes of async data from the previous mode", data.len())
            },
        }
    }

    /// 发送请求并等待第一帧同步应答
    ///
    /// `timeout` 从调用时开始计算，包括等待链路锁的时间。
    /// 写请求前已在链路上的帧先被清理；之后读到的异步帧按 `policy` 处理。
    fn exchange(
        &self,
        request: &RequestPacket,
        timeout: Duration,
        policy: AsyncPolicy,
    ) -> Result<ResponsePacket, ClientError> {
        let deadline = Instant::now() + timeout;
        let frame = self.codec.encode_request(request)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let Some(mut guard) = self.link.try_lock_for(remaining) else {
            debug!("Link busy for {:?}, giving up", timeout);
            return Err(ProtocolError::ResponseTimeout(timeout).into());
        };
        let link = guard.as_mut().ok_or(ClientError::Closed)?;
        if self.is_failed() {
            return Err(ClientError::ConnectionFailed);
        }

        self.flush_stale(link, policy)?;
        link.transport
            .write_all(&frame)
            .map_err(|e| self.fail(e))?;
        trace!("TX frame ({} bytes)", frame.len());

        loop {
            let Some(raw) = self.read_frame(link, deadline)? else {
                return Err(ProtocolError::ResponseTimeout(timeout).into());
            };
            let packet = self.codec.decode_response(&raw)?;
            match packet.contents {
                ResponseContents::Data(data) if data.is_async => {
                    self.handle_async(data.data_read, policy)
                },
                contents => return Ok(ResponsePacket::new(contents)),
            }
        }
    }

    /// 轮询一帧异步数据并直接返回（不经过 sink）
    fn poll_async(&self, timeout: Duration) -> Result<Option<AsyncFrame>, ClientError> {
        self.ensure_usable()?;
        let start = Instant::now();
        let Some(mut guard) = self.link.try_lock_for(timeout) else {
            return Ok(None);
        };
        let link = guard.as_mut().ok_or(ClientError::Closed)?;
        let deadline = start + timeout;

        while let Some(raw) = self.read_frame(link, deadline)? {
            match self.codec.decode_response(&raw) {
                Ok(ResponsePacket {
                    contents: ResponseContents::Data(data),
                }) if data.is_async => return Ok(Some(self.next_async_frame(data.data_read))),
                Ok(packet) => warn!("Discarding stray {:?} frame while polling", packet.kind()),
                Err(e) => warn!("Discarding undecodable frame while polling: {}", e),
            }
        }
        Ok(None)
    }

    /// 读取并分发异步帧（监视器使用）
    ///
    /// 第一帧最多等待 `timeout`；之后只取走已经到达的数据。返回分发的帧数。
    pub(crate) fn pump(&self, timeout: Duration) -> Result<usize, ClientError> {
        self.ensure_usable()?;
        let start = Instant::now();
        let Some(mut guard) = self.link.try_lock_for(timeout) else {
            return Ok(0);
        };
        let link = guard.as_mut().ok_or(ClientError::Closed)?;

        let mut routed = 0;
        loop {
            let deadline = if routed == 0 { start + timeout } else { Instant::now() };
            let Some(raw) = self.read_frame(link, deadline)? else {
                return Ok(routed);
            };
            match self.codec.decode_response(&raw) {
                Ok(ResponsePacket {
                    contents: ResponseContents::Data(data),
                }) if data.is_async => {
                    self.route_async(data.data_read);
                    routed += 1;
                },
                Ok(packet) => warn!("Discarding stray {:?} frame while monitoring", packet.kind()),
                Err(e) => warn!("Discarding undecodable frame while monitoring: {}", e),
            }
        }
    }
}

/// BPIO2 协议客户端
///
/// `Client` 是 `Send + Sync` 的：可以在用户线程发起事务，
/// 同时由后台监视器线程接收异步数据。
///
/// # Example
///
/// ```no_run
/// use bpio_client::{Client, ClientConfig};
/// use bpio_protocol::{ModeConfig, UartConfig};
///
/// let client = Client::open("/dev/ttyACM1", &ClientConfig::default())?;
/// client.configure(ModeConfig::Uart(UartConfig::default()))?;
/// let reply = client.transact(b"AT\r\n", 0)?;
/// println!("{} bytes read", reply.bytes_read);
/// client.close();
/// # Ok::<(), bpio_client::ClientError>(())
/// ```
pub struct Client {
    shared: Arc<Shared>,
    monitor: Mutex<Option<AsyncMonitor>>,
    /// 串行化 configure 与 close
    config_lock: Mutex<()>,
    protocol_version: (u8, u16),
}

impl Client {
    /// 打开串口并完成版本握手
    pub fn open(port: &str, config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = SerialTransport::open_with_baud(port, config.baud_rate)
            .map_err(|e| ClientError::Connect(format!("cannot open {port}: {e}")))?;
        info!("Opened {}", port);
        Self::with_transport(transport, config.clone())
    }

    /// 在已打开的 transport 上完成版本握手
    pub fn with_transport<T>(transport: T, config: ClientConfig) -> Result<Self, ClientError>
    where
        T: Transport + 'static,
    {
        Self::with_codec(transport, Box::new(PacketCodec::new()), config)
    }

    /// 使用自定义帧编解码器
    ///
    /// 连接真实设备时传入 FlatBuffers 实现；[`Client::new`] 使用的 [`PacketCodec`] 设备不认识。
    pub fn with_codec<T>(
        transport: T,
        codec: Box<dyn FrameCodec>,
        config: ClientConfig,
    ) -> Result<Self, ClientError>
    where
        T: Transport + 'static,
    {
        let describe = transport.describe();
        let shared = Arc::new(Shared {
            link: Mutex::new(Some(Link {
                transport: Box::new(transport),
                rx: FrameAccumulator::new(),
                buf: vec![0u8; config.read_chunk_size.max(1)],
            })),
            codec,
            config,
            mode: ArcSwap::from_pointee(ModeState::default()),
            limits: ArcSwap::from_pointee(PayloadLimits::default()),
            queue: AsyncQueue::new(),
            live_sink: Mutex::new(None),
            seq: AtomicU64::new(0),
            failed: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        });

        let protocol_version = handshake(&shared)?;
        info!(
            "Connected to {} (protocol {}.{})",
            describe, protocol_version.0, protocol_version.1
        );

        Ok(Self {
            shared,
            monitor: Mutex::new(None),
            config_lock: Mutex::new(()),
            protocol_version,
        })
    }

    /// 握手时协商的协议版本
    pub fn protocol_version(&self) -> (u8, u16) {
        self.protocol_version
    }

    pub fn config(&self) -> &ClientConfig {
        self.shared.config()
    }

    /// 当前模式（无锁读取）
    pub fn mode(&self) -> Mode {
        self.shared.mode.load().mode()
    }

    pub fn mode_state(&self) -> ModeState {
        **self.shared.mode.load()
    }

    pub fn payload_limits(&self) -> PayloadLimits {
        **self.shared.limits.load()
    }

    pub fn is_failed(&self) -> bool {
        self.shared.is_failed()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// 查询设备状态
    ///
    /// 空选择器表示查询全部字段。
    pub fn status(&self, selector: &[StatusQuery]) -> Result<StatusInfo, ClientError> {
        self.shared.ensure_usable()?;
        let request = RequestPacket::status(StatusQuery::normalize(selector));
        let reply = self
            .shared
            .exchange(&request, self.shared.config.transaction_timeout(), AsyncPolicy::Route)?;

        let info = match reply.contents {
            ResponseContents::Status(status) => StatusInfo::try_from(*status)?,
            ResponseContents::Error(e) => return Err(ProtocolError::Device(e.error).into()),
            other => {
                return Err(ProtocolError::UnexpectedResponse {
                    expected: "status",
                    actual: ResponsePacket::new(other).kind(),
                }
                .into());
            },
        };

        if let Some(limits) = PayloadLimits::from_status(&info, self.mode()) {
            debug!("Payload limits updated: {:?}", limits);
            self.shared.limits.store(Arc::new(limits));
        }
        Ok(info)
    }

    /// 切换模式
    pub fn configure(&self, config: ModeConfig) -> Result<(), ClientError> {
        self.configure_with(config, DeviceSettings::default())
    }

    /// 切换模式并同时应用 PSU/上拉设置
    ///
    /// 顺序：停止监视器 → 清空异步队列 → 发送配置 → 记录模式 → 重启监视器。
    /// 设备拒绝或应答异常时模式被置为 none，客户端仍可再次配置。
    pub fn configure_with(
        &self,
        config: ModeConfig,
        settings: DeviceSettings,
    ) -> Result<(), ClientError> {
        let _guard = self.config_lock.lock();
        self.shared.ensure_usable()?;

        let request = build_configuration_request(&config, &settings)
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let timeout = self.shared.config.monitor_stop_timeout();
        let resume = self.stop_monitor_slot().map_err(|e| {
            error!("Async monitor did not stop before reconfiguration: {}", e);
            ClientError::Config(format!("async monitor did not stop within {timeout:?}"))
        })?;

        self.shared.queue.clear();
        self.shared.limits.store(Arc::new(PayloadLimits::default()));

        // 应答之前到达的异步数据都属于旧模式
        let reply = self.shared.exchange(
            &RequestPacket::configuration(request),
            self.shared.config.transaction_timeout(),
            AsyncPolicy::Discard,
        );

        let rejection = match reply {
            Ok(packet) => match packet.contents {
                ResponseContents::Configuration(ack) => ack.error,
                ResponseContents::Error(e) => Some(e.error),
                other => Some(format!(
                    "unexpected {:?} reply to configuration",
                    ResponsePacket::new(other).kind()
                )),
            },
            Err(ClientError::Protocol(e)) => Some(e.to_string()),
            Err(e) => {
                self.shared.mode.store(Arc::new(ModeState::default()));
                return Err(e);
            },
        };

        if let Some(reason) = rejection {
            warn!("Configuration to {} rejected: {}", config.mode(), reason);
            self.shared.mode.store(Arc::new(ModeState::default()));
            return Err(ClientError::Config(reason));
        }

        self.shared.queue.clear();
        self.shared.mode.store(Arc::new(ModeState::new(config)));
        info!("Mode set to {}", config.mode());

        if let Some(sink) = resume {
            self.start_async_monitor(sink)?;
        }
        Ok(())
    }

    /// 同步事务：写 `write_data`，再读 `read_bytes` 字节
    pub fn transact(&self, write_data: &[u8], read_bytes: usize) -> Result<TransactionResult, ClientError> {
        self.transact_request(TransactionRequest::new(write_data, read_bytes))
    }

    /// 带起止条件的同步事务
    pub fn transact_request(&self, request: TransactionRequest) -> Result<TransactionResult, ClientError> {
        self.shared.ensure_usable()?;
        if !self.shared.mode.load().is_configured() {
            return Err(ClientError::NotConfigured);
        }
        self.shared
            .limits
            .load()
            .check(request.write.len(), request.read_bytes)
            .map_err(ClientError::InvalidInput)?;

        let data = request.into_data_request()?;
        let reply = self
            .shared
            .exchange(
                &RequestPacket::data(data),
                self.shared.config.transaction_timeout(),
                AsyncPolicy::Route,
            )?;

        match reply.contents {
            ResponseContents::Data(data) => match data.error {
                Some(error) => Err(ProtocolError::Device(error).into()),
                None => Ok(TransactionResult::new(data.data_read)),
            },
            ResponseContents::Error(e) => Err(ProtocolError::Device(e.error).into()),
            other => Err(ProtocolError::UnexpectedResponse {
                expected: "data reply",
                actual: ResponsePacket::new(other).kind(),
            }
            .into()),
        }
    }

    /// 轮询一帧异步数据
    ///
    /// 等待时间（包括等待链路锁）不超过 `timeout`。期间读到的同步应答被丢弃。
    pub fn poll_async(&self, timeout: Duration) -> Result<Option<AsyncFrame>, ClientError> {
        self.shared.poll_async(timeout)
    }

    /// 取出异步队列中的全部帧（不访问链路）
    pub fn drain_async_queue(&self) -> Vec<AsyncFrame> {
        self.shared.queue.drain()
    }

    pub fn async_queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    /// 启动后台异步监视器（已有的监视器会先被停止）
    pub fn start_async_monitor(&self, sink: AsyncSink) -> Result<(), ClientError> {
        self.shared.ensure_usable()?;
        let mut slot = self.monitor.lock();
        if let Some(previous) = slot.as_mut() {
            previous.stop(self.shared.config.monitor_stop_timeout())?;
        }
        *slot = Some(AsyncMonitor::spawn(self.shared.clone(), sink)?);
        Ok(())
    }

    /// 停止后台异步监视器（未运行时为空操作）
    pub fn stop_async_monitor(&self) -> Result<(), ClientError> {
        self.stop_monitor_slot().map(|_| ())
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.lock().as_ref().is_some_and(AsyncMonitor::is_running)
    }

    /// 停止监视器并返回它的 sink
    ///
    /// 超时未退出的监视器留在槽位中，之后的 configure/stop/close 会再次等待它。
    fn stop_monitor_slot(&self) -> Result<Option<AsyncSink>, ClientError> {
        let mut slot = self.monitor.lock();
        let Some(monitor) = slot.as_mut() else {
            return Ok(None);
        };
        let sink = monitor.stop(self.shared.config.monitor_stop_timeout())?;
        *slot = None;
        Ok(Some(sink))
    }

    /// 关闭客户端（幂等）
    ///
    /// 停止监视器、清空异步队列并释放 transport。
    pub fn close(&self) {
        let _guard = self.config_lock.lock();
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Err(e) = self.stop_monitor_slot() {
            error!("Async monitor did not stop on close: {}", e);
        }

        self.shared.set_live_sink(None);
        self.shared.queue.clear();
        self.shared.mode.store(Arc::new(ModeState::default()));
        drop(self.shared.link.lock().take());
        info!("Client closed");
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

/// 请求版本字段并检查兼容性
fn handshake(shared: &Shared) -> Result<(u8, u16), ClientError> {
    let request = RequestPacket::status(vec![StatusQuery::Version]);
    let timeout = shared.config.handshake_timeout();

    let reply = shared
        .exchange(&request, timeout, AsyncPolicy::Discard)
        .map_err(|e| match e {
        ClientError::Protocol(ProtocolError::ResponseTimeout(_)) => {
            ClientError::Connect(format!("no status reply within {timeout:?}"))
        },
        other => ClientError::Connect(format!("handshake failed: {other}")),
    })?;

    let status = match reply.contents {
        ResponseContents::Status(status) => StatusInfo::try_from(*status)
            .map_err(|e| ClientError::Connect(format!("handshake failed: {e}")))?,
        other => {
            return Err(ClientError::Connect(format!(
                "expected status reply, got {:?}",
                ResponsePacket::new(other).kind()
            )));
        },
    };

    let (major, minor) = status
        .protocol_version()
        .ok_or_else(|| ClientError::Connect("device did not report protocol version".to_string()))?;

    let req = VersionReq::parse(SUPPORTED_PROTOCOL)
        .map_err(|e| ClientError::Connect(format!("bad version requirement: {e}")))?;
    if !req.matches(&Version::new(major.into(), minor.into(), 0)) {
        return Err(ClientError::Connect(
            ProtocolError::UnsupportedVersion { major, minor }.to_string(),
        ));
    }
    Ok((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpio_protocol::{PROTOCOL_VERSION_MAJOR, PROTOCOL_VERSION_MINOR, StatusResponse};
    use bpio_transport::MockTransport;

    fn version_reply(major: u8, minor: u16) -> Vec<u8> {
        PacketCodec::new()
            .encode_response(&ResponsePacket::status(StatusResponse {
                version_flatbuffers_major: Some(major),
                version_flatbuffers_minor: Some(minor),
                ..Default::default()
            }))
            .unwrap()
    }

    /// 设备对每个请求回同一帧
    fn reply_with(handle: &bpio_transport::MockHandle, frame: Vec<u8>) {
        handle.set_responder(move |_| vec![frame.clone()]);
    }

    fn fast_config() -> ClientConfig {
        ClientConfig {
            transaction_timeout_ms: 50,
            handshake_timeout_ms: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_handshake_accepts_compatible_version() {
        let (transport, handle) = MockTransport::new();
        reply_with(&handle, version_reply(PROTOCOL_VERSION_MAJOR, PROTOCOL_VERSION_MINOR + 3));
        let client = Client::with_transport(transport, fast_config()).unwrap();
        assert_eq!(client.protocol_version(), (2, 3));
        assert_eq!(client.mode(), Mode::None);
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn test_handshake_rejects_major_mismatch() {
        let (transport, handle) = MockTransport::new();
        reply_with(&handle, version_reply(1, 9));
        let err = Client::with_transport(transport, fast_config()).err().unwrap();
        match err {
            ClientError::Connect(msg) => assert!(msg.contains("1.9"), "message: {}", msg),
            other => panic!("Expected Connect, got {:?}", other),
        }
    }

    #[test]
    fn test_handshake_timeout_is_connect_error() {
        let (transport, _handle) = MockTransport::new();
        let err = Client::with_transport(transport, fast_config()).err().unwrap();
        assert!(matches!(err, ClientError::Connect(_)));
    }

    #[test]
    fn test_handshake_without_version_fields() {
        let (transport, handle) = MockTransport::new();
        reply_with(
            &handle,
            PacketCodec::new()
                .encode_response(&ResponsePacket::status(StatusResponse::default()))
                .unwrap(),
        );
        let err = Client::with_transport(transport, fast_config()).err().unwrap();
        assert!(matches!(err, ClientError::Connect(_)));
    }

    #[test]
    fn test_handshake_ignores_bytes_already_on_the_link() {
        let (transport, handle) = MockTransport::new();
        // 打开前设备残留的应答不能被当作握手应答
        handle.inject(&version_reply(1, 0));
        reply_with(&handle, version_reply(PROTOCOL_VERSION_MAJOR, 1));
        let client = Client::with_transport(transport, fast_config()).unwrap();
        assert_eq!(client.protocol_version(), (2, 1));
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }
}
