//! 测试公共工具：基于 MockTransport 的模拟设备

#![allow(dead_code)]

use bpio_client::{Client, ClientConfig};
use bpio_protocol::{
    PacketCodec, RequestContents, RequestPacket, ResponsePacket, StatusResponse,
};
use bpio_transport::{MockHandle, MockTransport};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct DeviceState {
    requests: Vec<RequestPacket>,
    mode: Option<String>,
    reject_config: Option<String>,
    silent: bool,
    /// 下一次数据应答之前先发出的异步帧
    async_before_reply: VecDeque<Vec<u8>>,
    /// 下一次配置应答之前先发出的异步帧
    async_before_ack: VecDeque<Vec<u8>>,
    /// 脚本化的数据应答（为空时按 bytes_read 生成 0,1,2,...）
    data_replies: VecDeque<Vec<u8>>,
    data_error: Option<String>,
    max_write: Option<u32>,
    max_read: Option<u32>,
    protocol_minor: u16,
}

/// 模拟设备：解码客户端请求并生成应答
#[derive(Clone)]
pub struct FakeDevice {
    pub handle: MockHandle,
    state: Arc<Mutex<DeviceState>>,
}

impl FakeDevice {
    pub fn new() -> (Self, MockTransport) {
        let (transport, handle) = MockTransport::new();
        let state = Arc::new(Mutex::new(DeviceState::default()));
        let device = Self {
            handle: handle.clone(),
            state: state.clone(),
        };

        let codec = PacketCodec::new();
        handle.set_responder(move |bytes| {
            let request = match codec.decode_request(bytes) {
                Ok(request) => request,
                Err(e) => {
                    return vec![encode(&ResponsePacket::error(format!("bad request: {e}")))];
                },
            };
            let mut state = state.lock();
            state.requests.push(request.clone());
            if state.silent {
                return Vec::new();
            }
            respond(&mut state, request)
        });

        (device, transport)
    }

    /// 创建模拟设备并完成握手
    pub fn connect() -> (Client, Self) {
        Self::connect_with(fast_config())
    }

    pub fn connect_with(config: ClientConfig) -> (Client, Self) {
        let (device, transport) = Self::new();
        let client = Client::with_transport(transport, config).unwrap();
        (client, device)
    }

    /// 立即注入一帧异步数据
    pub fn inject_async(&self, data: &[u8]) {
        self.handle.inject(&encode(&ResponsePacket::async_data(data.to_vec())));
    }

    pub fn inject_raw(&self, bytes: &[u8]) {
        self.handle.inject(bytes);
    }

    pub fn queue_async_before_reply(&self, data: &[u8]) {
        self.state.lock().async_before_reply.push_back(data.to_vec());
    }

    pub fn queue_async_before_ack(&self, data: &[u8]) {
        self.state.lock().async_before_ack.push_back(data.to_vec());
    }

    pub fn queue_data_reply(&self, data: &[u8]) {
        self.state.lock().data_replies.push_back(data.to_vec());
    }

    pub fn fail_next_data(&self, error: &str) {
        self.state.lock().data_error = Some(error.to_string());
    }

    pub fn reject_config(&self, reason: &str) {
        self.state.lock().reject_config = Some(reason.to_string());
    }

    pub fn accept_config(&self) {
        self.state.lock().reject_config = None;
    }

    pub fn set_silent(&self, silent: bool) {
        self.state.lock().silent = silent;
    }

    pub fn set_limits(&self, max_write: Option<u32>, max_read: Option<u32>) {
        let mut state = self.state.lock();
        state.max_write = max_write;
        state.max_read = max_read;
    }

    pub fn current_mode(&self) -> Option<String> {
        self.state.lock().mode.clone()
    }

    pub fn requests(&self) -> Vec<RequestPacket> {
        self.state.lock().requests.clone()
    }

    pub fn data_requests(&self) -> Vec<bpio_protocol::DataRequest> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r.contents {
                RequestContents::Data(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn configuration_requests(&self) -> Vec<bpio_protocol::ConfigurationRequest> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r.contents {
                RequestContents::Configuration(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// 客户端写入的帧数（含握手）
    pub fn write_count(&self) -> usize {
        self.handle.write_count()
    }
}

fn respond(state: &mut DeviceState, request: RequestPacket) -> Vec<Vec<u8>> {
    match request.contents {
        RequestContents::Status(_) => {
            let status = StatusResponse {
                version_flatbuffers_major: Some(2),
                version_flatbuffers_minor: Some(state.protocol_minor),
                version_firmware_major: Some(1),
                version_firmware_minor: Some(4),
                mode_current: Some(state.mode.clone().unwrap_or_else(|| "HiZ".to_string())),
                modes_available: Some(
                    ["HiZ", "UART", "I2C", "SPI", "LED"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
                mode_max_write: state.max_write,
                mode_max_read: state.max_read,
                psu_enabled: Some(false),
                pullup_enabled: Some(false),
                ..Default::default()
            };
            vec![encode(&ResponsePacket::status(status))]
        },
        RequestContents::Configuration(config) => {
            let mut out: Vec<Vec<u8>> = state
                .async_before_ack
                .drain(..)
                .map(|d| encode(&ResponsePacket::async_data(d)))
                .collect();
            if let Some(reason) = state.reject_config.clone() {
                state.mode = None;
                out.push(encode(&ResponsePacket::config_ack(Some(reason))));
                return out;
            }
            if let Some(mode) = config.mode {
                state.mode = Some(mode);
            }
            out.push(encode(&ResponsePacket::config_ack(None)));
            out
        },
        RequestContents::Data(data) => {
            let mut out: Vec<Vec<u8>> = state
                .async_before_reply
                .drain(..)
                .map(|d| encode(&ResponsePacket::async_data(d)))
                .collect();
            if let Some(error) = state.data_error.take() {
                out.push(encode(&ResponsePacket::error(error)));
                return out;
            }
            let reply = state
                .data_replies
                .pop_front()
                .unwrap_or_else(|| (0..data.bytes_read).map(|i| i as u8).collect());
            out.push(encode(&ResponsePacket::data_reply(reply)));
            out
        },
    }
}

pub fn encode(packet: &ResponsePacket) -> Vec<u8> {
    PacketCodec::new().encode_response(packet).unwrap()
}

/// 测试用的短超时配置
pub fn fast_config() -> ClientConfig {
    ClientConfig {
        transaction_timeout_ms: 200,
        handshake_timeout_ms: 200,
        poll_timeout_ms: 20,
        poll_interval_ms: 2,
        monitor_stop_timeout_ms: 1_000,
        ..Default::default()
    }
}
