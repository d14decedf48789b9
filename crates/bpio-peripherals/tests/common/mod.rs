//! 测试公共工具：可编程应答的模拟设备

#![allow(dead_code)]

use bpio_client::{Client, ClientConfig};
use bpio_protocol::{
    ConfigurationRequest, DataRequest, PacketCodec, RequestContents, ResponsePacket,
    StatusResponse,
};
use bpio_transport::{MockHandle, MockTransport};
use parking_lot::Mutex;
use std::sync::Arc;

type DataHandler = Box<dyn FnMut(&DataRequest) -> ResponsePacket + Send>;

struct Recorded {
    data: Vec<DataRequest>,
    config: Vec<ConfigurationRequest>,
    handler: DataHandler,
}

#[derive(Clone)]
pub struct ScriptedDevice {
    pub handle: MockHandle,
    recorded: Arc<Mutex<Recorded>>,
}

impl ScriptedDevice {
    /// 完成握手的客户端 + 设备（默认对数据请求回 `bytes_read` 个 0x5A）
    pub fn connect() -> (Client, Self) {
        let (transport, handle) = MockTransport::new();
        let recorded = Arc::new(Mutex::new(Recorded {
            data: Vec::new(),
            config: Vec::new(),
            handler: Box::new(|req| ResponsePacket::data_reply(vec![0x5A; req.bytes_read as usize])),
        }));

        let codec = PacketCodec::new();
        let state = recorded.clone();
        handle.set_responder(move |bytes| {
            let Ok(request) = codec.decode_request(bytes) else {
                return Vec::new();
            };
            let mut state = state.lock();
            let reply = match request.contents {
                RequestContents::Status(_) => ResponsePacket::status(StatusResponse {
                    version_flatbuffers_major: Some(2),
                    version_flatbuffers_minor: Some(0),
                    ..Default::default()
                }),
                RequestContents::Configuration(c) => {
                    state.config.push(c);
                    ResponsePacket::config_ack(None)
                },
                RequestContents::Data(d) => {
                    let reply = (state.handler)(&d);
                    state.data.push(d);
                    reply
                },
            };
            vec![codec.encode_response(&reply).unwrap()]
        });

        let config = ClientConfig {
            transaction_timeout_ms: 200,
            handshake_timeout_ms: 200,
            poll_timeout_ms: 20,
            poll_interval_ms: 2,
            ..Default::default()
        };
        let client = Client::with_transport(transport, config).unwrap();
        (
            client,
            Self {
                handle,
                recorded,
            },
        )
    }

    pub fn on_data<F>(&self, handler: F)
    where
        F: FnMut(&DataRequest) -> ResponsePacket + Send + 'static,
    {
        self.recorded.lock().handler = Box::new(handler);
    }

    pub fn data_requests(&self) -> Vec<DataRequest> {
        self.recorded.lock().data.clone()
    }

    pub fn last_data(&self) -> DataRequest {
        self.data_requests().pop().unwrap()
    }

    pub fn last_config(&self) -> ConfigurationRequest {
        self.recorded.lock().config.last().cloned().unwrap()
    }

    pub fn inject_async(&self, data: &[u8]) {
        let frame = PacketCodec::new()
            .encode_response(&ResponsePacket::async_data(data.to_vec()))
            .unwrap();
        self.handle.inject(&frame);
    }
}
