//! 帧编解码
//!
//! 报文体使用 postcard 序列化，再经 COBS 编码并追加 `0x00` 定界符。
//! [`FrameCodec`] 是编解码的抽象接口，客户端只依赖该 trait；
//! [`FrameAccumulator`] 负责把字节流切分为完整帧。

use crate::messages::{RequestPacket, ResponsePacket};
use crate::{FRAME_DELIMITER, MAX_FRAME_LEN, ProtocolError};
use bytes::{Buf, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

/// 帧编解码器
///
/// - `encode_request` 返回可直接写入链路的完整帧（含结尾定界符）
/// - `decode_response` 接收一帧的编码内容（不含定界符）
pub trait FrameCodec: Send + Sync {
    fn encode_request(&self, request: &RequestPacket) -> Result<Vec<u8>, ProtocolError>;

    fn decode_response(&self, frame: &[u8]) -> Result<ResponsePacket, ProtocolError>;
}

/// postcard + COBS 编解码器
///
/// 报文体不是设备固件使用的 FlatBuffers 格式：真实的 Bus Pirate 不认识这种编码。
/// 它用于测试、模拟设备以及自带固件的主机间链路。连接真实硬件时必须通过
/// `Client::with_codec` 或 `ClientBuilder::codec` 提供一个 FlatBuffers 的 [`FrameCodec`] 实现。
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketCodec;

impl PacketCodec {
    pub fn new() -> Self {
        Self
    }

    /// 编码响应（设备端方向，供模拟设备和测试使用）
    pub fn encode_response(&self, response: &ResponsePacket) -> Result<Vec<u8>, ProtocolError> {
        encode_frame(response)
    }

    /// 解码请求（设备端方向）
    pub fn decode_request(&self, frame: &[u8]) -> Result<RequestPacket, ProtocolError> {
        decode_frame(frame)
    }
}

impl FrameCodec for PacketCodec {
    fn encode_request(&self, request: &RequestPacket) -> Result<Vec<u8>, ProtocolError> {
        encode_frame(request)
    }

    fn decode_response(&self, frame: &[u8]) -> Result<ResponsePacket, ProtocolError> {
        decode_frame(frame)
    }
}

fn encode_frame<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    let body = postcard::to_stdvec(value)?;
    let mut frame = cobs::encode_vec(&body);
    if frame.len() > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len: frame.len(),
            max: MAX_FRAME_LEN,
        });
    }
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}

fn decode_frame<T: DeserializeOwned>(frame: &[u8]) -> Result<T, ProtocolError> {
    // 容忍调用方把定界符一并传入
    let frame = frame.strip_suffix(&[FRAME_DELIMITER]).unwrap_or(frame);
    if frame.is_empty() {
        return Err(ProtocolError::EmptyFrame);
    }
    let body = cobs::decode_vec(frame).map_err(|_| ProtocolError::Cobs { len: frame.len() })?;
    Ok(postcard::from_bytes(&body)?)
}

/// 帧累积器
///
/// 串口读取返回的字节块与帧边界无关：一次读取可能包含半帧，也可能包含多帧。
/// 累积器缓存未完成的部分，按定界符逐帧吐出。
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    buf: BytesMut,
    /// 正在丢弃一段超长噪声，直到下一个定界符
    discarding: bool,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加新读到的字节
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// 取出下一完整帧（不含定界符）
    ///
    /// 连续定界符之间的空帧被跳过。超过 [`MAX_FRAME_LEN`] 仍未结束的数据被丢弃。
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.buf.iter().position(|&b| b == FRAME_DELIMITER) {
                Some(pos) => {
                    let frame = self.buf.split_to(pos);
                    self.buf.advance(1);
                    if self.discarding {
                        self.discarding = false;
                        trace!("Resynchronized after oversized frame");
                        continue;
                    }
                    if frame.is_empty() {
                        continue;
                    }
                    return Some(frame.to_vec());
                },
                None => {
                    if self.buf.len() > MAX_FRAME_LEN {
                        warn!(
                            "Dropping {} bytes without frame delimiter (max frame {})",
                            self.buf.len(),
                            MAX_FRAME_LEN
                        );
                        self.buf.clear();
                        self.discarding = true;
                    }
                    return None;
                },
            }
        }
    }

    /// 已缓存但尚未成帧的字节数
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{DataRequest, ResponseKind};
    use crate::status::StatusQuery;

    #[test]
    fn test_encoded_frame_has_single_trailing_delimiter() {
        let codec = PacketCodec::new();
        let request = RequestPacket::data(DataRequest {
            data_write: vec![0x00, 0x01, 0x00, 0xFF],
            bytes_read: 2,
            ..Default::default()
        });
        let frame = codec.encode_request(&request).unwrap();
        assert_eq!(frame.last(), Some(&FRAME_DELIMITER));
        assert_eq!(
            frame.iter().filter(|&&b| b == FRAME_DELIMITER).count(),
            1,
            "COBS body must not contain the delimiter"
        );
    }

    #[test]
    fn test_request_decodes_on_device_side() {
        let codec = PacketCodec::new();
        let request = RequestPacket::status(vec![StatusQuery::Version]);
        let frame = codec.encode_request(&request).unwrap();
        let decoded = codec.decode_request(&frame).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_decode_rejects_empty_and_corrupt_frames() {
        let codec = PacketCodec::new();
        assert!(matches!(
            codec.decode_response(&[]),
            Err(ProtocolError::EmptyFrame)
        ));
        // COBS 首字节指向帧外
        assert!(codec.decode_response(&[0x09, 0x01]).is_err());
    }

    #[test]
    fn test_accumulator_handles_split_and_coalesced_frames() {
        let codec = PacketCodec::new();
        let a = codec.encode_response(&ResponsePacket::data_reply(vec![1, 2, 3])).unwrap();
        let b = codec.encode_response(&ResponsePacket::async_data(vec![9])).unwrap();

        let mut stream = a.clone();
        stream.extend_from_slice(&b);

        let mut acc = FrameAccumulator::new();
        let (head, tail) = stream.split_at(a.len() - 2);
        acc.push(head);
        assert!(acc.next_frame().is_none());

        acc.push(tail);
        let first = acc.next_frame().unwrap();
        let second = acc.next_frame().unwrap();
        assert!(acc.next_frame().is_none());
        assert_eq!(acc.pending(), 0);

        assert_eq!(
            codec.decode_response(&first).unwrap().kind(),
            ResponseKind::DataReply
        );
        assert_eq!(
            codec.decode_response(&second).unwrap().kind(),
            ResponseKind::AsyncData
        );
    }

    #[test]
    fn test_accumulator_skips_empty_frames() {
        let mut acc = FrameAccumulator::new();
        acc.push(&[0x00, 0x00, 0x02, 0x05, 0x00]);
        assert_eq!(acc.next_frame(), Some(vec![0x02, 0x05]));
        assert_eq!(acc.next_frame(), None);
    }

    #[test]
    fn test_accumulator_drops_oversized_garbage() {
        let mut acc = FrameAccumulator::new();
        acc.push(&vec![0x11; MAX_FRAME_LEN + 1]);
        assert_eq!(acc.next_frame(), None);
        assert_eq!(acc.pending(), 0);

        // 噪声尾部直到定界符都被丢弃，之后的帧正常
        acc.push(&[0x22, 0x22, 0x00, 0x02, 0x07, 0x00]);
        assert_eq!(acc.next_frame(), Some(vec![0x02, 0x07]));
    }
}
