//! # BPIO Transport Layer
//!
//! 字节流传输抽象：客户端只通过 [`Transport`] 读写原始字节，
//! 成帧和报文解析由上层负责。
//!
//! - [`SerialTransport`]: 基于 `serialport` 的串口链路
//! - [`MockTransport`]: 内存模拟链路（`mock` feature 或测试时可用）

use std::time::Duration;
use thiserror::Error;

pub mod serial;

pub use serial::{SerialTransport, available_ports};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockHandle, MockTransport};

/// 默认串口波特率（USB CDC 下实际不生效，但打开端口时必须提供）
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// 读取超时（没有数据到达，链路本身正常）
    #[error("Read timeout")]
    Timeout,

    /// 对端断开（USB 拔出、EOF）
    #[error("Device disconnected")]
    Disconnected,

    /// 传输已被本地关闭
    #[error("Transport closed")]
    Closed,
}

impl TransportError {
    /// 致命错误：链路不可再用，调用方应进入失败状态
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TransportError::Timeout)
    }
}

/// 字节流传输
pub trait Transport: Send {
    /// 写入全部字节
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// 读取可用字节，最多等待 `timeout`
    ///
    /// 返回实际读取的字节数（> 0）。超时无数据时返回 [`TransportError::Timeout`]。
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError>;

    /// 读取当前已到达的字节，不等待
    fn try_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        match self.read(buf, Duration::ZERO) {
            Ok(n) => Ok(Some(n)),
            Err(TransportError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 链路描述（日志用）
    fn describe(&self) -> String {
        "transport".to_string()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(bytes)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        (**self).read(buf, timeout)
    }

    fn try_read(&mut self, buf: &mut [u8]) -> Result<Option<usize>, TransportError> {
        (**self).try_read(buf)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedTransport {
        written: Vec<u8>,
        chunks: Vec<Vec<u8>>,
    }

    impl Transport for ScriptedTransport {
        fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.written.extend_from_slice(bytes);
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, TransportError> {
            if self.chunks.is_empty() {
                return Err(TransportError::Timeout);
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_try_read_maps_timeout_to_none() {
        let mut t = ScriptedTransport {
            written: Vec::new(),
            chunks: vec![vec![1, 2]],
        };
        let mut buf = [0u8; 8];
        assert_eq!(t.try_read(&mut buf).unwrap(), Some(2));
        assert_eq!(t.try_read(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_boxed_transport_forwards() {
        let mut t: Box<dyn Transport> = Box::new(ScriptedTransport {
            written: Vec::new(),
            chunks: Vec::new(),
        });
        t.write_all(&[0xAA]).unwrap();
        assert_eq!(t.describe(), "transport");
        let mut buf = [0u8; 1];
        assert!(matches!(
            t.read(&mut buf, Duration::from_millis(1)),
            Err(TransportError::Timeout)
        ));
    }

    #[test]
    fn test_transport_error_fatality() {
        assert!(!TransportError::Timeout.is_fatal());
        assert!(TransportError::Disconnected.is_fatal());
        assert!(TransportError::Closed.is_fatal());
        let io = TransportError::from(std::io::Error::other("broken pipe"));
        assert!(io.is_fatal());
    }

    #[test]
    fn test_transport_error_display() {
        assert!(TransportError::Timeout.to_string().to_lowercase().contains("timeout"));
        assert!(TransportError::Disconnected.to_string().to_lowercase().contains("disconnect"));
        assert!(TransportError::Closed.to_string().to_lowercase().contains("closed"));
    }
}
