//! 串口传输
//!
//! Bus Pirate 的 BPIO2 接口是一个 USB CDC 虚拟串口。

use crate::{DEFAULT_BAUD_RATE, Transport, TransportError};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// 打开端口时的默认读超时
const OPEN_TIMEOUT: Duration = Duration::from_millis(100);

/// 串口链路
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    path: String,
    /// 上一次设置给驱动的读超时（避免每次读取都重复设置）
    current_timeout: Duration,
}

impl SerialTransport {
    /// 以默认波特率打开串口
    pub fn open(path: &str) -> Result<Self, TransportError> {
        Self::open_with_baud(path, DEFAULT_BAUD_RATE)
    }

    pub fn open_with_baud(path: &str, baud_rate: u32) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate).timeout(OPEN_TIMEOUT).open()?;
        debug!("Opened serial port {} at {} baud", path, baud_rate);
        Ok(Self {
            port,
            path: path.to_string(),
            current_timeout: OPEN_TIMEOUT,
        })
    }

    /// 包装一个已打开的端口
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        let path = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        let current_timeout = port.timeout();
        Self {
            port,
            path,
            current_timeout,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        trace!("TX {} bytes on {}", bytes.len(), self.path);
        self.port.write_all(bytes).map_err(map_io_error)?;
        self.port.flush().map_err(map_io_error)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        if timeout == Duration::ZERO {
            // 零超时：只取驱动缓冲区中已有的字节
            let available = self.port.bytes_to_read()? as usize;
            if available == 0 {
                return Err(TransportError::Timeout);
            }
            let n = available.min(buf.len());
            return self.read_blocking(&mut buf[..n]);
        }

        if timeout != self.current_timeout {
            self.port.set_timeout(timeout)?;
            self.current_timeout = timeout;
        }
        self.read_blocking(buf)
    }

    fn describe(&self) -> String {
        format!("serial:{}", self.path)
    }
}

impl SerialTransport {
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.port.read(buf) {
            // 串口读到 0 字节意味着设备已消失
            Ok(0) => Err(TransportError::Disconnected),
            Ok(n) => {
                trace!("RX {} bytes on {}", n, self.path);
                Ok(n)
            },
            Err(e) => Err(map_io_error(e)),
        }
    }
}

fn map_io_error(e: std::io::Error) -> TransportError {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted => {
            TransportError::Timeout
        },
        ErrorKind::BrokenPipe
        | ErrorKind::NotConnected
        | ErrorKind::ConnectionAborted
        | ErrorKind::UnexpectedEof => TransportError::Disconnected,
        _ => TransportError::Io(e),
    }
}

/// 列出系统中的串口
pub fn available_ports() -> Result<Vec<String>, TransportError> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|p| p.port_name)
        .collect())
}
