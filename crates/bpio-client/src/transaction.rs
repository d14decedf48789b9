//! 同步事务的请求与结果

use crate::error::ClientError;
use bpio_protocol::DataRequest;

/// 一次同步事务
///
/// 先写 `write`，再读 `read_bytes` 字节。`start_main`/`stop_main`
/// 在事务前后产生主起止条件（I2C START/STOP、SPI 片选、LED 复位），
/// `start_alt`/`stop_alt` 为模式相关的备用条件。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    pub write: Vec<u8>,
    pub read_bytes: usize,
    pub start_main: bool,
    pub start_alt: bool,
    pub stop_main: bool,
    pub stop_alt: bool,
}

impl TransactionRequest {
    pub fn new(write: impl Into<Vec<u8>>, read_bytes: usize) -> Self {
        Self {
            write: write.into(),
            read_bytes,
            ..Default::default()
        }
    }

    /// 用主起止条件包围整个事务
    pub fn bracketed(mut self) -> Self {
        self.start_main = true;
        self.stop_main = true;
        self
    }

    pub fn with_start(mut self) -> Self {
        self.start_main = true;
        self
    }

    pub fn with_stop(mut self) -> Self {
        self.stop_main = true;
        self
    }

    pub fn with_alt_start(mut self) -> Self {
        self.start_alt = true;
        self
    }

    pub fn with_alt_stop(mut self) -> Self {
        self.stop_alt = true;
        self
    }

    /// 空操作：无写入、无读取、无起止条件
    pub fn is_noop(&self) -> bool {
        self.write.is_empty()
            && self.read_bytes == 0
            && !self.start_main
            && !self.start_alt
            && !self.stop_main
            && !self.stop_alt
    }

    pub(crate) fn into_data_request(self) -> Result<DataRequest, ClientError> {
        if self.is_noop() {
            return Err(ClientError::InvalidInput(
                "empty transaction (no write, no read, no framing)".to_string(),
            ));
        }
        let bytes_read = u16::try_from(self.read_bytes).map_err(|_| {
            ClientError::InvalidInput(format!(
                "read of {} bytes exceeds protocol maximum {}",
                self.read_bytes,
                u16::MAX
            ))
        })?;
        Ok(DataRequest {
            start_main: self.start_main,
            start_alt: self.start_alt,
            data_write: self.write,
            bytes_read,
            stop_main: self.stop_main,
            stop_alt: self.stop_alt,
        })
    }
}

/// 同步事务结果
///
/// `bytes_read` 可能小于请求的读取长度。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionResult {
    pub data: Vec<u8>,
    pub bytes_read: usize,
}

impl TransactionResult {
    pub fn new(data: Vec<u8>) -> Self {
        let bytes_read = data.len();
        Self { data, bytes_read }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_transaction_rejected() {
        let err = TransactionRequest::default().into_data_request().unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[test]
    fn test_framing_only_transaction_is_valid() {
        let req = TransactionRequest::default().bracketed();
        assert!(!req.is_noop());
        let data = req.into_data_request().unwrap();
        assert!(data.start_main && data.stop_main);
        assert!(data.data_write.is_empty());
    }

    #[test]
    fn test_oversized_read_rejected() {
        let err = TransactionRequest::new(vec![], 70_000)
            .into_data_request()
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[test]
    fn test_request_maps_to_data_request() {
        let data = TransactionRequest::new(b"AT".to_vec(), 4)
            .with_start()
            .with_alt_stop()
            .into_data_request()
            .unwrap();
        assert_eq!(data.data_write, b"AT");
        assert_eq!(data.bytes_read, 4);
        assert!(data.start_main && !data.stop_main);
        assert!(data.stop_alt && !data.start_alt);
    }

    #[test]
    fn test_result_counts_bytes() {
        let result = TransactionResult::new(vec![1, 2, 3]);
        assert_eq!(result.bytes_read, 3);
        assert_eq!(TransactionResult::new(Vec::new()), TransactionResult::default());
    }
}
