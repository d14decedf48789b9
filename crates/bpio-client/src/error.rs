//! 客户端错误类型定义

use bpio_protocol::ProtocolError;
use bpio_transport::TransportError;
use thiserror::Error;

/// 客户端错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 打开链路失败、握手超时或协议版本不兼容
    #[error("Connect failed: {0}")]
    Connect(String),

    /// 设备拒绝配置、配置无效、配置应答超时，或异步监视器未能及时停止
    #[error("Configuration failed: {0}")]
    Config(String),

    /// 需要已激活模式的操作在未配置时调用
    #[error("No mode configured")]
    NotConfigured,

    /// 应答无法解码、类型不符、设备报错或应答超时
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 链路故障（致命）
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// 之前发生过致命链路错误，需要重新打开
    #[error("Connection failed, reopen required")]
    ConnectionFailed,

    /// 客户端已关闭
    #[error("Client closed")]
    Closed,

    /// 无效输入（空事务、超长负载）
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 异步监视器线程错误
    #[error("Async monitor error: {0}")]
    Monitor(String),
}

impl ClientError {
    /// 是否为终止性错误（客户端不可再用）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionFailed | ClientError::Closed
        ) || matches!(self, ClientError::Transport(e) if e.is_fatal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::Protocol(ProtocolError::ResponseTimeout(Duration::from_millis(5)));
        let msg = format!("{}", err);
        assert!(msg.starts_with("Protocol error"), "message: {}", msg);

        let err = ClientError::Transport(TransportError::Disconnected);
        assert!(format!("{}", err).contains("disconnected"));

        let err = ClientError::Config("mode UART rejected".to_string());
        assert_eq!(format!("{}", err), "Configuration failed: mode UART rejected");

        assert_eq!(format!("{}", ClientError::NotConfigured), "No mode configured");
    }

    #[test]
    fn test_client_error_from_conversions() {
        let err: ClientError = ProtocolError::EmptyFrame.into();
        assert!(matches!(err, ClientError::Protocol(ProtocolError::EmptyFrame)));

        let err: ClientError = TransportError::Timeout.into();
        assert!(matches!(err, ClientError::Transport(TransportError::Timeout)));
    }

    #[test]
    fn test_terminal_errors() {
        assert!(ClientError::Closed.is_terminal());
        assert!(ClientError::ConnectionFailed.is_terminal());
        assert!(ClientError::Transport(TransportError::Disconnected).is_terminal());
        assert!(!ClientError::Transport(TransportError::Timeout).is_terminal());
        assert!(!ClientError::NotConfigured.is_terminal());
        assert!(!ClientError::Config("x".into()).is_terminal());
    }
}
