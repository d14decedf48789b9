//! 内存模拟链路
//!
//! [`MockTransport`] 交给客户端使用，[`MockHandle`] 留在测试代码中扮演设备：
//! 记录客户端写入的字节、注入设备发出的字节、模拟断线。
//! 可选的 responder 在每次写入时被调用，返回要回送的字节块。

use crate::{Transport, TransportError};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

#[derive(Default)]
struct MockState {
    rx: VecDeque<u8>,
    written: Vec<Vec<u8>>,
    responder: Option<Responder>,
    disconnected: bool,
    fail_writes: bool,
    /// 单次 read 最多返回的字节数（模拟分片到达）
    max_read_chunk: Option<usize>,
}

struct Inner {
    state: Mutex<MockState>,
    readable: Condvar,
}

/// 设备侧句柄
#[derive(Clone)]
pub struct MockHandle {
    inner: Arc<Inner>,
}

/// 客户端侧传输
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> (Self, MockHandle) {
        let inner = Arc::new(Inner {
            state: Mutex::new(MockState::default()),
            readable: Condvar::new(),
        });
        (
            Self {
                inner: inner.clone(),
            },
            MockHandle { inner },
        )
    }
}

impl MockHandle {
    /// 注入设备发出的字节
    pub fn inject(&self, bytes: &[u8]) {
        let mut state = self.inner.state.lock();
        state.rx.extend(bytes.iter().copied());
        self.inner.readable.notify_all();
    }

    /// 设置写入响应器（替换已有的）
    pub fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        self.inner.state.lock().responder = Some(Box::new(responder));
    }

    pub fn clear_responder(&self) {
        self.inner.state.lock().responder = None;
    }

    /// 客户端写入的全部字节块（按写入顺序）
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.inner.state.lock().written.clone()
    }

    pub fn take_written(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.inner.state.lock().written)
    }

    pub fn write_count(&self) -> usize {
        self.inner.state.lock().written.len()
    }

    /// 尚未被客户端读走的字节数
    pub fn pending_rx(&self) -> usize {
        self.inner.state.lock().rx.len()
    }

    /// 模拟设备断开：挂起的与后续的读写都返回 `Disconnected`
    pub fn disconnect(&self) {
        let mut state = self.inner.state.lock();
        state.disconnected = true;
        self.inner.readable.notify_all();
    }

    /// 令后续写入失败（IO 错误）
    pub fn fail_writes(&self, fail: bool) {
        self.inner.state.lock().fail_writes = fail;
    }

    pub fn set_max_read_chunk(&self, chunk: Option<usize>) {
        self.inner.state.lock().max_read_chunk = chunk;
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut responder = {
            let mut state = self.inner.state.lock();
            if state.disconnected {
                return Err(TransportError::Disconnected);
            }
            if state.fail_writes {
                return Err(TransportError::Io(std::io::Error::other("mock write failure")));
            }
            state.written.push(bytes.to_vec());
            state.responder.take()
        };

        // responder 在锁外执行，允许它回调 MockHandle
        if let Some(respond) = responder.as_mut() {
            let replies = respond(bytes);
            let mut state = self.inner.state.lock();
            for reply in replies {
                state.rx.extend(reply);
            }
            if state.responder.is_none() {
                state.responder = responder;
            }
            self.inner.readable.notify_all();
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock();
        loop {
            if !state.rx.is_empty() {
                let limit = state.max_read_chunk.unwrap_or(usize::MAX);
                let n = state.rx.len().min(buf.len()).min(limit);
                for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
                    *slot = byte;
                }
                return Ok(n);
            }
            if state.disconnected {
                return Err(TransportError::Disconnected);
            }
            if self.inner.readable.wait_until(&mut state, deadline).timed_out() {
                if !state.rx.is_empty() {
                    continue;
                }
                return Err(TransportError::Timeout);
            }
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
