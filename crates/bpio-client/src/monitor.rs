//! 异步监视器
//!
//! 后台线程循环调用轮询原语，把设备主动上报的数据转发给 sink。
//! 停止是协作式的：置位停止标志，再有界地等待线程退出。

use crate::client::Shared;
use crate::error::ClientError;
use crate::queue::AsyncFrame;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, warn};

/// 异步帧回调
pub type AsyncCallback = Arc<dyn Fn(AsyncFrame) + Send + Sync>;

/// 异步数据的去向
#[derive(Clone)]
pub enum AsyncSink {
    /// 放入客户端的异步队列，由 `drain_async_queue` 取出
    Queue,
    /// 发送到 crossbeam 通道
    Channel(Sender<AsyncFrame>),
    /// 在监视器线程中调用回调（不持有链路锁）
    Callback(AsyncCallback),
}

impl AsyncSink {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(AsyncFrame) + Send + Sync + 'static,
    {
        AsyncSink::Callback(Arc::new(f))
    }
}

impl fmt::Debug for AsyncSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncSink::Queue => f.write_str("Queue"),
            AsyncSink::Channel(_) => f.write_str("Channel"),
            AsyncSink::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// 运行中的异步监视器
pub(crate) struct AsyncMonitor {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    /// 线程退出（包括 panic）时断开
    exited: Receiver<()>,
    shared: Arc<Shared>,
    sink: AsyncSink,
}

impl AsyncMonitor {
    pub(crate) fn spawn(shared: Arc<Shared>, sink: AsyncSink) -> Result<Self, ClientError> {
        let (live, callback) = match &sink {
            AsyncSink::Queue => (None, None),
            AsyncSink::Channel(tx) => (Some(tx.clone()), None),
            AsyncSink::Callback(cb) => {
                let (tx, rx) = crossbeam_channel::unbounded();
                (Some(tx), Some((rx, cb.clone())))
            },
        };
        shared.set_live_sink(live);

        let stop = Arc::new(AtomicBool::new(false));
        let (exit_tx, exited) = crossbeam_channel::bounded::<()>(0);
        let handle = {
            let thread_shared = shared.clone();
            let thread_stop = stop.clone();
            std::thread::Builder::new()
                .name("bpio-async-monitor".to_string())
                .spawn(move || {
                    let _exit = exit_tx;
                    monitor_loop(&thread_shared, &thread_stop, callback)
                })
                .map_err(|e| {
                    shared.set_live_sink(None);
                    ClientError::Monitor(format!("failed to spawn monitor thread: {e}"))
                })?
        };
        debug!("Async monitor started ({:?})", sink);

        Ok(Self {
            stop,
            handle: Some(handle),
            exited,
            shared,
            sink,
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 停止并有界地等待线程退出，返回原 sink 以便之后重新启动
    ///
    /// 超时返回错误时监视器保持可再次等待的状态。停止后到达的异步帧进入异步队列。
    pub(crate) fn stop(&mut self, timeout: Duration) -> Result<AsyncSink, ClientError> {
        self.stop.store(true, Ordering::Release);
        self.shared.set_live_sink(None);

        if let Err(RecvTimeoutError::Timeout) = self.exited.recv_timeout(timeout) {
            let message = format!("monitor thread did not exit within {timeout:?}");
            error!("{}", message);
            return Err(ClientError::Monitor(message));
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Async monitor thread panicked");
        }
        debug!("Async monitor stopped");
        Ok(self.sink.clone())
    }
}

impl Drop for AsyncMonitor {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

fn monitor_loop(
    shared: &Shared,
    stop: &AtomicBool,
    callback: Option<(Receiver<AsyncFrame>, AsyncCallback)>,
) {
    let poll_timeout = shared.config().poll_timeout();
    let poll_interval = shared.config().poll_interval();

    while !stop.load(Ordering::Acquire) {
        match shared.pump(poll_timeout) {
            Ok(_) => {},
            Err(ClientError::Closed) => break,
            Err(e) if shared.is_failed() || shared.is_closed() => {
                error!("Async monitor exiting: {}", e);
                break;
            },
            Err(e) => warn!("Async poll failed: {}", e),
        }

        if let Some((rx, cb)) = &callback {
            dispatch(rx, cb);
        }

        if stop.load(Ordering::Acquire) {
            break;
        }
        std::thread::sleep(poll_interval);
    }

    // 停止前已经转发到内部通道的帧仍交给回调
    if let Some((rx, cb)) = &callback {
        dispatch(rx, cb);
    }
}

fn dispatch(rx: &Receiver<AsyncFrame>, cb: &AsyncCallback) {
    while let Ok(frame) = rx.try_recv() {
        cb(frame);
    }
}
