//! 异步数据队列

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Instant;

/// 设备主动上报的一帧数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncFrame {
    /// 到达序号（客户端内单调递增）
    pub seq: u64,
    pub data: Vec<u8>,
    /// 主机接收时间
    pub received_at: Instant,
}

/// 按到达顺序缓存的异步帧
///
/// 独立于链路锁：追加与取出可以和其他线程的链路 IO 并发进行。
#[derive(Debug, Default)]
pub struct AsyncQueue {
    frames: Mutex<VecDeque<AsyncFrame>>,
}

impl AsyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, frame: AsyncFrame) {
        self.frames.lock().push_back(frame);
    }

    /// 原子地取出全部帧（按到达顺序）
    pub fn drain(&self) -> Vec<AsyncFrame> {
        let mut frames = self.frames.lock();
        frames.drain(..).collect()
    }

    pub fn clear(&self) {
        self.frames.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }
}
