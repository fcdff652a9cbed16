//! 协作式取消: 由调用方显式传入探索过程, 在每次迁移发生前检查.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 共享的取消标志, 克隆体观察同一个标志.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消, 正在运行的探索在下一个检查点停止.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
