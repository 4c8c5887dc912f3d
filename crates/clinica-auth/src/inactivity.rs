use once_cell::sync::Lazy;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// 默认闲置窗口：30分钟
pub const DEFAULT_IDLE_SECS: u64 = 30 * 60;

/// 闲置窗口，可通过 CLINICA_IDLE_SECS 覆盖
pub static IDLE_WINDOW: Lazy<Duration> = Lazy::new(|| {
    let secs = std::env::var("CLINICA_IDLE_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_IDLE_SECS);
    Duration::from_secs(secs)
});

/// 闲置监视器
///
/// 单个截止时间定时任务：UI 层把用户活动事件（指针移动、按键、点击）
/// 转发到 `record_activity`，任务在截止时间醒来检查最近活动；窗口内
/// 无任何活动则触发一次超时回调。每个进程只有一个定时任务，重新
/// `start` 会先取消旧任务，不会重复注册。
pub struct InactivityMonitor {
    window: Duration,
    last_activity: Arc<Mutex<Instant>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl InactivityMonitor {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_activity: Arc::new(Mutex::new(Instant::now())),
            task: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 记录一次用户活动，重置截止时间
    pub fn record_activity(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Instant::now();
        }
    }

    /// 启动监视任务
    ///
    /// 已有任务会被先取消（不允许重叠）。`on_timeout` 在截止时间
    /// 无活动地到期时恰好执行一次。
    pub fn start<F, Fut>(&self, on_timeout: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        self.record_activity();

        let window = self.window;
        let last_activity = Arc::clone(&self.last_activity);

        let mut guard = match self.task.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(prior) = guard.take() {
            prior.abort();
        }

        let handle = tokio::spawn(async move {
            loop {
                let deadline = {
                    let last = match last_activity.lock() {
                        Ok(l) => *l,
                        Err(poisoned) => *poisoned.into_inner(),
                    };
                    last + window
                };
                tokio::time::sleep_until(deadline).await;

                let idle = {
                    let last = match last_activity.lock() {
                        Ok(l) => *l,
                        Err(poisoned) => *poisoned.into_inner(),
                    };
                    last.elapsed()
                };
                if idle >= window {
                    break;
                }
                // 截止前有活动，按新的活动时间重新计时
            }
            debug!(idle_secs = window.as_secs(), "闲置窗口到期");
            on_timeout().await;
        });

        *guard = Some(handle);
    }

    /// 停止监视任务；除 logout 外没有其他取消路径
    pub fn stop(&self) {
        let mut guard = match self.task.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }

    /// 当前是否有存活的监视任务
    pub fn is_armed(&self) -> bool {
        self.task
            .lock()
            .map(|g| g.as_ref().map(|h| !h.is_finished()).unwrap_or(false))
            .unwrap_or(false)
    }
}

impl Drop for InactivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
