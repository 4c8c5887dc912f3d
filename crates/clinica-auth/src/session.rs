use crate::inactivity::{InactivityMonitor, IDLE_WINDOW};
use crate::token::{self, TokenPayload};
use clinica_error::{ClinicaError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

const TOKEN_KEY: &str = "token";

/// 会话令牌的持久化作用域
///
/// 浏览器环境对应 sessionStorage（页面刷新后存活，跨进程不存活）；
/// 没有持久化作用域的环境（如服务端渲染）传 `None`，`init` 变成空操作。
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// 进程内存实现，用于测试和无浏览器环境的演示
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<std::collections::HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
    }
}

/// 会话状态
///
/// 不变式：`logged_in == true` 当且仅当 token 和 payload 都存在
/// 且 payload 未过期。
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub token: Option<String>,
    pub payload: Option<TokenPayload>,
    pub logged_in: bool,
}

type ForcedLogoutHook = Arc<dyn Fn() + Send + Sync>;

/// 会话状态存储
///
/// 进程级单一状态：`login`/`logout`/`init` 互相原子（单把写锁，
/// 方法内不交错）。通过 `Arc` 共享给各组件和处理器。
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Option<Arc<dyn SessionStorage>>,
    monitor: InactivityMonitor,
    on_forced_logout: Mutex<Option<ForcedLogoutHook>>,
}

impl SessionStore {
    pub fn new(storage: Option<Arc<dyn SessionStorage>>) -> Arc<Self> {
        Self::with_window(storage, *IDLE_WINDOW)
    }

    pub fn with_window(storage: Option<Arc<dyn SessionStorage>>, window: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(SessionState::default()),
            storage,
            monitor: InactivityMonitor::new(window),
            on_forced_logout: Mutex::new(None),
        })
    }

    /// 注册闲置强制登出后的回调（跳转到匿名落地路由）
    pub fn on_forced_logout(&self, hook: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut guard) = self.on_forced_logout.lock() {
            *guard = Some(Arc::new(hook));
        }
    }

    /// 登录
    ///
    /// 令牌解码失败或已过期返回 `InvalidToken`，状态不变。成功时
    /// 持久化令牌、置为已登录并（重新）启动闲置监视器。
    pub async fn login(self: &Arc<Self>, token: &str) -> Result<()> {
        let payload = token::decode(token).map_err(|e| ClinicaError::InvalidToken {
            message: e.to_string(),
        })?;
        if payload.is_expired() {
            return Err(ClinicaError::InvalidToken {
                message: "Token expirado".to_string(),
            });
        }

        if let Some(storage) = &self.storage {
            storage.set(TOKEN_KEY, token);
        }

        *self.state.write().await = SessionState {
            token: Some(token.to_string()),
            payload: Some(payload),
            logged_in: true,
        };

        self.arm_monitor();
        info!("sesión iniciada");
        Ok(())
    }

    /// 登出
    ///
    /// 清除持久化令牌、重置状态、停止闲置监视器。幂等，未登录时
    /// 调用无副作用。
    pub async fn logout(&self) {
        if let Some(storage) = &self.storage {
            storage.remove(TOKEN_KEY);
        }
        *self.state.write().await = SessionState::default();
        self.monitor.stop();
    }

    /// 进程启动时从持久化作用域恢复会话
    ///
    /// 无持久化作用域时是空操作。持久化令牌解码失败或已过期时清除
    /// 存储并保持匿名状态。
    pub async fn init(self: &Arc<Self>) {
        let Some(storage) = &self.storage else {
            return;
        };
        let Some(token) = storage.get(TOKEN_KEY) else {
            return;
        };

        match token::decode(&token) {
            Ok(payload) if !payload.is_expired() => {
                *self.state.write().await = SessionState {
                    token: Some(token),
                    payload: Some(payload),
                    logged_in: true,
                };
                self.arm_monitor();
                info!("sesión restaurada");
            }
            Ok(_) => {
                warn!("token persistido expirado, se descarta");
                storage.remove(TOKEN_KEY);
                *self.state.write().await = SessionState::default();
            }
            Err(e) => {
                e.log("session", "init");
                storage.remove(TOKEN_KEY);
                *self.state.write().await = SessionState::default();
            }
        }
    }

    /// 当前状态快照
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn role_id(&self) -> Option<u32> {
        self.state.read().await.payload.as_ref().map(|p| p.rol)
    }

    pub async fn logged_in(&self) -> bool {
        self.state.read().await.logged_in
    }

    /// UI 层转发用户活动事件（指针移动、按键、点击）
    pub fn record_activity(&self) {
        self.monitor.record_activity();
    }

    pub fn monitor(&self) -> &InactivityMonitor {
        &self.monitor
    }

    fn arm_monitor(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.monitor.start(move || async move {
            let Some(store) = weak.upgrade() else {
                return;
            };
            warn!("sesión cerrada por inactividad");
            store.logout().await;
            let hook = store
                .on_forced_logout
                .lock()
                .ok()
                .and_then(|guard| guard.clone());
            if let Some(hook) = hook {
                hook();
            }
        });
    }
}
