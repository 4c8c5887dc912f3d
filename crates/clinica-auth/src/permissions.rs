use async_trait::async_trait;
use clinica_error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// 模块内的一项功能（例如 'crear', 'actualizar', 'consultar'）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funcionalidad {
    pub id_modulo_permiso: u32,
    pub nombre_funcionalidad: String,
    pub permiso: String,
}

/// 当前角色可见的一个功能模块（例如 'Usuarios'）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modulo {
    pub id_modulo: u32,
    pub nombre_modulo: String,
    #[serde(default)]
    pub icono: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub funcionalidades: Vec<Funcionalidad>,
}

/// 权限目录的数据来源（由 API 层实现）
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn modules_for_role(&self, rol: u32) -> Result<Vec<Modulo>>;
}

/// 权限目录存储
///
/// 保存当前角色可见的模块/功能列表，每次成功加载整体替换。目录很小
/// （几十条），查找都是线性扫描，模块名和权限名比较一律忽略大小写。
///
/// 世代计数器守护加载：`clear` 和每次加载都会推进世代，迟到的响应
/// （例如登出后才返回的预登出请求）因世代过期而被丢弃，不会复活权限。
pub struct PermissionCatalog {
    modules: RwLock<Vec<Modulo>>,
    generation: AtomicU64,
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionCatalog {
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// 加载指定角色的权限目录
    ///
    /// 从不向调用方抛错：任何失败（网络错误、非 2xx 响应）记日志并把
    /// 目录置空，降级为"无权限"。
    pub async fn load_for_role(&self, source: &dyn CatalogSource, rol: u32) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match source.modules_for_role(rol).await {
            Ok(modules) => {
                if self.generation.load(Ordering::SeqCst) != generation {
                    warn!(rol, "respuesta de permisos tardía, descartada");
                    return;
                }
                info!(rol, modulos = modules.len(), "permisos cargados");
                *self.modules.write().await = modules;
            }
            Err(e) => {
                e.log("permissions", "load_for_role");
                if self.generation.load(Ordering::SeqCst) == generation {
                    *self.modules.write().await = Vec::new();
                }
            }
        }
    }

    /// 清空目录（登出时调用）
    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.modules.write().await = Vec::new();
    }

    /// 指定模块里是否有指定权限（两个参数都忽略大小写）
    pub async fn has_feature(&self, nombre_modulo: &str, permiso: &str) -> bool {
        let modules = self.modules.read().await;
        modules
            .iter()
            .find(|m| m.nombre_modulo.to_lowercase() == nombre_modulo.to_lowercase())
            .map(|m| {
                m.funcionalidades
                    .iter()
                    .any(|f| f.permiso.to_lowercase() == permiso.to_lowercase())
            })
            .unwrap_or(false)
    }

    /// 是否有指定模块的访问权（出现在目录里即可）
    pub async fn has_module_access(&self, nombre_modulo: &str) -> bool {
        let modules = self.modules.read().await;
        modules
            .iter()
            .any(|m| m.nombre_modulo.to_lowercase() == nombre_modulo.to_lowercase())
    }

    /// 指定模块的所有功能，无匹配返回空
    pub async fn features_of(&self, nombre_modulo: &str) -> Vec<Funcionalidad> {
        let modules = self.modules.read().await;
        modules
            .iter()
            .find(|m| m.nombre_modulo.to_lowercase() == nombre_modulo.to_lowercase())
            .map(|m| m.funcionalidades.clone())
            .unwrap_or_default()
    }

    /// 全局去重后的权限名集合（统一小写）
    pub async fn unique_permission_names(&self) -> HashSet<String> {
        let modules = self.modules.read().await;
        modules
            .iter()
            .flat_map(|m| m.funcionalidades.iter())
            .map(|f| f.permiso.to_lowercase())
            .collect()
    }

    /// 按模块分组的权限名（统一小写）
    pub async fn permissions_by_module(&self) -> HashMap<String, Vec<String>> {
        let modules = self.modules.read().await;
        modules
            .iter()
            .map(|m| {
                (
                    m.nombre_modulo.clone(),
                    m.funcionalidades
                        .iter()
                        .map(|f| f.permiso.to_lowercase())
                        .collect(),
                )
            })
            .collect()
    }

    /// 当前目录快照（菜单渲染用）
    pub async fn modules(&self) -> Vec<Modulo> {
        self.modules.read().await.clone()
    }
}
