use crate::client::ApiClient;
use async_trait::async_trait;
use clinica_auth::{CatalogSource, Modulo};
use clinica_error::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::warn;

/// 权限目录的数据来源实现
///
/// 成功但没有 resultado 字段的响应按空目录处理；传输层和非 2xx
/// 的失败上抛，由 `PermissionCatalog::load_for_role` 统一降级。
#[async_trait]
impl CatalogSource for ApiClient {
    async fn modules_for_role(&self, rol: u32) -> Result<Vec<Modulo>> {
        let value = self
            .request(
                Method::GET,
                &format!("rol-permisos/modulos-usuario/{}", rol),
                None,
                None,
            )
            .await?;

        match value {
            Value::Object(ref map) if map.contains_key("resultado") => {
                Self::parse(Self::unwrap_resultado(value))
            }
            _ => {
                warn!(rol, "respuesta sin resultado, catálogo vacío");
                Ok(Vec::new())
            }
        }
    }
}
