use crate::client::ApiClient;
use clinica_error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// 角色构建器里的一个可选权限
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermisoOpcion {
    pub id_permiso: u32,
    pub nombre_permiso: String,
    #[serde(default)]
    pub seleccionado: bool,
}

/// 角色构建器里的一个可选模块及其权限
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuloOpcion {
    pub id_modulo: u32,
    pub nombre_modulo: String,
    #[serde(default)]
    pub seleccionado: bool,
    #[serde(default)]
    pub permisos: Vec<PermisoOpcion>,
}

/// 新角色要关联的模块权限
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuloPermisoData {
    pub id_modulo: u32,
    pub permisos: Vec<u32>,
}

/// 创建角色的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrearRolData {
    pub nombre_rol: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub modulos_permisos: Vec<ModuloPermisoData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrearRolResponse {
    pub resultado: String,
    pub id_rol: u32,
}

/// 已注册的角色
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rol {
    pub id_rol: u32,
    pub nombre_rol: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

impl ApiClient {
    /// 获取可配置的模块/权限清单（角色构建器用）
    pub async fn obtener_modulos_y_permisos(&self) -> Result<Vec<ModuloOpcion>> {
        let value = self
            .request(Method::GET, "modulos-permisos/", None, None)
            .await?;
        Self::parse(Self::unwrap_resultado(value))
    }

    /// 创建角色并关联模块权限
    pub async fn crear_rol_con_permisos(&self, data: &CrearRolData) -> Result<CrearRolResponse> {
        let body = serde_json::to_value(data)?;
        let value = self
            .request(Method::POST, "roles/crear-con-permisos", Some(&body), None)
            .await?;
        Self::parse(value)
    }

    /// 获取全部角色
    ///
    /// 声明的静默降级路径：失败记日志并返回空列表，不上抛。
    pub async fn obtener_roles(&self) -> Vec<Rol> {
        match self.obtener_roles_estricto().await {
            Ok(roles) => roles,
            Err(e) => {
                e.log("roles", "obtener_roles");
                Vec::new()
            }
        }
    }

    /// `obtener_roles` 的严格版本，组合档案的子请求用
    pub(crate) async fn obtener_roles_estricto(&self) -> Result<Vec<Rol>> {
        let value = self.request(Method::GET, "roles/roles", None, None).await?;
        Self::parse(Self::unwrap_resultado(value))
    }
}
