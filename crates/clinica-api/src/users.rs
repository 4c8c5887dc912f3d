use crate::client::ApiClient;
use clinica_error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

fn default_true() -> bool {
    true
}

/// 用户列表条目（后端字段名）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    #[serde(default)]
    pub id_usuario: Option<u32>,
    pub usuario: String,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellido: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub id_rol: Option<u32>,
    #[serde(default = "default_true")]
    pub estado: bool,
}

/// 创建用户的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NuevoUsuario {
    pub usuario: String,
    pub contrasena: String,
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub tipo_documento: Option<String>,
    #[serde(default)]
    pub numero_documento: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub fecha_nacimiento: Option<String>,
    #[serde(default)]
    pub sexo: Option<String>,
    pub id_rol: u32,
    #[serde(default = "default_true")]
    pub estado: bool,
}

impl NuevoUsuario {
    // 文本字段去掉首尾空白，与后端约定的载荷格式对齐
    fn normalized(&self) -> Self {
        let mut n = self.clone();
        n.usuario = n.usuario.trim().to_string();
        n.nombre = n.nombre.trim().to_string();
        n.apellido = n.apellido.trim().to_string();
        n
    }
}

/// 单个用户的基本数据（后端返回 nombre/correo）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatosUsuario {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub correo: String,
    #[serde(default)]
    pub id_rol: Option<u32>,
}

/// 角色信息摘要（组合档案里的尽力字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolResumen {
    pub id_rol: u32,
    pub nombre_rol: String,
}

/// 组合档案里尽力子请求缺失的原因码
///
/// 缺失字段显式携带原因，而不是静默为空。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// 子请求失败（已记日志）
    RequestFailed,
    /// 请求成功但没有匹配条目
    NotFound,
}

/// 组合档案：用户基本数据 + 尽力获取的角色信息
#[derive(Debug, Clone)]
pub struct Perfil {
    pub nombre: String,
    pub correo: String,
    pub rol: Option<RolResumen>,
    /// `rol` 为 None 时的原因
    pub rol_omitido: Option<MissingReason>,
}

impl ApiClient {
    /// 获取全部用户（认证端点，resultado 信封）
    pub async fn fetch_usuarios(&self) -> Result<Vec<Usuario>> {
        let token = self.bearer_token("fetch_usuarios").await?;
        let value = self
            .request(Method::GET, "usuarios", None, Some(&token))
            .await?;
        Self::parse(Self::unwrap_resultado(value))
    }

    /// 按 id 获取单个用户的基本数据
    pub async fn fetch_user_by_id(&self, user_id: u32) -> Result<DatosUsuario> {
        let token = self.bearer_token("fetch_user_by_id").await?;
        let value = self
            .request(
                Method::GET,
                &format!("usuarios/{}", user_id),
                None,
                Some(&token),
            )
            .await?;
        Self::parse(value)
    }

    /// 创建用户
    pub async fn crear_usuario(&self, usuario: &NuevoUsuario) -> Result<Usuario> {
        let token = self.bearer_token("crear_usuario").await?;
        let body = serde_json::to_value(usuario.normalized())?;
        let value = self
            .request(Method::POST, "usuarios", Some(&body), Some(&token))
            .await?;
        Self::parse(Self::unwrap_resultado(value))
    }

    /// 部分更新用户（PATCH，只发送要改的字段）
    pub async fn actualizar_usuario(
        &self,
        user_id: u32,
        cambios: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let token = self.bearer_token("actualizar_usuario").await?;
        self.request(
            Method::PATCH,
            &format!("usuarios/{}", user_id),
            Some(cambios),
            Some(&token),
        )
        .await
    }

    /// 激活/停用用户
    pub async fn cambiar_estado_usuario(
        &self,
        user_id: u32,
        estado: bool,
    ) -> Result<serde_json::Value> {
        let token = self.bearer_token("cambiar_estado_usuario").await?;
        let body = json!({ "estado": estado });
        self.request(
            Method::PUT,
            &format!("usuarios/{}/estado", user_id),
            Some(&body),
            Some(&token),
        )
        .await
    }

    /// 组合档案获取
    ///
    /// 用户基本数据失败则整体失败；角色信息是声明的静默降级子请求，
    /// 失败或无匹配时字段为 None 并带原因码。
    pub async fn fetch_perfil(&self, user_id: u32) -> Result<Perfil> {
        let datos = self.fetch_user_by_id(user_id).await?;

        let (rol, rol_omitido) = match datos.id_rol {
            None => (None, Some(MissingReason::NotFound)),
            Some(id_rol) => match self.obtener_roles_estricto().await {
                Ok(roles) => match roles.into_iter().find(|r| r.id_rol == id_rol) {
                    Some(r) => (
                        Some(RolResumen {
                            id_rol: r.id_rol,
                            nombre_rol: r.nombre_rol,
                        }),
                        None,
                    ),
                    None => (None, Some(MissingReason::NotFound)),
                },
                Err(e) => {
                    e.log("users", "fetch_perfil/roles");
                    warn!(user_id, "rol omitido en el perfil");
                    (None, Some(MissingReason::RequestFailed))
                }
            },
        };

        Ok(Perfil {
            nombre: datos.nombre,
            correo: datos.correo,
            rol,
            rol_omitido,
        })
    }
}
