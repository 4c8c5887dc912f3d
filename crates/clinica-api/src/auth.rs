use crate::client::ApiClient;
use clinica_auth::{PermissionCatalog, TokenPayload};
use clinica_error::{ClinicaError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// 登录响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl ApiClient {
    /// 登录（未认证端点）
    ///
    /// 常见失败按后端 UX 契约映射为西班牙语文案；2xx 响应缺少
    /// access_token 也视为错误。
    pub async fn login(&self, usuario: &str, contrasena: &str) -> Result<LoginResponse> {
        let body = json!({ "usuario": usuario, "contrasena": contrasena });

        let value = self
            .request(Method::POST, "login", Some(&body), None)
            .await
            .map_err(|e| match e {
                ClinicaError::Request { status: 401, .. } => ClinicaError::Request {
                    status: 401,
                    message: "Contraseña incorrecta".to_string(),
                },
                ClinicaError::Request { status: 403, .. } => ClinicaError::Request {
                    status: 403,
                    message: "Usuario inactivo".to_string(),
                },
                ClinicaError::Request { status: 404, .. } => ClinicaError::Request {
                    status: 404,
                    message: "Usuario no encontrado".to_string(),
                },
                other => other,
            })?;

        let resp: LoginResponse =
            Self::parse(value).map_err(|_| ClinicaError::Internal {
                message: "El servidor no devolvio un token valido".to_string(),
                details: None,
            })?;
        if resp.access_token.is_empty() {
            return Err(ClinicaError::Internal {
                message: "El servidor no devolvio un token valido".to_string(),
                details: None,
            });
        }

        Ok(resp)
    }

    /// 登录组合流程：登录 → 建立会话 → 加载解码角色的权限目录
    ///
    /// 权限加载是声明的静默降级路径，失败不影响已建立的会话。
    pub async fn sign_in(
        &self,
        usuario: &str,
        contrasena: &str,
        catalog: &PermissionCatalog,
    ) -> Result<TokenPayload> {
        let resp = self.login(usuario, contrasena).await?;
        self.session().login(&resp.access_token).await?;

        let snapshot = self.session().snapshot().await;
        let payload = snapshot.payload.ok_or_else(|| ClinicaError::Internal {
            message: "sesión sin payload tras login".to_string(),
            details: None,
        })?;

        catalog.load_for_role(self, payload.rol).await;
        info!(usuario, rol = payload.rol, "sesión establecida");

        Ok(payload)
    }

    /// 登出组合流程：清会话 + 清权限目录
    pub async fn sign_out(&self, catalog: &PermissionCatalog) {
        self.session().logout().await;
        catalog.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use clinica_auth::fake::fake_token;
    use clinica_auth::SessionStore;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(uri: &str) -> ApiClient {
        ApiClient::new(ApiConfig::new(uri), SessionStore::new(None))
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let server = MockServer::start().await;
        let token = fake_token("vale", 1, 3600);
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(
                serde_json::json!({"usuario": "vale", "contrasena": "secreta"}),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": token})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let resp = client.login("vale", "secreta").await.unwrap();
        assert_eq!(resp.access_token, token);
    }

    #[tokio::test]
    async fn test_login_maps_status_to_spanish_messages() {
        for (status, expected) in [
            (401, "Contraseña incorrecta"),
            (403, "Usuario inactivo"),
            (404, "Usuario no encontrado"),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/login"))
                .respond_with(
                    ResponseTemplate::new(status)
                        .set_body_json(serde_json::json!({"detail": "detalle del backend"})),
                )
                .mount(&server)
                .await;

            let client = client_for(&server.uri());
            let err = client.login("vale", "x").await.unwrap_err();
            assert!(
                matches!(err, ClinicaError::Request { status: s, ref message } if s == status && message == expected)
            );
        }
    }

    #[tokio::test]
    async fn test_login_rejects_response_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.login("vale", "secreta").await.unwrap_err();
        assert!(matches!(err, ClinicaError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_sign_in_establishes_session_and_catalog() {
        let server = MockServer::start().await;
        let token = fake_token("vale", 1, 3600);
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": token})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rol-permisos/modulos-usuario/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "resultado": [{
                    "id_modulo": 1,
                    "nombre_modulo": "Usuarios",
                    "icono": "user",
                    "url": "/admin/usuarios",
                    "funcionalidades": [
                        {"id_modulo_permiso": 10, "nombre_funcionalidad": "Crear", "permiso": "crear"}
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let catalog = PermissionCatalog::new();

        let payload = client.sign_in("vale", "secreta", &catalog).await.unwrap();
        assert_eq!(payload.rol, 1);
        assert!(client.session().logged_in().await);
        assert!(catalog.has_feature("usuarios", "CREAR").await);

        client.sign_out(&catalog).await;
        assert!(!client.session().logged_in().await);
        assert!(!catalog.has_module_access("usuarios").await);
    }
}
