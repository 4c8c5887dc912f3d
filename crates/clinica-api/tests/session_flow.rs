//! 会话端到端流程：登录 → 权限目录 → 闲置登出 → 恢复

use clinica_api::{ApiClient, ApiConfig};
use clinica_auth::fake::{expired_token, fake_token};
use clinica_auth::{MemoryStorage, PermissionCatalog, RouteTable, SessionStorage, SessionStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_backend(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": token})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rol-permisos/modulos-usuario/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultado": [{
                "id_modulo": 1,
                "nombre_modulo": "Usuarios",
                "icono": "user",
                "url": "/admin/usuarios",
                "funcionalidades": [
                    {"id_modulo_permiso": 10, "nombre_funcionalidad": "Crear", "permiso": "crear"},
                    {"id_modulo_permiso": 11, "nombre_funcionalidad": "Eliminar", "permiso": "Eliminar"}
                ]
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_session_lifecycle() {
    let server = MockServer::start().await;
    let token = fake_token("vale", 1, 3600);
    mount_backend(&server, &token).await;

    let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
    let session = SessionStore::new(Some(Arc::clone(&storage)));
    let client = ApiClient::new(ApiConfig::new(server.uri()), Arc::clone(&session));
    let catalog = PermissionCatalog::new();
    let routes = RouteTable::default();

    let payload = client.sign_in("vale", "secreta", &catalog).await.unwrap();
    assert_eq!(payload.rol, 1);
    assert!(session.logged_in().await);

    // 权限查询忽略大小写
    assert!(catalog.has_feature("USUARIOS", "CREAR").await);
    assert!(catalog.has_feature("usuarios", "eliminar").await);
    assert!(!catalog.has_module_access("citas").await);

    // 路由守卫用解码出的角色查表
    assert!(routes.is_allowed(payload.rol, "/admin/usuarios"));
    assert!(!routes.is_allowed(payload.rol, "/medico"));

    // 页面刷新：新的存储读取恢复同一会话
    let restored = SessionStore::new(Some(Arc::clone(&storage)));
    restored.init().await;
    assert!(restored.logged_in().await);
    assert_eq!(restored.role_id().await, Some(1));

    client.sign_out(&catalog).await;
    assert!(!session.logged_in().await);
    assert!(catalog.modules().await.is_empty());
    assert!(storage.get("token").is_none());
}

#[tokio::test]
async fn expired_persisted_token_is_not_restored() {
    let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
    storage.set("token", &expired_token("carlos", 3));

    let session = SessionStore::new(Some(Arc::clone(&storage)));
    session.init().await;

    assert!(!session.logged_in().await);
    assert!(storage.get("token").is_none());
}

#[tokio::test(start_paused = true)]
async fn idle_timeout_forces_single_logout() {
    let session = SessionStore::with_window(
        Some(Arc::new(MemoryStorage::new())),
        Duration::from_secs(120),
    );

    session.login(&fake_token("vale", 1, 3600)).await.unwrap();
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    // 活动让会话存活过一个窗口
    tokio::time::advance(Duration::from_secs(100)).await;
    session.record_activity();
    tokio::time::advance(Duration::from_secs(100)).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert!(session.logged_in().await);

    // 之后无活动 → 强制登出
    tokio::time::advance(Duration::from_secs(121)).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert!(!session.logged_in().await);
    assert!(!session.monitor().is_armed());
}
