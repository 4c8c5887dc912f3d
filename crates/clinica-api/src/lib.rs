pub mod auth;
pub mod client;
pub mod config;
pub mod modulos;
pub mod roles;
pub mod users;

// 重新导出核心类型
pub use auth::LoginResponse;
pub use client::ApiClient;
pub use config::ApiConfig;
pub use roles::{CrearRolData, CrearRolResponse, ModuloOpcion, ModuloPermisoData, PermisoOpcion, Rol};
pub use users::{DatosUsuario, MissingReason, NuevoUsuario, Perfil, RolResumen, Usuario};

// 错误类型
pub use clinica_error::{ClinicaError, Result};
