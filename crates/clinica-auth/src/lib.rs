pub mod fake;
pub mod inactivity;
pub mod permissions;
pub mod routes;
pub mod session;
pub mod token;

// 重新导出核心类型
pub use inactivity::InactivityMonitor;
pub use permissions::{CatalogSource, Funcionalidad, Modulo, PermissionCatalog};
pub use routes::RouteTable;
pub use session::{MemoryStorage, SessionState, SessionStorage, SessionStore};
pub use token::TokenPayload;

// 错误类型
pub use clinica_error::{ClinicaError, Result};
