use std::collections::HashMap;

/// 按角色的路由白名单
///
/// 静态配置：角色 id → 允许的路径前缀序列。启动时构建一次，之后
/// 只读，路由守卫在每次导航时查询。未知角色一律拒绝。
///
/// 匹配规则是显式的路径段边界前缀：`path` 等于前缀本身，或以
/// `前缀/` 开头。`/admin` 允许 `/admin/usuarios` 但不允许
/// `/administracion`。
pub struct RouteTable {
    allowed: HashMap<u32, Vec<String>>,
}

impl RouteTable {
    pub fn new<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, P)>,
        P: IntoIterator<Item = &'static str>,
    {
        let allowed = entries
            .into_iter()
            .map(|(rol, prefixes)| {
                (
                    rol,
                    prefixes.into_iter().map(Self::normalize).collect(),
                )
            })
            .collect();
        Self { allowed }
    }

    // 前缀统一带前导斜杠、去掉尾部斜杠
    fn normalize(prefix: &str) -> String {
        let trimmed = prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            return "/".to_string();
        }
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// 角色是否可以访问路径
    pub fn is_allowed(&self, rol: u32, path: &str) -> bool {
        let Some(prefixes) = self.allowed.get(&rol) else {
            return false;
        };
        prefixes.iter().any(|prefix| {
            if prefix == "/" {
                return true;
            }
            path == prefix || path.starts_with(&format!("{}/", prefix))
        })
    }

    pub fn prefixes_for(&self, rol: u32) -> &[String] {
        self.allowed.get(&rol).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for RouteTable {
    /// 诊所面板的角色表：1/2 = administración, 3 = médico
    fn default() -> Self {
        Self::new([
            (1, vec!["/admin", "/admin/usuarios", "/admin/permisos", "/admin/perfil"]),
            (2, vec!["/admin", "/admin/usuarios", "/admin/permisos", "/admin/perfil"]),
            (3, vec!["/medico"]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_is_denied() {
        let table = RouteTable::new([(1, vec!["/admin"]), (3, vec!["/medico"])]);

        assert!(!table.is_allowed(2, "/admin"));
        assert!(!table.is_allowed(99, "/medico"));
        assert!(!table.is_allowed(99, "/"));
    }

    #[test]
    fn test_prefix_matches_at_segment_boundary() {
        let table = RouteTable::new([(1, vec!["/admin"]), (3, vec!["/medico"])]);

        assert!(table.is_allowed(1, "/admin"));
        assert!(table.is_allowed(1, "/admin/usuarios"));
        assert!(table.is_allowed(1, "/admin/usuarios/42"));
        // 不是段边界
        assert!(!table.is_allowed(1, "/administracion"));
        assert!(!table.is_allowed(1, "/medico"));
        assert!(table.is_allowed(3, "/medico"));
    }

    #[test]
    fn test_prefixes_are_normalized() {
        // 配置里漏了前导斜杠或多了尾部斜杠也能匹配
        let table = RouteTable::new([(1, vec!["admin/perfil", "/admin/usuarios/"])]);

        assert!(table.is_allowed(1, "/admin/perfil"));
        assert!(table.is_allowed(1, "/admin/usuarios"));
        assert!(table.is_allowed(1, "/admin/usuarios/42"));
        assert!(!table.is_allowed(1, "/admin"));
    }

    #[test]
    fn test_default_clinic_table() {
        let table = RouteTable::default();

        assert!(table.is_allowed(1, "/admin/permisos"));
        assert!(table.is_allowed(2, "/admin/perfil"));
        assert!(table.is_allowed(3, "/medico"));
        assert!(!table.is_allowed(3, "/admin"));
        assert!(!table.is_allowed(4, "/medico"));
    }
}
