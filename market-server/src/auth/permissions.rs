//! Route access policy
//!
//! 每个路由声明一个 [`Access`]，处理器在调用引擎前执行 [`authorize`]。
//! 引擎本身从不检查角色。

use shared::models::Role;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::security_log;

/// 路由所需能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(&'static [Role]),
}

impl Access {
    pub const ADMIN: Access = Access::Role(&[Role::Admin]);
    pub const SELLER: Access = Access::Role(&[Role::Seller]);
    pub const CUSTOMER: Access = Access::Role(&[Role::Customer]);
}

/// 能力检查
///
/// | 情况 | 结果 |
/// |------|------|
/// | Public | 总是通过 |
/// | 无用户 | NotAuthenticated (401) |
/// | 角色不在列表 | PermissionDenied (403) |
pub fn authorize(user: Option<&CurrentUser>, access: Access) -> Result<(), AppError> {
    let roles = match access {
        Access::Public => return Ok(()),
        Access::Authenticated => None,
        Access::Role(roles) => Some(roles),
    };

    let user = user.ok_or_else(AppError::not_authenticated)?;
    match roles {
        Some(roles) if !user.has_role(roles) => {
            security_log!(
                "WARN",
                "permission_denied",
                user_id = user.id.clone(),
                user_role = user.role.as_str(),
                required = format!("{:?}", roles)
            );
            Err(AppError::forbidden(format!(
                "Requires role: {}",
                roles.iter().map(Role::as_str).collect::<Vec<_>>().join(" | ")
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: "u-1".into(),
            name: "u".into(),
            role,
        }
    }

    #[test]
    fn test_public_needs_nothing() {
        assert!(authorize(None, Access::Public).is_ok());
    }

    #[test]
    fn test_authenticated_accepts_any_role() {
        assert_eq!(
            authorize(None, Access::Authenticated).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );
        for role in [Role::Admin, Role::Seller, Role::Customer] {
            assert!(authorize(Some(&user(role)), Access::Authenticated).is_ok());
        }
    }

    #[test]
    fn test_role_check() {
        assert!(authorize(Some(&user(Role::Seller)), Access::SELLER).is_ok());

        let err = authorize(Some(&user(Role::Customer)), Access::SELLER).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert!(err.message.contains("seller"));

        // admin is not implicitly a seller
        assert!(authorize(Some(&user(Role::Admin)), Access::SELLER).is_err());
        assert_eq!(
            authorize(None, Access::ADMIN).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );
    }

    #[test]
    fn test_multi_role() {
        let access = Access::Role(&[Role::Admin, Role::Seller]);
        assert!(authorize(Some(&user(Role::Admin)), access).is_ok());
        assert!(authorize(Some(&user(Role::Seller)), access).is_ok());
        assert!(authorize(Some(&user(Role::Customer)), access).is_err());
    }
}
