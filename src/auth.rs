// src/auth.rs

use std::fmt;

use crate::models::user::Role;

/// Identity of the caller for the duration of one request.
///
/// Inserted into the request extensions by `auth_middleware` and passed
/// explicitly to handlers via `Extension<RequestContext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: i64,
    pub role: Role,
}

/// Raised when the caller's role does not match the one a handler needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied {
    pub required: Role,
    pub actual: Role,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Access denied: {} role required", self.required)
    }
}

impl std::error::Error for AccessDenied {}

/// Authorization check called at the top of each role-restricted handler.
pub fn requires_role(ctx: &RequestContext, role: Role) -> Result<(), AccessDenied> {
    if ctx.role == role {
        Ok(())
    } else {
        Err(AccessDenied {
            required: role,
            actual: ctx.role,
        })
    }
}
