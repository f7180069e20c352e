use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::RoleManagement,
    db_types::{Role, Roles},
    rpe_api::errors::AuthApiError,
};

/// The Role Verifier. Answers which roles a principal holds; the server's authorization guard is built on top of it.
pub struct AuthApi<B> {
    db: B,
}

impl<B> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi")
    }
}

impl<B> AuthApi<B>
where B: RoleManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn roles_for_user(&self, user_id: &str) -> Result<Roles, AuthApiError> {
        let roles = self.db.fetch_roles_for_user(user_id).await?;
        trace!("🔐️ {user_id} has roles {roles:?}");
        Ok(roles)
    }

    /// Succeeds only if the user holds all of `roles`.
    pub async fn check_user_has_roles(&self, user_id: &str, roles: &[Role]) -> Result<(), AuthApiError> {
        self.db.check_user_has_roles(user_id, roles).await
    }

    pub async fn is_admin(&self, user_id: &str) -> Result<bool, AuthApiError> {
        match self.db.check_user_has_roles(user_id, &[Role::Admin]).await {
            Ok(()) => Ok(true),
            Err(AuthApiError::RoleNotAllowed(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn assign_roles(&self, user_id: &str, roles: &[Role]) -> Result<(), AuthApiError> {
        self.db.assign_roles(user_id, roles).await?;
        info!("🔐️ {user_id} was granted {roles:?}");
        Ok(())
    }

    pub async fn remove_roles(&self, user_id: &str, roles: &[Role]) -> Result<u64, AuthApiError> {
        let n = self.db.remove_roles(user_id, roles).await?;
        info!("🔐️ {n} of {roles:?} revoked from {user_id}");
        Ok(n)
    }
}
