use crate::{db_types::Role, AuthApiError};

/// Storage for role grants. Principals are identified by the `sub` of their access token.
#[allow(async_fn_in_trait)]
pub trait RoleManagement {
    async fn fetch_roles_for_user(&self, user_id: &str) -> Result<Vec<Role>, AuthApiError>;

    /// Succeeds if the user holds every one of `roles`. Otherwise returns [`AuthApiError::RoleNotAllowed`] with the
    /// number of missing roles.
    async fn check_user_has_roles(&self, user_id: &str, roles: &[Role]) -> Result<(), AuthApiError>;

    async fn assign_roles(&self, user_id: &str, roles: &[Role]) -> Result<(), AuthApiError>;

    /// Returns the number of grants that were removed.
    async fn remove_roles(&self, user_id: &str, roles: &[Role]) -> Result<u64, AuthApiError>;
}
