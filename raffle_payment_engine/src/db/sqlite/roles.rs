use chrono::Utc;
use log::debug;
use sqlx::{Row, SqliteConnection};

use crate::{
    db::sqlite::{orders::placeholders, SqliteDatabaseError},
    db_types::Role,
    AuthApiError,
};

pub async fn roles_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Role>, AuthApiError> {
    let roles = sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = ? ORDER BY role")
        .bind(user_id)
        .fetch_all(conn)
        .await
        .map_err(SqliteDatabaseError::from)?;
    Ok(roles)
}

pub async fn user_has_roles(user_id: &str, roles: &[Role], conn: &mut SqliteConnection) -> Result<(), AuthApiError> {
    let mut roles = roles.to_vec();
    roles.sort_by_key(|r| r.to_string());
    roles.dedup();
    if roles.is_empty() {
        return Ok(());
    }
    let q = format!("SELECT count(role) FROM user_roles WHERE user_id = ? AND role IN ({})", placeholders(roles.len()));
    let mut query = sqlx::query(&q).bind(user_id);
    for role in &roles {
        query = query.bind(*role);
    }
    let num_matching_roles =
        query.fetch_one(conn).await.map_err(SqliteDatabaseError::from)?.get::<i64, usize>(0) as usize;
    if num_matching_roles == roles.len() {
        Ok(())
    } else {
        Err(AuthApiError::RoleNotAllowed(roles.len().saturating_sub(num_matching_roles)))
    }
}

pub async fn assign_roles(user_id: &str, roles: &[Role], conn: &mut SqliteConnection) -> Result<(), AuthApiError> {
    let now = Utc::now();
    for role in roles {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(*role)
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(SqliteDatabaseError::from)?;
    }
    debug!("🗃️ Roles {roles:?} granted to {user_id}");
    Ok(())
}

pub async fn remove_roles(user_id: &str, roles: &[Role], conn: &mut SqliteConnection) -> Result<u64, AuthApiError> {
    if roles.is_empty() {
        return Ok(0);
    }
    let q = format!("DELETE FROM user_roles WHERE user_id = ? AND role IN ({})", placeholders(roles.len()));
    let mut query = sqlx::query(&q).bind(user_id);
    for role in roles {
        query = query.bind(*role);
    }
    let result = query.execute(conn).await.map_err(SqliteDatabaseError::from)?;
    debug!("🗃️ {} role grants removed from {user_id}", result.rows_affected());
    Ok(result.rows_affected())
}
