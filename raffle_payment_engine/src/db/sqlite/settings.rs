use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{PaymentSettings, StoredPaymentSettings},
};

const SETTINGS_COLUMNS: &str =
    "datafast_enabled, datafast_mode, datafast_entity_id, datafast_access_token, updated_at";

pub async fn fetch_payment_settings(
    conn: &mut SqliteConnection,
) -> Result<Option<StoredPaymentSettings>, SqliteDatabaseError> {
    let q = format!("SELECT {SETTINGS_COLUMNS} FROM payment_settings WHERE id = 1");
    let settings = sqlx::query_as::<_, StoredPaymentSettings>(&q).fetch_optional(conn).await?;
    Ok(settings)
}

pub async fn upsert_payment_settings(
    settings: &PaymentSettings,
    conn: &mut SqliteConnection,
) -> Result<StoredPaymentSettings, SqliteDatabaseError> {
    let q = format!(
        "INSERT INTO payment_settings (id, {SETTINGS_COLUMNS}) VALUES (1, ?, ?, ?, ?, ?)
         ON CONFLICT (id) DO UPDATE SET
            datafast_enabled = excluded.datafast_enabled,
            datafast_mode = excluded.datafast_mode,
            datafast_entity_id = excluded.datafast_entity_id,
            datafast_access_token = excluded.datafast_access_token,
            updated_at = excluded.updated_at
         RETURNING {SETTINGS_COLUMNS}"
    );
    let gw = &settings.datafast;
    let stored = sqlx::query_as::<_, StoredPaymentSettings>(&q)
        .bind(gw.enabled)
        .bind(gw.mode.to_string())
        .bind(&gw.entity_id)
        .bind(gw.access_token.reveal())
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Payment settings updated. DataFast enabled: {} ({})", stored.datafast_enabled, stored.datafast_mode);
    Ok(stored)
}
