use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{MediaRecord, NewMediaRecord},
};

const MEDIA_COLUMNS: &str = "id, file_name, file_url, file_type, instagram_post_url, created_by, created_at";

pub async fn insert_media_record(
    record: &NewMediaRecord,
    created_by: &str,
    conn: &mut SqliteConnection,
) -> Result<MediaRecord, SqliteDatabaseError> {
    let q = format!(
        "INSERT INTO media (file_name, file_url, file_type, instagram_post_url, created_by, created_at) VALUES (?, ?, \
         ?, ?, ?, ?) RETURNING {MEDIA_COLUMNS}"
    );
    let record = sqlx::query_as::<_, MediaRecord>(&q)
        .bind(&record.file_name)
        .bind(&record.file_url)
        .bind(record.file_type)
        .bind(&record.instagram_post_url)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Media record #{} ({}) created by {created_by}", record.id, record.file_name);
    Ok(record)
}

pub async fn fetch_media_records(conn: &mut SqliteConnection) -> Result<Vec<MediaRecord>, SqliteDatabaseError> {
    let q = format!("SELECT {MEDIA_COLUMNS} FROM media ORDER BY created_at DESC, id DESC");
    let records = sqlx::query_as::<_, MediaRecord>(&q).fetch_all(conn).await?;
    Ok(records)
}
