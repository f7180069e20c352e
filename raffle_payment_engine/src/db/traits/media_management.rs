use crate::{
    db::traits::StorageError,
    db_types::{MediaRecord, NewMediaRecord},
};

#[allow(async_fn_in_trait)]
pub trait MediaManagement {
    async fn insert_media_record(&self, record: &NewMediaRecord, created_by: &str) -> Result<MediaRecord, StorageError>;

    /// All media records, newest first.
    async fn fetch_media_records(&self) -> Result<Vec<MediaRecord>, StorageError>;
}
