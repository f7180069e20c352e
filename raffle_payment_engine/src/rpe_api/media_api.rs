use std::fmt::Debug;

use log::*;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    db::traits::MediaManagement,
    db_types::{MediaRecord, NewMediaRecord, Principal, Role},
    rpe_api::errors::MediaApiError,
};

const MAX_FILE_NAME_LEN: usize = 255;

static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[A-Za-z0-9.\-]+(:\d+)?(/\S*)?$").expect("HTTP_URL regex is valid"));
static INSTAGRAM_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://(www\.)?instagram\.com/(p|reel|tv)/[A-Za-z0-9_\-]+/?(\?\S*)?$")
        .expect("INSTAGRAM_URL regex is valid")
});

/// Privileged writes to the media gallery.
pub struct MediaApi<B> {
    db: B,
}

impl<B> Debug for MediaApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MediaApi")
    }
}

impl<B> MediaApi<B>
where B: MediaManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Validates and stores a media record on behalf of an administrator.
    pub async fn create_media_record(
        &self,
        principal: &Principal,
        record: NewMediaRecord,
    ) -> Result<MediaRecord, MediaApiError> {
        if !principal.has_role(Role::Admin) {
            return Err(MediaApiError::InsufficientPermissions(principal.user_id.clone()));
        }
        let record = validate(record)?;
        let record = self.db.insert_media_record(&record, &principal.user_id).await?;
        info!("🗃️ {} added media record #{} ({:?})", principal.user_id, record.id, record.file_type);
        Ok(record)
    }

    pub async fn fetch_media_records(&self) -> Result<Vec<MediaRecord>, MediaApiError> {
        Ok(self.db.fetch_media_records().await?)
    }
}

fn validate(mut record: NewMediaRecord) -> Result<NewMediaRecord, MediaApiError> {
    record.file_name = record.file_name.trim().to_string();
    record.file_url = record.file_url.trim().to_string();
    if record.file_name.is_empty() {
        return Err(MediaApiError::ValidationError("file_name is required".into()));
    }
    if record.file_name.len() > MAX_FILE_NAME_LEN {
        return Err(MediaApiError::ValidationError(format!("file_name is longer than {MAX_FILE_NAME_LEN} bytes")));
    }
    if !HTTP_URL.is_match(&record.file_url) {
        return Err(MediaApiError::ValidationError("file_url must be an http(s) URL".into()));
    }
    record.instagram_post_url = match record.instagram_post_url.map(|s| s.trim().to_string()) {
        Some(url) if url.is_empty() => None,
        Some(url) if !INSTAGRAM_URL.is_match(&url) => {
            return Err(MediaApiError::ValidationError("instagram_post_url is not an Instagram post URL".into()));
        },
        other => other,
    };
    Ok(record)
}
