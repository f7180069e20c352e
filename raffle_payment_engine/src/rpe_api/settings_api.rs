use std::{fmt::Debug, sync::Arc, time::Duration};

use log::*;
use tokio::{sync::RwLock, time::Instant};

use crate::{
    db::traits::SettingsManagement,
    db_types::{PaymentSettings, SettingsUpdate},
    rpe_api::errors::SettingsApiError,
};

#[derive(Debug, Clone)]
struct CachedSettings {
    settings: PaymentSettings,
    loaded_at: Instant,
}

/// Access to the payment settings.
///
/// Reads are served from a short-lived cache that is shared between clones of the API, so that the status endpoint
/// doesn't hit storage on every call. Updates invalidate the cache immediately.
#[derive(Clone)]
pub struct SettingsApi<B> {
    db: B,
    ttl: Duration,
    cache: Arc<RwLock<Option<CachedSettings>>>,
}

impl<B> Debug for SettingsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettingsApi (ttl: {:?})", self.ttl)
    }
}

impl<B> SettingsApi<B>
where B: SettingsManagement
{
    /// A `ttl` of zero disables caching.
    pub fn new(db: B, ttl: Duration) -> Self {
        Self { db, ttl, cache: Arc::new(RwLock::new(None)) }
    }

    /// The current, validated payment settings.
    ///
    /// Returns [`SettingsApiError::NotConfigured`] if no settings have been stored yet, and
    /// [`SettingsApiError::Invalid`] if the stored settings are malformed.
    pub async fn payment_settings(&self) -> Result<PaymentSettings, SettingsApiError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.loaded_at.elapsed() < self.ttl {
                return Ok(cached.settings.clone());
            }
        }
        let settings = self.load().await?;
        if !self.ttl.is_zero() {
            *self.cache.write().await = Some(CachedSettings { settings: settings.clone(), loaded_at: Instant::now() });
        }
        Ok(settings)
    }

    async fn load(&self) -> Result<PaymentSettings, SettingsApiError> {
        let stored = self.db.fetch_payment_settings().await?.ok_or_else(|| {
            warn!("🪛️ Payment settings have not been configured");
            SettingsApiError::NotConfigured
        })?;
        let settings = PaymentSettings::try_from(stored).map_err(|e| SettingsApiError::Invalid(e.to_string()))?;
        trace!("🪛️ Payment settings loaded from storage");
        Ok(settings)
    }

    /// Applies a partial update on top of the stored settings, validates the result and saves it.
    ///
    /// If the stored settings are missing or malformed, the update is applied on top of the defaults instead.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<PaymentSettings, SettingsApiError> {
        let current = match self.load().await {
            Ok(settings) => settings,
            Err(SettingsApiError::NotConfigured) => PaymentSettings::default(),
            Err(SettingsApiError::Invalid(e)) => {
                warn!("🪛️ Stored payment settings are invalid ({e}). Applying the update to the defaults");
                PaymentSettings::default()
            },
            Err(e) => return Err(e),
        };
        let updated = current.apply(update).map_err(|e| SettingsApiError::Invalid(e.to_string()))?;
        let stored = self.db.upsert_payment_settings(&updated).await?;
        self.invalidate().await;
        let settings = PaymentSettings::try_from(stored).map_err(|e| SettingsApiError::Invalid(e.to_string()))?;
        info!(
            "🪛️ Payment settings updated. DataFast is {} in {} mode",
            if settings.datafast.enabled { "enabled" } else { "disabled" },
            settings.datafast.mode
        );
        Ok(settings)
    }

    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}
