use crate::{
    db::traits::StorageError,
    db_types::{PaymentSettings, StoredPaymentSettings},
};

#[allow(async_fn_in_trait)]
pub trait SettingsManagement {
    /// Fetches the raw settings row. `None` if the settings have never been configured.
    async fn fetch_payment_settings(&self) -> Result<Option<StoredPaymentSettings>, StorageError>;

    /// Replaces the stored settings with `settings` and returns the stored row.
    async fn upsert_payment_settings(&self, settings: &PaymentSettings) -> Result<StoredPaymentSettings, StorageError>;
}
