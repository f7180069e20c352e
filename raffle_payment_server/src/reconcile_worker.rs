use std::time::Duration;

use log::*;
use raffle_payment_engine::{db_types::Order, ReconciliationApi, SettingsApi, SqliteDatabase};
use tokio::task::JoinHandle;

use crate::integrations::DataFastGateway;

/// Starts the reconciliation worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Orders whose shopper never returned to the status page are otherwise stuck in `awaiting_gateway`. The worker
/// polls the gateway for each of them on every tick.
pub fn start_reconcile_worker(
    api: ReconciliationApi<SqliteDatabase, DataFastGateway>,
    settings_api: SettingsApi<SqliteDatabase>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        info!("🕰️ Reconciliation worker started. Outstanding orders are checked every {}s", period.as_secs());
        loop {
            timer.tick().await;
            let settings = match settings_api.payment_settings().await {
                Ok(s) => s,
                Err(e) => {
                    debug!("🕰️ Skipping reconciliation run. Payment settings are unavailable. {e}");
                    continue;
                },
            };
            if !settings.datafast.enabled {
                debug!("🕰️ Skipping reconciliation run. DataFast is disabled");
                continue;
            }
            debug!("🕰️ Running reconciliation job");
            match api.reconcile_outstanding(&settings).await {
                Ok(result) => {
                    if result.checked > 0 {
                        info!(
                            "🕰️ {} outstanding orders checked. {} succeeded, {} failed, {} still outstanding, {} \
                             errors",
                            result.checked,
                            result.succeeded.len(),
                            result.failed.len(),
                            result.still_outstanding(),
                            result.errors
                        );
                    }
                    debug!("🕰️ Succeeded: {}", order_list(&result.succeeded));
                    debug!("🕰️ Failed: {}", order_list(&result.failed));
                },
                Err(e) => {
                    error!("🕰️ Error running reconciliation job: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} raffle_id: {}", o.id, o.order_id, o.raffle_id))
        .collect::<Vec<String>>()
        .join(", ")
}
