use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;

use crate::db_types::OrderId;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const RANDOM_SUFFIX_LEN: usize = 4;

static LAST_TIMESTAMP: AtomicU64 = AtomicU64::new(0);

/// Generates a new order id of the form `<prefix><base36 ms timestamp><4 random base36 chars>`, in upper case.
///
/// Timestamps are strictly increasing within a process, so two ids generated by this process can never collide.
/// Collisions across processes are caught by the unique constraint on `orders.order_id`.
pub fn generate_order_id(prefix: &str) -> OrderId {
    let timestamp = next_timestamp();
    let mut rng = rand::thread_rng();
    let suffix = (0..RANDOM_SUFFIX_LEN).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect::<String>();
    OrderId(format!("{}{}{suffix}", prefix.to_ascii_uppercase(), to_base36(timestamp)))
}

/// Order id prefixes must be short and alphanumeric so that ids stay URL- and gateway-safe.
pub fn is_valid_order_id_prefix(prefix: &str) -> bool {
    prefix.len() <= 8 && prefix.chars().all(|c| c.is_ascii_alphanumeric())
}

fn next_timestamp() -> u64 {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let prev = LAST_TIMESTAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
        .unwrap_or_else(|v| v);
    now.max(prev + 1)
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".into();
    }
    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
