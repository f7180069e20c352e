mod order_id;

pub use order_id::{generate_order_id, is_valid_order_id_prefix};
