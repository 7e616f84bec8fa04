//! Order number generation.
//!
//! Format: `ORD-<unix millis>-<5 uppercase base36 chars>`. The timestamp keeps
//! numbers roughly time-ordered and the suffix makes same-millisecond
//! collisions negligible (36^5 ≈ 60 million per millisecond). The unique
//! column on `orders.order_number` catches the rest.

use chrono::{DateTime, Utc};
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 5;

/// Generates an order number for an order created at `created_at`.
#[must_use]
pub fn generate_order_number(created_at: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
        .collect();
    format!("ORD-{}-{suffix}", created_at.timestamp_millis())
}
