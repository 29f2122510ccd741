//! Order numbers and distributed IDs.

use chrono::{DateTime, Local, Timelike};

use crate::error::Result;

/// Source of unique 64-bit IDs, such as a snowflake service.
pub trait IdGenerator {
    fn next_id(&self) -> Result<u64>;
}

impl<F> IdGenerator for F
where
    F: Fn() -> Result<u64>,
{
    fn next_id(&self) -> Result<u64> {
        self()
    }
}

/// 20 digits: `YYYYMMDDHHMMSS` followed by microseconds.
pub fn order_number_at(now: DateTime<Local>) -> String {
    format!("{}{:06}", now.format("%Y%m%d%H%M%S"), micros(&now))
}

/// 16 digits: `YYMMDDHHMMSS` followed by tenths of a millisecond.
pub fn short_order_number_at(now: DateTime<Local>) -> String {
    format!("{}{:04}", now.format("%y%m%d%H%M%S"), micros(&now) / 100)
}

pub fn order_number() -> String {
    order_number_at(Local::now())
}

pub fn short_order_number() -> String {
    short_order_number_at(Local::now())
}

/// An order number taken from `generator`, in decimal.
pub fn generated_order_number(generator: &dyn IdGenerator) -> Result<String> {
    Ok(generator.next_id()?.to_string())
}

// Leap seconds report nanoseconds past 1e9; clamp so the width stays fixed.
fn micros(now: &DateTime<Local>) -> u32 {
    (now.nanosecond() / 1_000).min(999_999)
}
