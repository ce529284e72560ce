use rand::Rng;
use std::sync::Arc;

use crate::clock::Clock;

/// Produces human-facing order numbers
///
/// Uniqueness is best effort; the orders table carries the unique index.
pub trait OrderNumberGenerator: Send + Sync {
    fn next(&self) -> String;
}

/// `ORD-{unix millis}-{0..1000}`
pub struct TimestampOrderNumbers {
    clock: Arc<dyn Clock>,
}

impl TimestampOrderNumbers {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl OrderNumberGenerator for TimestampOrderNumbers {
    fn next(&self) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(0..1000);
        format!("ORD-{}-{}", self.clock.now().timestamp_millis(), suffix)
    }
}
