use std::sync::atomic::{AtomicU32, Ordering};

use crate::basic::scaler::Scaler;

/// Latest turn command, written by an input thread, read by the tick.
///
/// Only the most recent value is kept. Inputs that arrive between two ticks
/// overwrite each other.
#[derive(Debug, Default)]
pub struct AxisInput {
    bits: AtomicU32,
}

impl AxisInput {
    pub fn new(val: f32) -> Self {
        AxisInput {
            bits: AtomicU32::new(val.to_bits()),
        }
    }

    pub fn set(&self, val: f32) {
        self.bits.store(val.to_bits(), Ordering::Relaxed);
    }

    pub fn sample(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Map a raw rc channel value (-1000~1000) through `scaler`.
    pub fn set_channel(&self, raw: i16, scaler: &Scaler) {
        let val = scaler.scale((raw as f32).clamp(-1000.0, 1000.0));
        self.set(val);
    }
}
