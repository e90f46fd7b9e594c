//! Test support utilities - only compiled in test builds.

use std::sync::Mutex;

use crate::{
    builder::DeviceBuilder,
    device::Device,
    irq::IrqLine,
    notify::{ConsumerId, Notifier, NotifyCode, NotifyError},
    platform::StaticResources,
    profile::Profile,
    sim::SimulatedRegion,
    transfer::CopyOut,
};

/// Full motion write payload: enable, thresholds 10..=15, consumer 42.
pub const EXAMPLE_PAYLOAD: [u8; 18] = [
    0x00, 0x01, // config
    0x00, 0x0A, 0x00, 0x0B, 0x00, 0x0C, 0x00, 0x0D, 0x00, 0x0E, 0x00, 0x0F, // thresholds
    0x00, 0x00, 0x00, 0x2A, // consumer id
];

/// Caller buffer that faults after `limit` bytes.
pub struct ShortSink {
    limit: usize,
    received: Vec<u8>,
}

impl ShortSink {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            received: Vec::new(),
        }
    }

    pub fn received(&self) -> &[u8] {
        &self.received
    }
}

impl CopyOut for ShortSink {
    fn copy_out(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.limit);
        self.received.extend_from_slice(&src[..n]);
        src.len() - n
    }
}

/// Notifier that records every delivery and can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(u32, NotifyCode)>>,
    attempts: Mutex<usize>,
    fail: Mutex<Option<NotifyError>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful deliveries as `(consumer, code)`.
    pub fn delivered(&self) -> Vec<(u32, NotifyCode)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    /// Makes every following delivery fail with `err` (`None` to recover).
    pub fn fail_with(&self, err: Option<NotifyError>) {
        *self.fail.lock().unwrap() = err;
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, consumer: ConsumerId, code: NotifyCode) -> Result<(), NotifyError> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(err) = *self.fail.lock().unwrap() {
            return Err(err);
        }
        self.delivered.lock().unwrap().push((consumer.get(), code));
        Ok(())
    }
}

/// Simulated hardware for the full motion profile.
pub struct MotionRig {
    pub primary: SimulatedRegion,
    pub secondary: SimulatedRegion,
}

impl MotionRig {
    pub const IRQ: u32 = 37;

    pub fn new() -> Self {
        let primary = SimulatedRegion::new(Profile::MOTION.primary_span());
        for i in 0..4 {
            primary.poke(i * 4, 0x1000 + i as u32);
        }
        Self {
            primary,
            secondary: SimulatedRegion::new(Profile::MOTION.secondary_span()),
        }
    }

    pub fn attach(&self) -> Device<&SimulatedRegion, RecordingNotifier> {
        let mut res = StaticResources::new()
            .region(&self.primary)
            .region(&self.secondary)
            .irq(IrqLine(Self::IRQ));

        DeviceBuilder::new(Profile::MOTION)
            .notifier(RecordingNotifier::new())
            .attach(&mut res)
            .unwrap()
    }
}
