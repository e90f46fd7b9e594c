//! Critical section example: interrupt handler and reader racing on one device
//!
//! This example demonstrates:
//! - A simulated ISR thread acknowledging data-ready interrupts
//! - A main loop reading samples at the same time
//! - The configuration register staying consistent: every read and every
//!   interrupt flips the strobe bit exactly once

use embedded_regdev::{prelude::*, profile::CFG_STROBE};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

const SAMPLES: usize = 50;

fn main() {
    println!("=== Critical Section Example ===\n");

    let primary = SimulatedRegion::new(Profile::MOTION.primary_span());
    let secondary = SimulatedRegion::new(Profile::MOTION.secondary_span());
    let mut resources = StaticResources::new()
        .region(&primary)
        .region(&secondary)
        .irq(IrqLine(37));

    let queue = QueueNotifier::<8>::new();
    let device = DeviceBuilder::new(Profile::MOTION)
        .notifier(&queue)
        .attach(&mut resources)
        .unwrap();

    // Register as the consumer: only the id field, at its offset
    device.write(&7u32.to_be_bytes(), 4, &mut 14).unwrap();

    // Simulated interrupt line
    let pending = AtomicBool::new(false);
    let done = AtomicBool::new(false);
    let interrupts = AtomicUsize::new(0);

    thread::scope(|s| {
        // ISR simulator
        s.spawn(|| {
            println!("ISR simulator: Started");
            while !done.load(Ordering::Acquire) {
                if pending.swap(false, Ordering::AcqRel) {
                    device.handle_interrupt();
                    interrupts.fetch_add(1, Ordering::Relaxed);
                } else {
                    thread::yield_now();
                }
            }
            println!("ISR simulator: Stopped");
        });

        // Main loop: the sensor raises its line, the application reads
        const BUF_LEN: usize = 18;
        let mut buf = [0u8; BUF_LEN];
        for i in 0..SAMPLES {
            primary.poke(0, i as u32);
            pending.store(true, Ordering::Release);

            let n = device.read(&mut buf, BUF_LEN, &mut 0).unwrap();
            assert_eq!(n, 18);

            while let Some((consumer, _)) = queue.pop() {
                assert_eq!(consumer.get(), 7);
            }
        }

        while pending.load(Ordering::Acquire) {
            thread::yield_now();
        }
        done.store(true, Ordering::Release);
    });

    let toggles = SAMPLES + interrupts.load(Ordering::Relaxed);
    let strobe = primary.peek(0x10) & CFG_STROBE != 0;
    println!("{SAMPLES} reads, {} interrupts, strobe {strobe}", interrupts.load(Ordering::Relaxed));
    assert_eq!(strobe, toggles % 2 == 1);
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_critical_section_example() {
        super::main();
    }
}
