//! Basic example: attach a motion sensor and talk to it through the channel
//!
//! This example demonstrates:
//! - Using the builder to attach a device against simulated registers
//! - Programming configuration, thresholds and the consumer id with one write
//! - Streaming and snapshot reads
//! - The strobe handshake bit flipping once per read

use embedded_regdev::{
    prelude::*,
    profile::{CFG_SNAPSHOT, CFG_STROBE},
};

// ============ Register Layout ============
// Primary region: nine sample registers from 0x00, configuration at 0x10,
// six thresholds from 0x14. Secondary region: 768 snapshot samples.

const CONFIG: usize = 0x10;
const THRESHOLD_0: usize = 0x14;

pub fn main() {
    let primary = SimulatedRegion::new(Profile::MOTION.primary_span());
    let secondary = SimulatedRegion::new(Profile::MOTION.secondary_span());

    // Pretend the sensor produced some samples
    primary.poke(0x00, 0x0000_0123); // accel x
    primary.poke(0x04, 0x0000_0456); // accel y
    primary.poke(0x08, 0x0000_0789); // accel z
    secondary.poke(0, 0x0000_0ABC);

    let mut resources = StaticResources::new()
        .region(&primary)
        .region(&secondary)
        .irq(IrqLine(37));
    let queue = QueueNotifier::<4>::new();
    let device = DeviceBuilder::new(Profile::MOTION)
        .notifier(&queue)
        .attach(&mut resources)
        .unwrap();

    // ========== Write ==========
    // config (BE16) | six thresholds (BE16) | consumer id (BE32)
    let mut payload = [0u8; 18];
    payload[0..2].copy_from_slice(&0x0001u16.to_be_bytes());
    for n in 0..6 {
        let threshold = 100 * (n as u16 + 1);
        payload[2 + 2 * n..4 + 2 * n].copy_from_slice(&threshold.to_be_bytes());
    }
    payload[14..18].copy_from_slice(&1234u32.to_be_bytes());

    assert_eq!(device.write(&payload, payload.len(), &mut 0), Ok(18));
    let block = device.registers();
    assert_eq!(block.read(block.register(THRESHOLD_0).unwrap()), 100);
    assert_eq!(device.consumer().map(ConsumerId::get), Some(1234));

    // ========== Streaming read ==========
    // Asking for more than there is clamps to the nine 16-bit samples
    const BUF_LEN: usize = 2048;
    let mut buf = [0u8; BUF_LEN];
    let mut pos = 0;
    assert_eq!(device.read(&mut buf, BUF_LEN, &mut pos), Ok(18));
    assert_eq!(&buf[..6], &[0x23, 0x01, 0x56, 0x04, 0x89, 0x07]);
    assert_eq!(primary.peek(CONFIG) & CFG_STROBE, CFG_STROBE);

    // ========== Snapshot read ==========
    // Flip the mode bit through the channel; the secondary region is appended
    payload[0..2].copy_from_slice(&((CFG_SNAPSHOT as u16) | 0x0001).to_be_bytes());
    device.write(&payload, 2, &mut 0).unwrap();
    assert_eq!(device.read(&mut buf, BUF_LEN, &mut 0), Ok(1554));
    assert_eq!(&buf[18..20], &[0xBC, 0x0A]);

    // Two reads, two toggles
    assert_eq!(primary.peek(CONFIG) & CFG_STROBE, 0);

    // ========== Interrupt ==========
    assert_eq!(device.handle_interrupt(), IrqReturn::Handled);
    let (consumer, code) = queue.pop().unwrap();
    assert_eq!(consumer.get(), 1234);
    assert_eq!(code, DATA_READY);

    device.detach();
}
