//! A `no_std` core for register-block sensor drivers exposed as byte-stream
//! character devices.
//!
//! One [`Device`] serves every variant of the driver family. A [`Profile`]
//! says which parts a given piece of hardware has: sample registers, a
//! configuration register with thresholds, a secondary snapshot region, a
//! data-ready interrupt.
//!
//! # Features
//!
//! - **Bounds-checked register access** - offsets are validated once at
//!   attach, every access after that is a single width-exact bus cycle
//! - **Bounded transfers** - reads and writes clamp to the logical channel
//!   size, and a short copy across the trust boundary is a hard error
//! - **Dual-buffer reads** - streaming mode returns the primary samples,
//!   snapshot mode appends the whole secondary region
//! - **Strobe handshake** - every successful read and every interrupt
//!   inverts the data-consumed bit, atomically with respect to each other
//! - **Pluggable notification** - interrupts are forwarded through a
//!   [`Notifier`] of your choosing
//!
//! # Architecture
//!
//! ```text
//!  caller                   Device                         hardware
//! ┌────────┐  read()   ┌────────────────┐  read_each()  ┌──────────────┐
//! │        │◀──────────│ ReadAssembler  │◀──────────────│ primary      │
//! │        │           │                │◀──────────────│ secondary    │
//! │        │  write()  │ WritePayload   │  merge()      │              │
//! │        │──────────▶│ codec::apply   │──────────────▶│ config, thr  │
//! │        │           │                │               │              │
//! │        │  notify   │ InterruptBridge│  toggle       │              │
//! │        │◀──────────│                │──────────────▶│ strobe bit   │
//! └────────┘           └────────────────┘               └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use embedded_regdev::prelude::*;
//!
//! let primary = SimulatedRegion::new(0x2C);
//! let secondary = SimulatedRegion::new(3072);
//! let mut resources = StaticResources::new()
//!     .region(&primary)
//!     .region(&secondary)
//!     .irq(IrqLine(37));
//!
//! let notifications = QueueNotifier::<4>::new();
//! let device = DeviceBuilder::new(Profile::MOTION)
//!     .notifier(&notifications)
//!     .attach(&mut resources)
//!     .unwrap();
//!
//! // Program thresholds and register consumer 42
//! let payload = [
//!     0x00, 0x01, // enable
//!     0x00, 0x0A, 0x00, 0x0B, 0x00, 0x0C, 0x00, 0x0D, 0x00, 0x0E, 0x00, 0x0F,
//!     0x00, 0x00, 0x00, 0x2A,
//! ];
//! device.write(&payload, payload.len(), &mut 0).unwrap();
//!
//! // Streaming read: nine 16-bit samples
//! let mut buf = [0u8; 64];
//! assert_eq!(device.read(&mut buf, 64, &mut 0), Ok(18));
//!
//! // The interrupt glue calls in; the consumer is notified
//! assert_eq!(device.handle_interrupt(), IrqReturn::Handled);
//! assert_eq!(notifications.pop().map(|(id, _)| id.get()), Some(42));
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod assembler;
pub mod block;
pub mod builder;
pub mod bus;
pub mod channel;
pub mod codec;
pub mod device;
pub mod error;
pub mod helpers;
pub mod irq;
pub mod mmio;
pub mod notify;
pub mod platform;
pub mod profile;
pub mod sim;
pub mod slice;
pub mod transfer;

#[cfg(test)]
mod test_support;

pub use assembler::{ReadAssembler, ReadMode};
pub use block::{Reg, RegArray, RegisterBlock};
pub use builder::DeviceBuilder;
pub use bus::RegisterBus;
pub use channel::ByteChannel;
pub use device::Device;
pub use error::DriverError;
pub use irq::{IrqLine, IrqReturn};
pub use mmio::Mmio32;
pub use notify::{CallbackNotifier, ConsumerId, NoNotifier, Notifier, NotifyCode, NotifyError, QueueNotifier};
pub use platform::{ResourceProvider, StaticResources};
pub use profile::Profile;
pub use sim::SimulatedRegion;
pub use transfer::{CopyIn, CopyOut};

pub mod prelude {
    pub use crate::{
        ByteChannel, CallbackNotifier, ConsumerId, CopyIn, CopyOut, Device, DeviceBuilder, DriverError,
        IrqLine, IrqReturn, Mmio32, NoNotifier, Notifier, NotifyCode, NotifyError, Profile, QueueNotifier,
        ReadMode, RegisterBlock, RegisterBus, ResourceProvider, SimulatedRegion, StaticResources,
        notify::DATA_READY,
    };
}
