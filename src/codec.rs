//! Bit-level conventions of the register block.
//!
//! Write payload, by byte offset (motion variant):
//!
//! ```text
//!  0      2      4      6      8     10     12     14             18
//!  ├──────┼──────┼──────┼──────┼──────┼──────┼──────┼──────────────┤
//!  │ cfg  │ thr0 │ thr1 │ thr2 │ thr3 │ thr4 │ thr5 │ consumer id  │
//!  │ BE16 │ BE16 │ BE16 │ BE16 │ BE16 │ BE16 │ BE16 │ BE32         │
//!  └──────┴──────┴──────┴──────┴──────┴──────┴──────┴──────────────┘
//! ```
//!
//! Only fields the write fully covered are applied. The configuration word
//! is merged into the live register, never written over it: the strobe bit
//! belongs to the hardware handshake and keeps its current value.

use core::ops::Range;

use bitmaps::Bitmap;

use crate::{
    block::{Reg, RegArray, RegisterBlock},
    bus::RegisterBus,
    notify::{ConsumerId, ConsumerSlot},
    profile::{CFG_SNAPSHOT, CFG_STROBE, Profile},
    slice::FieldReader,
};

/// Upper bound on payload fields (configuration, thresholds, consumer id).
pub const MAX_FIELDS: usize = 16;

/// Which payload fields a write covered, by field index.
pub type FieldMask = Bitmap<MAX_FIELDS>;

const CONFIG_LEN: usize = 2;
const THRESHOLD_LEN: usize = 2;
const CONSUMER_LEN: usize = 4;

/// Field positions of a profile's write payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteLayout {
    thresholds: usize,
    consumer: bool,
}

impl WriteLayout {
    /// Layout for `profile`, or `None` if the variant is read-only.
    pub fn for_profile(profile: &Profile) -> Option<Self> {
        profile.control.map(|control| Self {
            thresholds: control.threshold_count,
            consumer: profile.interrupt,
        })
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        let consumer = if self.consumer { CONSUMER_LEN } else { 0 };
        CONFIG_LEN + THRESHOLD_LEN * self.thresholds + consumer
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fields in the payload.
    pub fn fields(&self) -> usize {
        1 + self.thresholds + usize::from(self.consumer)
    }

    /// Field index of threshold `n`.
    pub fn threshold_field(&self, n: usize) -> usize {
        1 + n
    }

    /// Field index of the consumer id, if the payload carries one.
    pub fn consumer_field(&self) -> Option<usize> {
        self.consumer.then_some(1 + self.thresholds)
    }

    fn field_range(&self, field: usize) -> Option<Range<usize>> {
        if field == 0 {
            return Some(0..CONFIG_LEN);
        }
        if field <= self.thresholds {
            let start = CONFIG_LEN + THRESHOLD_LEN * (field - 1);
            return Some(start..start + THRESHOLD_LEN);
        }
        if Some(field) == self.consumer_field() {
            let start = CONFIG_LEN + THRESHOLD_LEN * self.thresholds;
            return Some(start..start + CONSUMER_LEN);
        }
        None
    }

    /// Fields lying entirely inside `window`.
    pub fn covered(&self, window: &Range<usize>) -> FieldMask {
        let mut mask = FieldMask::new();
        for field in 0..self.fields().min(MAX_FIELDS) {
            if let Some(range) = self.field_range(field) {
                if window.start <= range.start && range.end <= window.end {
                    mask.set(field, true);
                }
            }
        }
        mask
    }
}

/// A staged write payload, decoded lazily.
#[derive(Debug)]
pub struct WritePayload<'a> {
    layout: WriteLayout,
    reader: FieldReader<'a>,
    mask: FieldMask,
}

impl<'a> WritePayload<'a> {
    /// Decodes `bytes` (the full staging buffer), honouring only the fields
    /// inside `window`, the byte range this write actually filled.
    pub fn decode(layout: WriteLayout, bytes: &'a [u8], window: &Range<usize>) -> Self {
        Self {
            layout,
            reader: FieldReader::new(bytes),
            mask: layout.covered(window),
        }
    }

    pub fn mask(&self) -> FieldMask {
        self.mask
    }

    /// Configuration word, if covered.
    pub fn config(&self) -> Option<u16> {
        self.field(0)?;
        self.reader.u16_be_at(0)
    }

    /// Threshold `n`, if covered.
    pub fn threshold(&self, n: usize) -> Option<u16> {
        if n >= self.layout.thresholds {
            return None;
        }
        let range = self.field(self.layout.threshold_field(n))?;
        self.reader.u16_be_at(range.start)
    }

    /// Raw consumer id, if covered. Zero unregisters.
    pub fn consumer(&self) -> Option<u32> {
        let range = self.field(self.layout.consumer_field()?)?;
        self.reader.u32_be_at(range.start)
    }

    fn field(&self, field: usize) -> Option<Range<usize>> {
        if field < MAX_FIELDS && self.mask.get(field) {
            self.layout.field_range(field)
        } else {
            None
        }
    }
}

/// Merges a caller's configuration word into the live register value.
///
/// Bits outside `writable` and the strobe bit keep their live value.
pub fn merge_config(live: u32, word: u16, writable: u32) -> u32 {
    let mask = writable & !CFG_STROBE;
    (live & !mask) | (u32::from(word) & mask)
}

/// The configuration register, shared by reads, writes and the interrupt
/// path.
///
/// Every read-modify-write runs inside one critical section, so a strobe
/// toggle cannot interleave with another toggle or a merge.
pub struct ConfigRegister<'a, B> {
    block: &'a RegisterBlock<B>,
    reg: Reg,
    writable: u32,
}

impl<'a, B: RegisterBus> ConfigRegister<'a, B> {
    pub fn new(block: &'a RegisterBlock<B>, reg: Reg, writable: u32) -> Self {
        Self {
            block,
            reg,
            writable,
        }
    }

    /// Inverts the strobe bit: the "data consumed" handshake.
    ///
    /// Returns the value written.
    pub fn toggle_strobe(&self) -> u32 {
        let value = critical_section::with(|_| self.block.modify(self.reg, |v| v ^ CFG_STROBE));
        log::trace!("strobe toggled, config now {value:#010x}");
        value
    }

    /// Merges `word` into the register. Returns the value written.
    pub fn merge(&self, word: u16) -> u32 {
        let writable = self.writable;
        critical_section::with(|_| {
            self.block
                .modify(self.reg, |live| merge_config(live, word, writable))
        })
    }

    /// Live state of the snapshot mode bit.
    pub fn snapshot_mode(&self) -> bool {
        self.block.read(self.reg) & CFG_SNAPSHOT != 0
    }
}

/// Validated control registers of a writable device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub config: Reg,
    pub thresholds: RegArray,
    pub writable: u32,
}

impl Controls {
    pub fn config_register<'a, B: RegisterBus>(
        &self,
        block: &'a RegisterBlock<B>,
    ) -> ConfigRegister<'a, B> {
        ConfigRegister::new(block, self.config, self.writable)
    }
}

/// Applies every covered field of `payload` to the hardware and the
/// consumer slot. Returns the fields applied.
pub fn apply<B: RegisterBus>(
    payload: &WritePayload<'_>,
    block: &RegisterBlock<B>,
    controls: &Controls,
    consumer: &ConsumerSlot,
) -> FieldMask {
    if let Some(word) = payload.config() {
        let value = controls.config_register(block).merge(word);
        log::debug!("config word {word:#06x} merged, register now {value:#010x}");
    }

    for n in 0..controls.thresholds.len() {
        if let (Some(value), Some(reg)) = (payload.threshold(n), controls.thresholds.get(n)) {
            block.write(reg, u32::from(value));
            log::debug!("threshold {n} = {value}");
        }
    }

    if let Some(raw) = payload.consumer() {
        let id = ConsumerId::from_raw(raw);
        consumer.register(id);
        log::debug!("consumer id set to {raw}");
    }

    payload.mask()
}
