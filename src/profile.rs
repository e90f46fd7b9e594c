//! Device profiles.
//!
//! One core serves every variant of the register-block driver family; a
//! [`Profile`] says which parts of it a given piece of hardware has.

/// Configuration register: enable bit.
pub const CFG_ENABLE: u32 = 1 << 0;
/// Configuration register: data-consumed strobe. Inverted, never set.
pub const CFG_STROBE: u32 = 1 << 1;
/// Configuration register: snapshot read mode when set.
pub const CFG_SNAPSHOT: u32 = 1 << 2;

/// How one 32-bit sample register lands in the read result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    /// Low 16 bits, little-endian.
    Half,
    /// All 32 bits, little-endian.
    Word,
}

impl SampleWidth {
    /// Bytes one sample occupies in the read result.
    pub const fn bytes(self) -> usize {
        match self {
            SampleWidth::Half => 2,
            SampleWidth::Word => 4,
        }
    }
}

/// Configuration and threshold registers of a writable profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlLayout {
    /// Offset of the configuration register.
    pub config: usize,
    /// Offset of the first threshold register.
    pub threshold_base: usize,
    /// Distance between threshold registers.
    pub threshold_stride: usize,
    /// Number of threshold registers.
    pub threshold_count: usize,
    /// Configuration bits a caller may change. The strobe bit is always
    /// excluded, whatever this holds.
    pub writable: u32,
}

impl ControlLayout {
    /// One past the last byte the control registers occupy.
    pub const fn span(&self) -> usize {
        let thresholds_end = if self.threshold_count == 0 {
            0
        } else {
            self.threshold_base + self.threshold_stride * (self.threshold_count - 1) + 4
        };
        let config_end = self.config + 4;
        if thresholds_end > config_end { thresholds_end } else { config_end }
    }
}

/// Static description of one driver variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Channel name.
    pub name: &'static str,
    /// Device-tree compatible string the variant binds to.
    pub compatible: &'static str,
    /// Primary sample registers, read from offset 0 at stride 4.
    pub samples: usize,
    pub width: SampleWidth,
    /// `None` for read-only variants.
    pub control: Option<ControlLayout>,
    /// Sample count of the secondary region; `None` without one.
    pub snapshot: Option<usize>,
    /// Whether the variant raises data-ready interrupts.
    pub interrupt: bool,
}

const MOTION_CONTROL: ControlLayout = ControlLayout {
    config: 0x10,
    threshold_base: 0x14,
    threshold_stride: 4,
    threshold_count: 6,
    writable: 0xFFFF,
};

const MOTION_SAMPLES: usize = 0x24 / 4;
const MOTION_SNAPSHOT: usize = 3072 / 4;

impl Profile {
    /// Humidity/temperature sensor: one read-only 32-bit register.
    pub const HUMIDITY: Profile = Profile {
        name: "hcsensor",
        compatible: "sch,hdc1000-1.0",
        samples: 1,
        width: SampleWidth::Word,
        control: None,
        snapshot: None,
        interrupt: false,
    };

    /// Motion sensor with configuration and thresholds, single region.
    pub const THRESHOLD: Profile = Profile {
        name: "mpu",
        compatible: "sch,mpu9250-0.9",
        samples: MOTION_SAMPLES,
        width: SampleWidth::Half,
        control: Some(MOTION_CONTROL),
        snapshot: None,
        interrupt: false,
    };

    /// Motion sensor with the secondary snapshot region, no interrupt.
    pub const DUAL_REGION: Profile = Profile {
        name: "mpu",
        compatible: "sch,mpu9250-1.0",
        samples: MOTION_SAMPLES,
        width: SampleWidth::Half,
        control: Some(MOTION_CONTROL),
        snapshot: Some(MOTION_SNAPSHOT),
        interrupt: false,
    };

    /// Full motion sensor: snapshot region plus data-ready notification.
    pub const MOTION: Profile = Profile {
        name: "mpu",
        compatible: "sch,mpu9250-2.0",
        samples: MOTION_SAMPLES,
        width: SampleWidth::Half,
        control: Some(MOTION_CONTROL),
        snapshot: Some(MOTION_SNAPSHOT),
        interrupt: true,
    };

    /// Bytes the primary region must map.
    pub const fn primary_span(&self) -> usize {
        let samples_end = self.samples * 4;
        match self.control {
            Some(control) if control.span() > samples_end => control.span(),
            _ => samples_end,
        }
    }

    /// Bytes the secondary region must map.
    pub const fn secondary_span(&self) -> usize {
        match self.snapshot {
            Some(count) => count * 4,
            None => 0,
        }
    }
}
