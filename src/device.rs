use alloc::vec::Vec;

use spin::Mutex;

use crate::{
    DriverError,
    assembler::{ReadAssembler, ReadMode},
    block::RegisterBlock,
    bus::RegisterBus,
    channel::ByteChannel,
    codec::{self, ConfigRegister, Controls, MAX_FIELDS, WriteLayout, WritePayload},
    helpers::transfer_window,
    irq::{InterruptBridge, IrqLine, IrqReturn},
    notify::{ConsumerId, ConsumerSlot, Notifier},
    platform::ResourceProvider,
    profile::Profile,
    transfer::{CopyIn, CopyOut, transfer_in, transfer_out},
};

/// Capacity of the write-staging buffer.
pub const STAGING_CAPACITY: usize = 32;

const PRIMARY: usize = 0;
const SECONDARY: usize = 1;

/// One attached device: its register regions, buffers and consumer.
///
/// Created by [`DeviceBuilder`](crate::DeviceBuilder); dropping it (or
/// calling [`detach`](Self::detach)) releases everything it holds.
///
/// Reads and writes may run concurrently with each other and with
/// [`handle_interrupt`](Self::handle_interrupt). At most one read and one
/// write are in flight at a time; the configuration register is only ever
/// modified inside a critical section.
pub struct Device<B, N> {
    profile: Profile,
    primary: RegisterBlock<B>,
    secondary: Option<RegisterBlock<B>>,
    assembler: ReadAssembler,
    controls: Option<Controls>,
    layout: Option<WriteLayout>,
    irq: Option<InterruptBridge>,
    consumer: ConsumerSlot,
    notifier: N,
    staging: Mutex<heapless::Vec<u8, STAGING_CAPACITY>>,
    result: Mutex<Vec<u8>>,
}

impl<B: RegisterBus, N> core::fmt::Debug for Device<B, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.profile.name)
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("irq", &self.irq)
            .field("consumer", &self.consumer)
            .finish_non_exhaustive()
    }
}

fn unavailable(profile: &Profile, what: &str) -> DriverError {
    log::warn!("{}: {what} unavailable", profile.name);
    DriverError::ResourceUnavailable
}

impl<B: RegisterBus, N: Notifier> Device<B, N> {
    pub(crate) fn attach<P>(profile: Profile, provider: &mut P, notifier: N) -> Result<Self, DriverError>
    where
        P: ResourceProvider<Bus = B>,
    {
        log::info!("{}: attaching ({})", profile.name, profile.compatible);

        let primary = RegisterBlock::new(
            provider
                .map_region(PRIMARY)
                .ok_or_else(|| unavailable(&profile, "register region"))?,
        );
        if primary.len() < profile.primary_span() {
            return Err(unavailable(&profile, "full primary window"));
        }
        let samples = primary
            .array(0, 4, profile.samples)
            .ok_or_else(|| unavailable(&profile, "sample registers"))?;
        log::info!("{}: primary region mapped, {} bytes", profile.name, primary.len());

        let controls = match profile.control {
            Some(control) => Some(Controls {
                config: primary
                    .register(control.config)
                    .ok_or_else(|| unavailable(&profile, "configuration register"))?,
                thresholds: primary
                    .array(
                        control.threshold_base,
                        control.threshold_stride,
                        control.threshold_count,
                    )
                    .ok_or_else(|| unavailable(&profile, "threshold registers"))?,
                writable: control.writable,
            }),
            None => None,
        };

        let (secondary, snapshot) = match profile.snapshot {
            Some(count) => {
                let block = RegisterBlock::new(
                    provider
                        .map_region(SECONDARY)
                        .ok_or_else(|| unavailable(&profile, "secondary region"))?,
                );
                if block.len() < profile.secondary_span() {
                    return Err(unavailable(&profile, "full secondary window"));
                }
                let array = block
                    .array(0, 4, count)
                    .ok_or_else(|| unavailable(&profile, "secondary samples"))?;
                log::info!("{}: secondary region mapped, {} bytes", profile.name, block.len());
                (Some(block), Some(array))
            }
            None => (None, None),
        };

        let irq = if profile.interrupt {
            if controls.is_none() {
                return Err(unavailable(&profile, "configuration register for interrupt acknowledge"));
            }
            let line: IrqLine = provider
                .interrupt_line(0)
                .ok_or_else(|| unavailable(&profile, "interrupt line"))?;
            log::info!("{}: interrupt line {}", profile.name, line.0);
            Some(InterruptBridge::new(line))
        } else {
            None
        };

        let layout = WriteLayout::for_profile(&profile);
        if layout.is_some_and(|l| l.len() > STAGING_CAPACITY || l.fields() > MAX_FIELDS) {
            log::warn!("{}: write payload exceeds staging buffer", profile.name);
            return Err(DriverError::AllocationFailure);
        }

        let assembler = ReadAssembler::new(samples, snapshot, profile.width);
        let mut result = Vec::new();
        result
            .try_reserve_exact(assembler.capacity())
            .map_err(|_| {
                log::warn!("{}: cannot allocate {} byte read buffer", profile.name, assembler.capacity());
                DriverError::AllocationFailure
            })?;
        result.resize(assembler.capacity(), 0);

        Ok(Self {
            profile,
            primary,
            secondary,
            assembler,
            controls,
            layout,
            irq,
            consumer: ConsumerSlot::new(),
            notifier,
            staging: Mutex::new(heapless::Vec::new()),
            result: Mutex::new(result),
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn name(&self) -> &'static str {
        self.profile.name
    }

    pub fn irq_line(&self) -> Option<IrqLine> {
        self.irq.as_ref().map(InterruptBridge::line)
    }

    /// Currently registered consumer.
    pub fn consumer(&self) -> Option<ConsumerId> {
        self.consumer.get()
    }

    /// Primary register block, for diagnostics that bypass the channel.
    pub fn registers(&self) -> &RegisterBlock<B> {
        &self.primary
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Read size the next read would see in `mode`.
    pub fn logical_len(&self, mode: ReadMode) -> usize {
        self.assembler.logical_len(mode)
    }

    /// Interrupt handler entry point for the platform's interrupt glue.
    pub fn handle_interrupt(&self) -> IrqReturn {
        match (&self.irq, self.config_register()) {
            (Some(bridge), Some(config)) => bridge.handle(&config, &self.consumer, &self.notifier),
            _ => IrqReturn::None,
        }
    }

    /// Tears the device down.
    pub fn detach(self) {
        log::info!("{}: detaching", self.profile.name);
    }

    fn config_register(&self) -> Option<ConfigRegister<'_, B>> {
        self.controls
            .as_ref()
            .map(|controls| controls.config_register(&self.primary))
    }
}

impl<B: RegisterBus, N: Notifier> ByteChannel for Device<B, N> {
    fn read<D: CopyOut + ?Sized>(&self, dst: &mut D, len: usize, pos: &mut i64) -> Result<usize, DriverError> {
        let mut result = self.result.lock();
        let config = self.config_register();

        let (mode, logical) = self.assembler.assemble(
            &self.primary,
            self.secondary.as_ref(),
            config.as_ref(),
            &mut result[..],
        );

        let count = transfer_out(&result[..logical], dst, len, pos).inspect_err(|err| {
            log::warn!("{}: read of {len} at {} failed: {err}", self.profile.name, *pos);
        })?;

        if count > 0 {
            if let Some(config) = &config {
                config.toggle_strobe();
            }
        }

        log::debug!("{}: read {count} bytes ({mode:?})", self.profile.name);
        Ok(count)
    }

    fn write<S: CopyIn + ?Sized>(&self, src: &S, len: usize, pos: &mut i64) -> Result<usize, DriverError> {
        let (Some(layout), Some(controls)) = (self.layout, self.controls) else {
            transfer_window(*pos, len, 0)?;
            log::warn!("{}: registers are read only", self.profile.name);
            return Ok(0);
        };

        let mut staging = self.staging.lock();
        staging.clear();
        staging
            .resize(layout.len(), 0)
            .map_err(|_| DriverError::AllocationFailure)?;

        let window = transfer_in(&mut staging[..], src, len, pos).inspect_err(|err| {
            log::warn!("{}: write of {len} at {} failed: {err}", self.profile.name, *pos);
        })?;
        if window.is_empty() {
            return Ok(0);
        }

        let payload = WritePayload::decode(layout, &staging[..], &window);
        let applied = codec::apply(&payload, &self.primary, &controls, &self.consumer);
        log::debug!(
            "{}: wrote {} bytes, {} fields applied",
            self.profile.name,
            window.len(),
            applied.len()
        );

        Ok(window.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DeviceBuilder,
        irq::IrqLine,
        platform::StaticResources,
        profile::{CFG_ENABLE, CFG_SNAPSHOT, CFG_STROBE},
        sim::SimulatedRegion,
        test_support::{EXAMPLE_PAYLOAD, MotionRig, RecordingNotifier},
    };

    #[test]
    fn attach_requires_primary_region() {
        let mut res = StaticResources::<&SimulatedRegion>::new();
        let result = DeviceBuilder::new(Profile::THRESHOLD).no_notifier().attach(&mut res);
        assert_eq!(result.err(), Some(DriverError::ResourceUnavailable));
    }

    #[test]
    fn attach_rejects_short_primary_window() {
        let primary = SimulatedRegion::new(0x24);
        let mut res = StaticResources::new().region(&primary);
        let result = DeviceBuilder::new(Profile::THRESHOLD).no_notifier().attach(&mut res);
        assert_eq!(result.err(), Some(DriverError::ResourceUnavailable));
    }

    #[test]
    fn attach_requires_secondary_and_irq() {
        let primary = SimulatedRegion::new(0x2C);
        let mut res = StaticResources::new().region(&primary);
        let result = DeviceBuilder::new(Profile::DUAL_REGION).no_notifier().attach(&mut res);
        assert_eq!(result.err(), Some(DriverError::ResourceUnavailable));

        let primary = SimulatedRegion::new(0x2C);
        let secondary = SimulatedRegion::new(3072);
        let mut res = StaticResources::new().region(&primary).region(&secondary);
        let result = DeviceBuilder::new(Profile::MOTION)
            .notifier(RecordingNotifier::new())
            .attach(&mut res);
        assert_eq!(result.err(), Some(DriverError::ResourceUnavailable));
    }

    #[test]
    fn attach_rejects_oversized_payload() {
        let mut profile = Profile::THRESHOLD;
        if let Some(control) = profile.control.as_mut() {
            control.threshold_count = 16;
        }
        let primary = SimulatedRegion::new(0x60);
        let mut res = StaticResources::new().region(&primary);
        let result = DeviceBuilder::new(profile).no_notifier().attach(&mut res);
        assert_eq!(result.err(), Some(DriverError::AllocationFailure));
    }

    #[test]
    fn example_payload_programs_thresholds_and_consumer() {
        let rig = MotionRig::new();
        let dev = rig.attach();
        let mut pos = 0;

        assert_eq!(dev.write(&EXAMPLE_PAYLOAD, 18, &mut pos), Ok(18));

        for (n, expected) in (10u32..=15).enumerate() {
            assert_eq!(dev.registers().read(dev.registers().register(0x14 + 4 * n).unwrap()), expected);
        }
        assert_eq!(dev.consumer().map(ConsumerId::get), Some(42));
        assert_eq!(pos, 18);
    }

    #[test]
    fn write_merges_config_with_live_strobe() {
        let rig = MotionRig::new();
        rig.primary.poke(0x10, CFG_STROBE);
        let dev = rig.attach();

        let mut payload = EXAMPLE_PAYLOAD;
        payload[1] = 0x07; // enable | strobe | snapshot
        dev.write(&payload, 18, &mut 0).unwrap();

        assert_eq!(rig.primary.peek(0x10), CFG_ENABLE | CFG_STROBE | CFG_SNAPSHOT);

        rig.primary.poke(0x10, 0);
        dev.write(&payload, 2, &mut 0).unwrap();
        assert_eq!(rig.primary.peek(0x10), CFG_ENABLE | CFG_SNAPSHOT);
    }

    #[test]
    fn streaming_read_clamps_and_toggles_once() {
        let rig = MotionRig::new();
        let dev = rig.attach();
        let mut buf = [0u8; 1000];
        let mut pos = 0;

        let n = dev.read(&mut buf, 1000, &mut pos).unwrap();

        assert_eq!(n, 18);
        assert_eq!(n, dev.logical_len(ReadMode::Streaming));
        assert_eq!(rig.primary.peek(0x10) & CFG_STROBE, CFG_STROBE);
        assert_eq!(rig.secondary.reads(), 0);

        // At the end of the result: no data, no handshake
        assert_eq!(dev.read(&mut buf, 10, &mut pos), Ok(0));
        assert_eq!(rig.primary.peek(0x10) & CFG_STROBE, CFG_STROBE);
    }

    #[test]
    fn snapshot_read_spans_both_regions() {
        let rig = MotionRig::new();
        rig.primary.poke(0x10, CFG_SNAPSHOT);
        rig.secondary.poke(3068, 0xFFFF_BEEF);
        let dev = rig.attach();
        let mut buf = [0u8; 2000];

        let n = dev.read(&mut buf, 2000, &mut 0).unwrap();

        assert_eq!(n, 1554);
        assert_eq!(&buf[1552..1554], &[0xEF, 0xBE]);
    }

    #[test]
    fn failed_read_leaves_strobe_alone() {
        let rig = MotionRig::new();
        let dev = rig.attach();
        let mut buf = [0u8; 4];

        assert_eq!(dev.read(&mut buf, 4, &mut 19), Err(DriverError::InvalidOffset));
        assert_eq!(dev.read(&mut buf, 4, &mut -1), Err(DriverError::InvalidOffset));
        assert!(matches!(
            dev.read(&mut buf[..], 8, &mut 0),
            Err(DriverError::PartialTransferFailure { .. })
        ));
        assert_eq!(rig.primary.peek(0x10), 0);
    }

    #[test]
    fn write_offset_past_payload_is_rejected() {
        let rig = MotionRig::new();
        let dev = rig.attach();
        assert_eq!(
            dev.write(&EXAMPLE_PAYLOAD, 18, &mut 19),
            Err(DriverError::InvalidOffset)
        );
        assert_eq!(dev.consumer(), None);
    }

    #[test]
    fn interrupt_without_consumer_is_handled() {
        let rig = MotionRig::new();
        let dev = rig.attach();

        assert_eq!(dev.handle_interrupt(), IrqReturn::Handled);
        assert_eq!(rig.primary.peek(0x10), CFG_STROBE);
        assert!(dev.notifier().delivered().is_empty());
    }

    #[test]
    fn humidity_profile_is_read_only() {
        let region = SimulatedRegion::new(4);
        region.poke(0, 0x0102_0304);
        let mut res = StaticResources::new().region(&region);
        let dev = DeviceBuilder::new(Profile::HUMIDITY).no_notifier().attach(&mut res).unwrap();
        let mut buf = [0u8; 8];

        assert_eq!(dev.read(&mut buf, 8, &mut 0), Ok(4));
        assert_eq!(&buf[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(dev.read(&mut buf, 8, &mut 2), Ok(2));
        assert_eq!(&buf[..2], &[0x02, 0x01]);

        assert_eq!(dev.write(&[0xFFu8; 4], 4, &mut 0), Ok(0));
        assert_eq!(dev.write(&[0xFFu8; 4], 4, &mut 1), Err(DriverError::InvalidOffset));
        assert_eq!(region.writes(), 0);
        assert_eq!(dev.handle_interrupt(), IrqReturn::None);
        assert_eq!(dev.irq_line(), None);
    }

    #[test]
    fn sizes_come_from_the_assembler_and_layout() {
        let rig = MotionRig::new();
        let dev = rig.attach();

        assert_eq!(dev.logical_len(ReadMode::Streaming), 18);
        assert_eq!(dev.logical_len(ReadMode::Snapshot), 1554);
        assert_eq!(dev.write(&[0u8; 32], 32, &mut 0), Ok(18));
    }

    #[test]
    fn irq_line_is_reported() {
        let rig = MotionRig::new();
        let dev = rig.attach();
        assert_eq!(dev.irq_line(), Some(IrqLine(MotionRig::IRQ)));
    }
}
