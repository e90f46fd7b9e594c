use crate::{
    block::{RegArray, RegisterBlock},
    bus::RegisterBus,
    codec::ConfigRegister,
    profile::SampleWidth,
    slice::FieldWriter,
};

/// Which result a read produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Primary samples only.
    Streaming,
    /// Primary samples followed by the whole secondary region.
    Snapshot,
}

/// Builds the read result from live register contents.
#[derive(Debug, Clone, Copy)]
pub struct ReadAssembler {
    primary: RegArray,
    secondary: Option<RegArray>,
    width: SampleWidth,
}

impl ReadAssembler {
    pub fn new(primary: RegArray, secondary: Option<RegArray>, width: SampleWidth) -> Self {
        Self {
            primary,
            secondary,
            width,
        }
    }

    /// Result size for `mode`.
    pub fn logical_len(&self, mode: ReadMode) -> usize {
        let primary = self.primary.len() * self.width.bytes();
        match (mode, self.secondary) {
            (ReadMode::Snapshot, Some(secondary)) => primary + secondary.len() * self.width.bytes(),
            _ => primary,
        }
    }

    /// Largest result this assembler can produce.
    pub fn capacity(&self) -> usize {
        self.logical_len(ReadMode::Snapshot)
    }

    /// Refills `out` and returns the mode used and the logical size.
    ///
    /// Primary samples are always refreshed. The secondary region is read
    /// only when `config` reports snapshot mode; the decision is taken from
    /// the live register on every call. `out` must hold
    /// [`capacity`](Self::capacity) bytes.
    pub fn assemble<B: RegisterBus>(
        &self,
        primary: &RegisterBlock<B>,
        secondary: Option<&RegisterBlock<B>>,
        config: Option<&ConfigRegister<'_, B>>,
        out: &mut [u8],
    ) -> (ReadMode, usize) {
        let width = self.width;
        let mut writer = FieldWriter::new(out);
        primary.read_each(self.primary, |i, value| put_sample(&mut writer, width, i, value));

        let snapshot = config.is_some_and(|config| config.snapshot_mode());
        let mode = match (snapshot, self.secondary, secondary) {
            (true, Some(array), Some(block)) => {
                let base = self.primary.len();
                block.read_each(array, |i, value| put_sample(&mut writer, width, base + i, value));
                ReadMode::Snapshot
            }
            _ => ReadMode::Streaming,
        };

        let len = self.logical_len(mode);
        log::trace!("assembled {mode:?} result, {len} bytes");
        (mode, len)
    }
}

fn put_sample(writer: &mut FieldWriter<'_>, width: SampleWidth, index: usize, value: u32) {
    match width {
        SampleWidth::Half => writer.put_u16_le_at(index * 2, value as u16),
        SampleWidth::Word => writer.put_u32_le_at(index * 4, value),
    }
}
