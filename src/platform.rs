use crate::{bus::RegisterBus, irq::IrqLine};

/// Hardware resources a platform can hand to a device during attach.
///
/// Discovery and mapping belong to the platform; the device only asks for
/// regions and lines by index and treats `None` as unavailable.
pub trait ResourceProvider {
    type Bus: RegisterBus;

    /// Maps register region `index` (0 = primary, 1 = secondary).
    fn map_region(&mut self, index: usize) -> Option<Self::Bus>;

    /// Interrupt line `index`.
    fn interrupt_line(&mut self, index: usize) -> Option<IrqLine>;
}

const MAX_REGIONS: usize = 2;

/// Fixed resources known ahead of time: already-mapped regions and an
/// interrupt line. Each resource can be taken once.
#[derive(Debug)]
pub struct StaticResources<B> {
    regions: [Option<B>; MAX_REGIONS],
    next: usize,
    irq: Option<IrqLine>,
}

impl<B> StaticResources<B> {
    pub fn new() -> Self {
        Self {
            regions: core::array::from_fn(|_| None),
            next: 0,
            irq: None,
        }
    }

    /// Adds the next region (primary first). Extra regions are ignored.
    pub fn region(mut self, bus: B) -> Self {
        if let Some(slot) = self.regions.get_mut(self.next) {
            *slot = Some(bus);
            self.next += 1;
        }
        self
    }

    pub fn irq(mut self, line: IrqLine) -> Self {
        self.irq = Some(line);
        self
    }
}

impl<B> Default for StaticResources<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RegisterBus> ResourceProvider for StaticResources<B> {
    type Bus = B;

    fn map_region(&mut self, index: usize) -> Option<B> {
        self.regions.get_mut(index)?.take()
    }

    fn interrupt_line(&mut self, index: usize) -> Option<IrqLine> {
        if index == 0 { self.irq.take() } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedRegion;

    #[test]
    fn resources_are_taken_once() {
        let a = SimulatedRegion::new(4);
        let b = SimulatedRegion::new(8);
        let mut res = StaticResources::new().region(&a).region(&b).irq(IrqLine(5));

        assert_eq!(res.map_region(1).map(|r| r.len_bytes()), Some(8));
        assert!(res.map_region(1).is_none());
        assert!(res.map_region(2).is_none());
        assert_eq!(res.interrupt_line(0), Some(IrqLine(5)));
        assert_eq!(res.interrupt_line(0), None);
        assert!(res.map_region(0).is_some());
    }
}
