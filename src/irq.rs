use core::cell::Cell;

use critical_section::Mutex;

use crate::{
    DriverError,
    bus::RegisterBus,
    codec::ConfigRegister,
    notify::{ConsumerSlot, DATA_READY, Notifier, NotifyError},
};

/// Interrupt line number handed out by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrqLine(pub u32);

/// What the handler reports back to the interrupt controller glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// Not ours: the device has no interrupt line.
    None,
    /// Acknowledged, whether or not a consumer was notified.
    Handled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqState {
    Idle,
    NotifyPending,
}

/// Acknowledges data-ready interrupts and forwards them to the registered
/// consumer.
pub struct InterruptBridge {
    line: IrqLine,
    state: Mutex<Cell<IrqState>>,
}

impl core::fmt::Debug for InterruptBridge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InterruptBridge")
            .field("line", &self.line)
            .field("state", &self.state())
            .finish()
    }
}

impl InterruptBridge {
    pub const fn new(line: IrqLine) -> Self {
        Self {
            line,
            state: Mutex::new(Cell::new(IrqState::Idle)),
        }
    }

    pub fn line(&self) -> IrqLine {
        self.line
    }

    pub fn state(&self) -> IrqState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    /// Runs the handler: acknowledge, resolve, notify, back to idle.
    ///
    /// The hardware is acknowledged before anything else and the interrupt
    /// is always reported handled; a missing consumer or a failed delivery
    /// is only logged.
    pub fn handle<B: RegisterBus, N: Notifier>(
        &self,
        config: &ConfigRegister<'_, B>,
        consumer: &ConsumerSlot,
        notifier: &N,
    ) -> IrqReturn {
        self.set_state(IrqState::NotifyPending);

        config.toggle_strobe();

        if let Err(err) = self.deliver(consumer, notifier) {
            log::warn!("irq {}: {err}", self.line.0);
        }

        self.set_state(IrqState::Idle);
        IrqReturn::Handled
    }

    fn deliver<N: Notifier>(&self, consumer: &ConsumerSlot, notifier: &N) -> Result<(), DriverError> {
        let id = consumer.get().ok_or(DriverError::ConsumerUnresolvable)?;

        match notifier.notify(id, DATA_READY) {
            Ok(()) => {
                log::trace!("irq {}: notified consumer {}", self.line.0, id.get());
                Ok(())
            }
            Err(NotifyError::Unresolvable) => Err(DriverError::ConsumerUnresolvable),
            Err(NotifyError::Rejected) => {
                log::warn!(
                    "irq {}: notification to consumer {} dropped",
                    self.line.0,
                    id.get()
                );
                Ok(())
            }
        }
    }

    fn set_state(&self, state: IrqState) {
        critical_section::with(|cs| self.state.borrow(cs).set(state))
    }
}
