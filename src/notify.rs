use core::{
    cell::{Cell, RefCell},
    num::NonZeroU32,
};

use critical_section::Mutex;
use heapless::Deque;

/// Identifier of the process entitled to data-ready notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerId(NonZeroU32);

impl ConsumerId {
    /// Wraps a raw id. Zero means "no consumer" and yields `None`.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// Out-of-band code delivered with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotifyCode(pub u32);

/// Code sent when the sensor signals new data (`SIGUSR1` on Linux).
pub const DATA_READY: NotifyCode = NotifyCode(10);

/// Why a notification did not reach its consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// The id does not name a live consumer.
    Unresolvable,
    /// The delivery mechanism refused the notification (queue full, ...).
    Rejected,
}

/// Delivers data-ready notifications to a consumer.
///
/// Called from the interrupt path: implementations must not block.
/// Delivery is fire-and-forget; errors are logged and never retried.
pub trait Notifier {
    fn notify(&self, consumer: ConsumerId, code: NotifyCode) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, consumer: ConsumerId, code: NotifyCode) -> Result<(), NotifyError> {
        (**self).notify(consumer, code)
    }
}

/// Notifier for variants without an interrupt line.
///
/// Has nowhere to deliver to, so every notification is
/// [`Rejected`](NotifyError::Rejected) and the bridge logs it as dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn notify(&self, _consumer: ConsumerId, _code: NotifyCode) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected)
    }
}

/// Adapts a closure, e.g. one that raises an OS signal or wakes a task.
pub struct CallbackNotifier<F>(F);

impl<F> CallbackNotifier<F>
where
    F: Fn(ConsumerId, NotifyCode) -> Result<(), NotifyError>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Notifier for CallbackNotifier<F>
where
    F: Fn(ConsumerId, NotifyCode) -> Result<(), NotifyError>,
{
    fn notify(&self, consumer: ConsumerId, code: NotifyCode) -> Result<(), NotifyError> {
        (self.0)(consumer, code)
    }
}

/// Bounded message queue of `(consumer, code)` pairs.
///
/// The interrupt path pushes; a consumer-side task drains with
/// [`pop`](Self::pop). A full queue rejects the new message.
pub struct QueueNotifier<const N: usize> {
    queue: Mutex<RefCell<Deque<(ConsumerId, NotifyCode), N>>>,
}

impl<const N: usize> QueueNotifier<N> {
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Takes the oldest pending notification.
    pub fn pop(&self) -> Option<(ConsumerId, NotifyCode)> {
        critical_section::with(|cs| self.queue.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of pending notifications.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> Default for QueueNotifier<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Notifier for QueueNotifier<N> {
    fn notify(&self, consumer: ConsumerId, code: NotifyCode) -> Result<(), NotifyError> {
        critical_section::with(|cs| {
            self.queue
                .borrow(cs)
                .borrow_mut()
                .push_back((consumer, code))
                .map_err(|_| NotifyError::Rejected)
        })
    }
}

/// The registered consumer id of one device. Last writer wins.
pub struct ConsumerSlot(Mutex<Cell<Option<ConsumerId>>>);

impl core::fmt::Debug for ConsumerSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ConsumerSlot").field(&self.get()).finish()
    }
}

impl ConsumerSlot {
    pub const fn new() -> Self {
        Self(Mutex::new(Cell::new(None)))
    }

    /// Replaces the registered consumer; `None` unregisters.
    pub fn register(&self, id: Option<ConsumerId>) {
        critical_section::with(|cs| self.0.borrow(cs).set(id))
    }

    pub fn get(&self) -> Option<ConsumerId> {
        critical_section::with(|cs| self.0.borrow(cs).get())
    }
}

impl Default for ConsumerSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> ConsumerId {
        ConsumerId::from_raw(raw).unwrap()
    }

    #[test]
    fn zero_is_no_consumer() {
        assert_eq!(ConsumerId::from_raw(0), None);
        assert_eq!(ConsumerId::from_raw(42).map(ConsumerId::get), Some(42));
    }

    #[test]
    fn slot_last_writer_wins() {
        let slot = ConsumerSlot::new();
        assert_eq!(slot.get(), None);

        slot.register(Some(id(7)));
        slot.register(Some(id(9)));
        assert_eq!(slot.get(), Some(id(9)));

        slot.register(None);
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn no_notifier_rejects() {
        assert_eq!(NoNotifier.notify(id(42), DATA_READY), Err(NotifyError::Rejected));
    }

    #[test]
    fn queue_rejects_when_full() {
        let queue = QueueNotifier::<2>::new();

        assert_eq!(queue.notify(id(1), DATA_READY), Ok(()));
        assert_eq!(queue.notify(id(2), DATA_READY), Ok(()));
        assert_eq!(queue.notify(id(3), DATA_READY), Err(NotifyError::Rejected));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), Some((id(1), DATA_READY)));
        assert_eq!(queue.pop(), Some((id(2), DATA_READY)));
        assert!(queue.is_empty());
    }

    #[test]
    fn callback_sees_consumer_and_code() {
        let seen = Mutex::new(Cell::new(0u32));
        let notifier = CallbackNotifier::new(|consumer: ConsumerId, code: NotifyCode| {
            critical_section::with(|cs| seen.borrow(cs).set(consumer.get() + code.0));
            Ok(())
        });

        notifier.notify(id(32), DATA_READY).unwrap();

        assert_eq!(critical_section::with(|cs| seen.borrow(cs).get()), 42);
    }
}
