use core::marker::PhantomData;

use crate::{
    DriverError,
    device::Device,
    notify::{NoNotifier, Notifier},
    platform::ResourceProvider,
    profile::Profile,
};

// Builder states
pub struct NeedNotifier;
pub struct Ready;

/// Attaches a [`Device`] for one [`Profile`].
///
/// ```
/// use embedded_regdev::prelude::*;
///
/// let region = SimulatedRegion::new(0x2C);
/// let mut resources = StaticResources::new().region(&region);
///
/// let device = DeviceBuilder::new(Profile::THRESHOLD)
///     .no_notifier()
///     .attach(&mut resources)
///     .unwrap();
///
/// assert_eq!(device.name(), "mpu");
/// ```
pub struct DeviceBuilder<N, State> {
    profile: Profile,
    notifier: Option<N>,
    _phantom: PhantomData<State>,
}

// Start the builder
impl DeviceBuilder<(), NeedNotifier> {
    pub fn new(profile: Profile) -> Self {
        DeviceBuilder {
            profile,
            notifier: None,
            _phantom: PhantomData,
        }
    }
}

// Set notifier
impl DeviceBuilder<(), NeedNotifier> {
    /// Sets where data-ready notifications go.
    pub fn notifier<N: Notifier>(self, notifier: N) -> DeviceBuilder<N, Ready> {
        DeviceBuilder {
            profile: self.profile,
            notifier: Some(notifier),
            _phantom: PhantomData,
        }
    }

    /// For variants without an interrupt line.
    pub fn no_notifier(self) -> DeviceBuilder<NoNotifier, Ready> {
        if self.profile.interrupt {
            log::warn!(
                "{}: interrupt profile attached without a notifier, notifications will be dropped",
                self.profile.name
            );
        }
        self.notifier(NoNotifier)
    }
}

// Attach
impl<N: Notifier> DeviceBuilder<N, Ready> {
    /// Obtains the profile's resources from `provider` and allocates the
    /// device buffers.
    ///
    /// # Errors
    /// * [`DriverError::ResourceUnavailable`] - a region or the interrupt
    ///   line is missing, or a region is too small for the profile
    /// * [`DriverError::AllocationFailure`] - buffers could not be allocated
    pub fn attach<P: ResourceProvider>(self, provider: &mut P) -> Result<Device<P::Bus, N>, DriverError> {
        let notifier = self.notifier.ok_or(DriverError::ResourceUnavailable)?;
        Device::attach(self.profile, provider, notifier)
    }
}
