//! Thermostat device-handle contract.
//!
//! Implemented by vendor client bindings. Every method may block on the
//! vendor cloud and is only ever invoked from the blocking pool, one call at
//! a time.

use devicehub_domain::error::DeviceError;

use crate::config::ThermostatConfig;

/// A logged-in session bound to one room.
///
/// Getters return the values fetched by the last successful
/// [`update`](Self::update).
pub trait ThermostatHandle: Send + 'static {
    /// Refresh the room state. `Ok(false)` signals a transient fetch failure.
    fn update(&mut self) -> Result<bool, DeviceError>;

    /// Raw vendor run mode (`off`, `prog`, `fixed`, `frost`, `away`, ...).
    fn run_mode(&self) -> String;

    fn current_temperature(&self) -> f64;

    fn target_temperature(&self) -> f64;

    /// Lowest and highest accepted target temperature.
    fn target_temperature_bounds(&self) -> (f64, f64);

    fn set_new_temperature(&mut self, temperature: f64) -> Result<(), DeviceError>;

    fn set_temperature_to_manual(&mut self) -> Result<(), DeviceError>;

    fn set_temperature_to_auto(&mut self) -> Result<(), DeviceError>;

    fn set_location_to_frost(&mut self) -> Result<(), DeviceError>;

    fn set_location_to_off(&mut self) -> Result<(), DeviceError>;

    /// Switch heating on by returning to the manual setpoint.
    fn turn_on(&mut self) -> Result<(), DeviceError> {
        self.set_temperature_to_manual()
    }

    /// Switch the whole location off.
    fn turn_off(&mut self) -> Result<(), DeviceError> {
        self.set_location_to_off()
    }
}

/// Opens [`ThermostatHandle`]s.
pub trait ThermostatConnector: Clone + Send + Sync + 'static {
    type Handle: ThermostatHandle;

    /// Log in and bind a session to the configured room.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] when the vendor cloud is unreachable or the
    /// session did not finish its setup.
    fn connect(&self, config: &ThermostatConfig) -> Result<Self::Handle, DeviceError>;
}
