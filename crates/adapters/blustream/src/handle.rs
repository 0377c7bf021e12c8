//! Matrix device-handle contract.
//!
//! Implemented by vendor client bindings. Every method may block on network
//! IO and is only ever invoked from the blocking pool, one call at a time.

use devicehub_domain::error::DeviceError;

/// A connected Blustream matrix.
///
/// Accessors return the values fetched by the last successful
/// [`update`](Self::update); they never touch the network.
pub trait MatrixHandle: Send + 'static {
    fn turn_on(&mut self) -> Result<(), DeviceError>;

    fn turn_off(&mut self) -> Result<(), DeviceError>;

    /// Refresh the cached device state. `Ok(false)` signals a transient
    /// fetch failure.
    fn update(&mut self) -> Result<bool, DeviceError>;

    fn is_on(&self) -> bool;

    /// Currently routed input, if the matrix reported one.
    fn source(&self) -> Option<String>;

    /// Names of all inputs, in matrix order.
    fn sources(&self) -> Vec<String>;

    fn select_source(&mut self, name: &str) -> Result<(), DeviceError>;
}

/// Opens [`MatrixHandle`]s.
pub trait MatrixConnector: Clone + Send + Sync + 'static {
    type Handle: MatrixHandle;

    /// Connect to the matrix at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] when the matrix cannot be reached.
    fn connect(&self, host: &str, port: u16) -> Result<Self::Handle, DeviceError>;
}
