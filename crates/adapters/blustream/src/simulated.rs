//! In-memory matrix for demos and tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use devicehub_domain::error::DeviceError;

use crate::error::BlustreamError;
use crate::handle::{MatrixConnector, MatrixHandle};

#[derive(Debug, Clone, PartialEq)]
struct MatrixState {
    reachable: bool,
    powered: bool,
    inputs: Vec<String>,
    routed: Option<usize>,
}

/// Shared state of one simulated matrix.
///
/// Clones observe and drive the same device, so a test can keep one clone
/// while the adapter owns a handle connected to another.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    state: Arc<Mutex<MatrixState>>,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new(["Input 1", "Input 2", "Input 3", "Input 4"])
    }
}

impl SimulatedDevice {
    /// A powered-off matrix with the given inputs, routing the first one.
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inputs: Vec<String> = inputs.into_iter().map(Into::into).collect();
        let routed = if inputs.is_empty() { None } else { Some(0) };
        Self {
            state: Arc::new(Mutex::new(MatrixState {
                reachable: true,
                powered: false,
                inputs,
                routed,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MatrixState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate the matrix dropping off (or rejoining) the network.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Simulate someone pressing the front-panel power button.
    pub fn set_powered(&self, powered: bool) {
        self.lock().powered = powered;
    }

    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.lock().powered
    }

    #[must_use]
    pub fn routed_source(&self) -> Option<String> {
        let state = self.lock();
        state.routed.and_then(|i| state.inputs.get(i).cloned())
    }

    fn with_reachable<T>(
        &self,
        f: impl FnOnce(&mut MatrixState) -> Result<T, BlustreamError>,
    ) -> Result<T, DeviceError> {
        let mut state = self.lock();
        if !state.reachable {
            return Err(BlustreamError::ConnectionLost.into());
        }
        f(&mut state).map_err(Into::into)
    }
}

/// [`MatrixHandle`] talking to a [`SimulatedDevice`].
#[derive(Debug)]
pub struct SimulatedMatrix {
    device: SimulatedDevice,
    cached: Option<MatrixState>,
}

impl MatrixHandle for SimulatedMatrix {
    fn turn_on(&mut self) -> Result<(), DeviceError> {
        self.device.with_reachable(|state| {
            state.powered = true;
            Ok(())
        })
    }

    fn turn_off(&mut self) -> Result<(), DeviceError> {
        self.device.with_reachable(|state| {
            state.powered = false;
            Ok(())
        })
    }

    fn update(&mut self) -> Result<bool, DeviceError> {
        let snapshot = self.device.with_reachable(|state| Ok(state.clone()))?;
        self.cached = Some(snapshot);
        Ok(true)
    }

    fn is_on(&self) -> bool {
        self.cached.as_ref().is_some_and(|state| state.powered)
    }

    fn source(&self) -> Option<String> {
        let state = self.cached.as_ref()?;
        state.routed.and_then(|i| state.inputs.get(i).cloned())
    }

    fn sources(&self) -> Vec<String> {
        self.cached
            .as_ref()
            .map(|state| state.inputs.clone())
            .unwrap_or_default()
    }

    fn select_source(&mut self, name: &str) -> Result<(), DeviceError> {
        self.device.with_reachable(|state| {
            let index = state
                .inputs
                .iter()
                .position(|input| input == name)
                .ok_or_else(|| BlustreamError::UnknownSource(name.to_string()))?;
            state.routed = Some(index);
            Ok(())
        })
    }
}

/// [`MatrixConnector`] that hands out [`SimulatedMatrix`] handles for one
/// [`SimulatedDevice`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedConnector {
    device: SimulatedDevice,
}

impl SimulatedConnector {
    #[must_use]
    pub fn new(device: SimulatedDevice) -> Self {
        Self { device }
    }

    #[must_use]
    pub fn device(&self) -> &SimulatedDevice {
        &self.device
    }
}

impl MatrixConnector for SimulatedConnector {
    type Handle = SimulatedMatrix;

    fn connect(&self, host: &str, port: u16) -> Result<SimulatedMatrix, DeviceError> {
        if !self.device.lock().reachable {
            return Err(BlustreamError::Unreachable {
                host: host.to_string(),
                port,
            }
            .into());
        }
        tracing::debug!(host, port, "simulated matrix connected");
        Ok(SimulatedMatrix {
            device: self.device.clone(),
            cached: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_nothing_before_first_update() {
        let matrix = SimulatedConnector::default().connect("m", 23).unwrap();
        assert!(!matrix.is_on());
        assert!(matrix.source().is_none());
        assert!(matrix.sources().is_empty());
    }

    #[test]
    fn should_reflect_commands_after_update() {
        let mut matrix = SimulatedConnector::default().connect("m", 23).unwrap();
        matrix.turn_on().unwrap();
        matrix.select_source("Input 3").unwrap();
        assert!(!matrix.is_on());

        assert!(matrix.update().unwrap());
        assert!(matrix.is_on());
        assert_eq!(matrix.source().as_deref(), Some("Input 3"));
        assert_eq!(matrix.sources().len(), 4);
    }

    #[test]
    fn should_reject_unknown_source() {
        let mut matrix = SimulatedConnector::default().connect("m", 23).unwrap();
        let err = matrix.select_source("HDMI 9").unwrap_err();
        let cause = std::error::Error::source(&err).unwrap();
        assert_eq!(cause.to_string(), "unknown input source `HDMI 9`");
    }

    #[test]
    fn should_refuse_to_connect_to_unreachable_matrix() {
        let device = SimulatedDevice::default();
        device.set_reachable(false);
        let result = SimulatedConnector::new(device).connect("10.0.0.5", 23);
        assert!(matches!(result, Err(DeviceError::Vendor(_))));
    }

    #[test]
    fn should_fail_update_when_connection_drops() {
        let connector = SimulatedConnector::default();
        let mut matrix = connector.connect("m", 23).unwrap();
        connector.device().set_reachable(false);
        assert!(matrix.update().is_err());
    }
}
