//! In-memory thermostat room for demos and tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use devicehub_domain::error::DeviceError;

use crate::config::ThermostatConfig;
use crate::error::WarmupError;
use crate::handle::{ThermostatConnector, ThermostatHandle};

const PROGRAM_TARGET: f64 = 21.0;
const FROST_TARGET: f64 = 7.0;

#[derive(Debug, Clone, PartialEq)]
struct RoomState {
    location: String,
    room: String,
    reachable: bool,
    fetch_failing: bool,
    accepts_login: bool,
    run_mode: String,
    current: f64,
    target: f64,
    manual_target: f64,
    bounds: (f64, f64),
}

/// Shared state of one simulated room.
///
/// Clones observe and drive the same room, so a test can keep one clone
/// while the adapter owns a session connected to another.
#[derive(Debug, Clone)]
pub struct SimulatedRoom {
    state: Arc<Mutex<RoomState>>,
}

impl Default for SimulatedRoom {
    fn default() -> Self {
        Self::new("Home", "Bathroom")
    }
}

impl SimulatedRoom {
    /// A room following its program at 19.5 °C.
    pub fn new(location: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RoomState {
                location: location.into(),
                room: room.into(),
                reachable: true,
                fetch_failing: false,
                accepts_login: true,
                run_mode: "prog".to_string(),
                current: 19.5,
                target: PROGRAM_TARGET,
                manual_target: PROGRAM_TARGET,
                bounds: (5.0, 30.0),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate the vendor cloud going away (or coming back).
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Make room fetches report a transient failure.
    pub fn set_fetch_failing(&self, failing: bool) {
        self.lock().fetch_failing = failing;
    }

    /// Make new sessions fail their setup.
    pub fn set_accepts_login(&self, accepts: bool) {
        self.lock().accepts_login = accepts;
    }

    /// Change the run mode from outside, as the vendor app would.
    pub fn set_run_mode(&self, run_mode: impl Into<String>) {
        self.lock().run_mode = run_mode.into();
    }

    pub fn set_current_temperature(&self, temperature: f64) {
        self.lock().current = temperature;
    }

    #[must_use]
    pub fn run_mode(&self) -> String {
        self.lock().run_mode.clone()
    }

    #[must_use]
    pub fn target_temperature(&self) -> f64 {
        self.lock().target
    }

    fn with_reachable(
        &self,
        f: impl FnOnce(&mut RoomState) -> Result<(), WarmupError>,
    ) -> Result<(), DeviceError> {
        let mut state = self.lock();
        if !state.reachable {
            return Err(WarmupError::Unreachable.into());
        }
        f(&mut state).map_err(Into::into)
    }
}

/// [`ThermostatHandle`] bound to a [`SimulatedRoom`].
#[derive(Debug)]
pub struct SimulatedThermostat {
    room: SimulatedRoom,
    cached: RoomState,
}

impl ThermostatHandle for SimulatedThermostat {
    fn update(&mut self) -> Result<bool, DeviceError> {
        let state = self.room.lock();
        if !state.reachable {
            return Err(WarmupError::Unreachable.into());
        }
        if state.fetch_failing {
            return Ok(false);
        }
        self.cached = state.clone();
        Ok(true)
    }

    fn run_mode(&self) -> String {
        self.cached.run_mode.clone()
    }

    fn current_temperature(&self) -> f64 {
        self.cached.current
    }

    fn target_temperature(&self) -> f64 {
        self.cached.target
    }

    fn target_temperature_bounds(&self) -> (f64, f64) {
        self.cached.bounds
    }

    fn set_new_temperature(&mut self, temperature: f64) -> Result<(), DeviceError> {
        self.room.with_reachable(|state| {
            let (min, max) = state.bounds;
            if !(min..=max).contains(&temperature) {
                return Err(WarmupError::TemperatureOutOfRange {
                    value: temperature,
                    min,
                    max,
                });
            }
            state.manual_target = temperature;
            state.target = temperature;
            state.run_mode = "fixed".to_string();
            Ok(())
        })
    }

    fn set_temperature_to_manual(&mut self) -> Result<(), DeviceError> {
        self.room.with_reachable(|state| {
            state.target = state.manual_target;
            state.run_mode = "fixed".to_string();
            Ok(())
        })
    }

    fn set_temperature_to_auto(&mut self) -> Result<(), DeviceError> {
        self.room.with_reachable(|state| {
            state.target = PROGRAM_TARGET;
            state.run_mode = "prog".to_string();
            Ok(())
        })
    }

    fn set_location_to_frost(&mut self) -> Result<(), DeviceError> {
        self.room.with_reachable(|state| {
            state.target = FROST_TARGET;
            state.run_mode = "frost".to_string();
            Ok(())
        })
    }

    fn set_location_to_off(&mut self) -> Result<(), DeviceError> {
        self.room.with_reachable(|state| {
            state.run_mode = "off".to_string();
            Ok(())
        })
    }
}

/// [`ThermostatConnector`] opening sessions on one [`SimulatedRoom`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedConnector {
    room: SimulatedRoom,
}

impl SimulatedConnector {
    #[must_use]
    pub fn new(room: SimulatedRoom) -> Self {
        Self { room }
    }

    #[must_use]
    pub fn room(&self) -> &SimulatedRoom {
        &self.room
    }
}

impl ThermostatConnector for SimulatedConnector {
    type Handle = SimulatedThermostat;

    fn connect(&self, config: &ThermostatConfig) -> Result<SimulatedThermostat, DeviceError> {
        let mut state = self.room.lock();
        if !state.reachable {
            return Err(WarmupError::Unreachable.into());
        }
        if !state.accepts_login {
            return Err(WarmupError::SetupIncomplete.into());
        }
        if state.location != config.location || state.room != config.room {
            return Err(WarmupError::RoomNotFound {
                location: config.location.clone(),
                room: config.room.clone(),
            }
            .into());
        }
        state.manual_target = config.target_temp;
        tracing::debug!(location = %config.location, room = %config.room, "simulated session ready");
        Ok(SimulatedThermostat {
            room: self.room.clone(),
            cached: state.clone(),
        })
    }
}
