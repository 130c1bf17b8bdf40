//! Keyboard input handling and the flight control set.
//!
//! Raw winit key events are folded into `InputState`; once per frame the
//! game takes a `ControlSnapshot` through `KeyBindings`. The simulation only
//! ever asks a `ControlSource` whether a control is pressed.

use std::collections::{HashMap, HashSet};

/// Discrete controls the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightControl {
    ThrottleUp,
    ThrottleDown,
    YawLeft,
    YawRight,
    PitchUp,
    PitchDown,
    Fire,
    /// Select aircraft model 1..=5.
    SelectModel(u8),
}

impl FlightControl {
    /// Bit index inside a `ControlSnapshot`, or `None` for a model slot
    /// outside 1..=5.
    fn bit(self) -> Option<u16> {
        let index = match self {
            FlightControl::ThrottleUp => 0,
            FlightControl::ThrottleDown => 1,
            FlightControl::YawLeft => 2,
            FlightControl::YawRight => 3,
            FlightControl::PitchUp => 4,
            FlightControl::PitchDown => 5,
            FlightControl::Fire => 6,
            FlightControl::SelectModel(id @ 1..=5) => 6 + u16::from(id),
            FlightControl::SelectModel(_) => return None,
        };
        Some(1 << index)
    }
}

/// Query interface the simulation reads controls through.
pub trait ControlSource {
    fn is_pressed(&self, control: FlightControl) -> bool;

    /// First model slot held this frame, if any.
    fn selected_model(&self) -> Option<u8> {
        (1..=5).find(|&id| self.is_pressed(FlightControl::SelectModel(id)))
    }
}

/// Frozen control state for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlSnapshot {
    bits: u16,
}

impl ControlSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by scripted input and tests.
    pub fn with(mut self, control: FlightControl) -> Self {
        self.set(control, true);
        self
    }

    pub fn set(&mut self, control: FlightControl, pressed: bool) {
        if let Some(bit) = control.bit() {
            if pressed {
                self.bits |= bit;
            } else {
                self.bits &= !bit;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl ControlSource for ControlSnapshot {
    fn is_pressed(&self, control: FlightControl) -> bool {
        control.bit().is_some_and(|bit| self.bits & bit != 0)
    }
}

/// Maps physical keys to flight controls.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyCode, FlightControl>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = [
            (KeyCode::KeyW, FlightControl::ThrottleUp),
            (KeyCode::KeyS, FlightControl::ThrottleDown),
            (KeyCode::ArrowLeft, FlightControl::YawLeft),
            (KeyCode::ArrowRight, FlightControl::YawRight),
            (KeyCode::ArrowDown, FlightControl::PitchUp),
            (KeyCode::ArrowUp, FlightControl::PitchDown),
            (KeyCode::Space, FlightControl::Fire),
            (KeyCode::Digit1, FlightControl::SelectModel(1)),
            (KeyCode::Digit2, FlightControl::SelectModel(2)),
            (KeyCode::Digit3, FlightControl::SelectModel(3)),
            (KeyCode::Digit4, FlightControl::SelectModel(4)),
            (KeyCode::Digit5, FlightControl::SelectModel(5)),
        ];
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }
}

impl KeyBindings {
    /// Rebind a key. Any previous binding for that key is replaced.
    pub fn bind(&mut self, key: KeyCode, control: FlightControl) {
        if let Some(previous) = self.bindings.insert(key, control) {
            log::debug!("Rebound {:?}: {:?} -> {:?}", key, previous, control);
        }
    }

    pub fn control_for(&self, key: KeyCode) -> Option<FlightControl> {
        self.bindings.get(&key).copied()
    }
}

/// Manages keyboard state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Freeze the held keys into the controls they are bound to.
    pub fn snapshot(&self, bindings: &KeyBindings) -> ControlSnapshot {
        let mut snapshot = ControlSnapshot::new();
        for key in &self.keys_held {
            if let Some(control) = bindings.control_for(*key) {
                snapshot.set(control, true);
            }
        }
        snapshot
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;
