//! Arcade flight model: discrete controls in, exaggerated but readable
//! aircraft motion out.
//!
//! Yaw is integrated directly from input. Pitch and roll chase target
//! values through an exponential blend and level out when released. A
//! climbing turn is a separate banked-turn regime with steeper roll and a
//! faster yaw rate. Rotation and throttle steps are per frame by default
//! (see [`Smoothing`]).

use std::f32::consts::{FRAC_PI_3, TAU};

use engine_core::{Orientation, Transform};
use glam::Vec3;
use input::{ControlSource, FlightControl};

use crate::config::{FlightTuning, Smoothing, MODEL_COUNT};
use crate::control_surfaces::ControlDeflections;
use crate::error::SimError;

/// Pitch is held inside +/- this many radians.
pub const PITCH_LIMIT: f32 = FRAC_PI_3;

/// Kinematic state of one aircraft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AircraftState {
    pub position: Vec3,
    pub orientation: Orientation,
    /// Displacement applied this frame (already scaled by dt).
    pub velocity: Vec3,
    /// 0..=1
    pub throttle: f32,
    /// Selected model, 1..=5.
    pub model: u8,
    /// Set while the banked-turn regime is active this frame.
    pub banked_turn: bool,
}

/// Signed control axes read this frame, each -1, 0 or 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ControlAxes {
    pitch: f32,
    yaw: f32,
    roll: f32,
}

pub struct FlightModel {
    state: AircraftState,
    tuning: FlightTuning,
    max_speed: f32,
    target_pitch: f32,
    target_roll: f32,
    accelerating: bool,
    decelerating: bool,
    axes: ControlAxes,
    pose: Transform,
}

impl FlightModel {
    pub fn new(tuning: FlightTuning) -> Self {
        let max_speed = tuning.model_speeds[0];
        let position = tuning.spawn_position;
        Self {
            state: AircraftState {
                position,
                orientation: Orientation::ZERO,
                velocity: Vec3::ZERO,
                throttle: 0.0,
                model: 1,
                banked_turn: false,
            },
            tuning,
            max_speed,
            target_pitch: 0.0,
            target_roll: 0.0,
            accelerating: false,
            decelerating: false,
            axes: ControlAxes::default(),
            pose: Transform::from_position(position),
        }
    }

    /// Run one frame: input, rotation, physics, transform.
    pub fn advance(&mut self, controls: &impl ControlSource, dt: f32) -> Result<(), SimError> {
        self.handle_input(controls);
        self.integrate_rotation(dt);
        self.update_physics(dt);
        self.update_transform();
        self.check_finite()
    }

    /// Read controls. Sets pitch/roll targets and yaws immediately. A climb
    /// combined with a single turn direction takes priority over single-axis
    /// handling.
    pub fn handle_input(&mut self, controls: &impl ControlSource) {
        self.accelerating = controls.is_pressed(FlightControl::ThrottleUp);
        self.decelerating = controls.is_pressed(FlightControl::ThrottleDown);

        let yaw = axis(
            controls.is_pressed(FlightControl::YawLeft),
            controls.is_pressed(FlightControl::YawRight),
        );
        let pitch = axis(
            controls.is_pressed(FlightControl::PitchUp),
            controls.is_pressed(FlightControl::PitchDown),
        );

        let t = &self.tuning;
        let banked = pitch > 0.0 && yaw != 0.0;
        if banked {
            self.target_roll = yaw * t.banked_roll;
            self.target_pitch = t.pitch_target;
            self.state.orientation.yaw += yaw * t.yaw_rate * t.banked_yaw_multiplier;
        } else {
            self.target_roll = yaw * t.roll_target;
            self.target_pitch = pitch * t.pitch_target;
            self.state.orientation.yaw += yaw * t.yaw_rate;
        }
        self.state.orientation.yaw = self.state.orientation.yaw.rem_euclid(TAU);
        self.state.banked_turn = banked;
        self.axes = ControlAxes {
            pitch,
            yaw,
            roll: yaw,
        };

        if let Some(id) = controls.selected_model() {
            if id != self.state.model {
                if let Err(e) = self.set_model_type(id) {
                    log::debug!("Model select ignored: {}", e);
                }
            }
        }
    }

    /// Ease pitch and roll toward their targets and clamp pitch.
    pub fn integrate_rotation(&mut self, dt: f32) {
        let blend = self.tuning.smoothing.blend(self.tuning.blend, dt);
        let o = &mut self.state.orientation;
        o.pitch += (self.target_pitch - o.pitch) * blend;
        o.roll += (self.target_roll - o.roll) * blend;
        o.pitch = o.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Step throttle and derive this frame's displacement. No mass or force
    /// model: speed follows throttle directly, lift is a flat climb term and
    /// gravity a flat sink.
    pub fn update_physics(&mut self, dt: f32) {
        let t = &self.tuning;
        if self.accelerating {
            self.state.throttle += t.throttle_step;
        } else if self.decelerating {
            self.state.throttle -= t.throttle_step;
        }
        self.state.throttle = self.state.throttle.clamp(0.0, 1.0);

        let forward = self.state.orientation.forward();
        let mut velocity = forward * (self.max_speed * self.state.throttle) * t.speed_multiplier;
        if self.state.throttle > t.lift_threshold {
            velocity.y += (self.state.throttle - t.lift_threshold) * t.lift_factor;
        }
        velocity.y -= t.gravity;
        self.state.velocity = velocity * dt;
    }

    /// Apply this frame's displacement and publish the renderable pose.
    /// The ground is a hard floor: touching it zeroes vertical motion.
    pub fn update_transform(&mut self) {
        self.state.position += self.state.velocity;
        if self.state.position.y < self.tuning.ground_height {
            self.state.position.y = self.tuning.ground_height;
            self.state.velocity.y = 0.0;
        }
        self.pose = Transform::from_position_orientation(self.state.position, self.state.orientation);
    }

    /// Return to the spawn pose with zero velocity, attitude, and throttle.
    pub fn reset_state(&mut self) {
        self.state.position = self.tuning.spawn_position;
        self.state.velocity = Vec3::ZERO;
        self.state.orientation = Orientation::ZERO;
        self.state.throttle = 0.0;
        self.state.banked_turn = false;
        self.target_pitch = 0.0;
        self.target_roll = 0.0;
        self.accelerating = false;
        self.decelerating = false;
        self.axes = ControlAxes::default();
        self.pose = Transform::from_position(self.state.position);
    }

    /// Switch aircraft model. Ids outside 1..=5 leave the current model in place.
    pub fn set_model_type(&mut self, id: u8) -> Result<(), SimError> {
        if !(1..=MODEL_COUNT as u8).contains(&id) {
            log::warn!("Ignoring invalid aircraft model {}, keeping {}", id, self.state.model);
            return Err(SimError::InvalidModelSelection(id));
        }
        self.state.model = id;
        self.max_speed = self.tuning.model_speeds[usize::from(id) - 1];
        log::info!("Aircraft model {} selected (max speed {})", id, self.max_speed);
        Ok(())
    }

    /// Place the aircraft without touching attitude or throttle.
    pub fn teleport(&mut self, position: Vec3) {
        self.state.position = position;
        self.pose.position = position;
    }

    /// Muzzle position and firing direction for the current pose.
    pub fn muzzle(&self, offset: f32) -> (Vec3, Vec3) {
        let forward = self.state.orientation.forward();
        (self.state.position + forward * offset, forward)
    }

    /// Control-surface deflections implied by this frame's input.
    pub fn control_deflections(&self) -> ControlDeflections {
        ControlDeflections::from_axes(self.axes.pitch, self.axes.roll, self.axes.yaw)
    }

    pub fn state(&self) -> &AircraftState {
        &self.state
    }

    pub fn pose(&self) -> &Transform {
        &self.pose
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn smoothing(&self) -> Smoothing {
        self.tuning.smoothing
    }

    fn check_finite(&self) -> Result<(), SimError> {
        if !self.state.position.is_finite() {
            return Err(SimError::NonFiniteState("aircraft position"));
        }
        if !self.state.orientation.is_finite() {
            return Err(SimError::NonFiniteState("aircraft orientation"));
        }
        Ok(())
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
