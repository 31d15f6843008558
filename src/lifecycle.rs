//! Loop state machine and ownership of the particle field
//!
//! Valid transitions only: Stopped -> Running (mount), Running -> Suspended
//! (out of view), Suspended -> Running (back in view), and -> Stopped on
//! unmount. A resize never changes the loop state, only the particle set.

use egui::Vec2;
use rand::Rng;

use crate::config::FieldConfig;
use crate::field::ParticleField;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
    Suspended,
}

/// Owns the particle field and the latest pointer position. Multiple
/// instances are independent; there is no shared state between them.
pub struct FieldLifecycle {
    field: ParticleField,
    state: LoopState,
    pointer: Option<Vec2>,
}

impl FieldLifecycle {
    pub fn new() -> Self {
        Self {
            field: ParticleField::new(0.0, 0.0),
            state: LoopState::Stopped,
            pointer: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Size the field, build the particle set and start the loop. Only valid
    /// from `Stopped`; a repeated mount is ignored.
    pub fn mount(&mut self, width: f32, height: f32, config: &FieldConfig, rng: &mut impl Rng) {
        if self.state != LoopState::Stopped {
            log::warn!("mount ignored in state {:?}", self.state);
            return;
        }
        self.field = ParticleField::new(width, height);
        self.field.init(config, rng);
        self.state = LoopState::Running;
        log::debug!(
            "mounted {}x{} with {} particles",
            width,
            height,
            self.field.particles.len()
        );
    }

    /// Rebuild the particle set for new dimensions. The old set is discarded
    /// wholesale; the loop state is untouched.
    pub fn resize(&mut self, width: f32, height: f32, config: &FieldConfig, rng: &mut impl Rng) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.field = ParticleField::new(width, height);
        self.field.init(config, rng);
        log::debug!(
            "resized to {}x{}, {} particles",
            width,
            height,
            self.field.particles.len()
        );
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
    }

    /// Repulsion is inert until the pointer re-enters.
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// Visibility gating: suspend the cadence when out of view, resume when
    /// back. Particle state is preserved exactly across suspension.
    pub fn set_visible(&mut self, visible: bool) {
        match (self.state, visible) {
            (LoopState::Running, false) => {
                self.state = LoopState::Suspended;
                log::debug!("suspended");
            }
            (LoopState::Suspended, true) => {
                self.state = LoopState::Running;
                log::debug!("resumed");
            }
            _ => {}
        }
    }

    /// Stop the loop and release the pointer. Valid from `Running` and, for
    /// teardown robustness, also from `Suspended`.
    pub fn unmount(&mut self) {
        if self.state != LoopState::Stopped {
            self.state = LoopState::Stopped;
            self.pointer = None;
            log::debug!("unmounted");
        }
    }

    /// Advance one frame. Does nothing unless the loop is running.
    pub fn tick(&mut self, config: &FieldConfig, rng: &mut impl Rng) {
        if self.state != LoopState::Running {
            return;
        }
        self.field.step(config, self.pointer, rng);
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }
}

impl Default for FieldLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
