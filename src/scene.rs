//! In-memory [`Host`] used by the terminal kiosk, the headless autoplay and
//! the tests. It keeps the visibility of every scene object, the state of
//! each effect, the needle prop and the instruction video, plus a journal of
//! every command it received.

use std::collections::{HashMap, HashSet};

use crate::error::HostError;
use crate::flow::SessionFlow;
use crate::host::{EffectCommand, EffectTarget, Host, SceneObject};

/// Length of the instruction clip when none is configured
pub const DEFAULT_VIDEO_SECS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    SetActive(SceneObject, bool),
    Effect(EffectTarget, EffectCommand),
    LockProp,
    ResetProp,
    ResetVideo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectState {
    #[default]
    Idle,
    Playing,
    Stopped,
}

#[derive(Debug)]
pub struct Scene {
    visible: HashMap<SceneObject, bool>,
    effects: HashMap<EffectTarget, EffectState>,
    unwired: HashSet<SceneObject>,
    unwired_effects: HashSet<EffectTarget>,
    prop_locked: bool,
    video_secs: f64,
    video_remaining: Option<f64>,
    journal: Vec<SceneCommand>,
}

impl Scene {
    pub fn new(video_secs: f64) -> Self {
        Self {
            visible: HashMap::new(),
            effects: HashMap::new(),
            unwired: HashSet::new(),
            unwired_effects: HashSet::new(),
            prop_locked: false,
            video_secs,
            video_remaining: None,
            journal: Vec::new(),
        }
    }

    /// Marks objects as missing from the scene; commands to them fail.
    pub fn with_unwired(mut self, objects: impl IntoIterator<Item = SceneObject>) -> Self {
        self.unwired.extend(objects);
        self
    }

    pub fn with_unwired_effects(mut self, targets: impl IntoIterator<Item = EffectTarget>) -> Self {
        self.unwired_effects.extend(targets);
        self
    }

    pub fn is_active(&self, object: SceneObject) -> bool {
        self.visible.get(&object).copied().unwrap_or(false)
    }

    pub fn effect_state(&self, target: EffectTarget) -> EffectState {
        self.effects.get(&target).copied().unwrap_or_default()
    }

    pub fn is_prop_locked(&self) -> bool {
        self.prop_locked
    }

    pub fn is_video_playing(&self) -> bool {
        self.video_remaining.is_some()
    }

    pub fn video_remaining(&self) -> Option<f64> {
        self.video_remaining
    }

    pub fn journal(&self) -> &[SceneCommand] {
        &self.journal
    }

    pub fn count(&self, command: &SceneCommand) -> usize {
        self.journal.iter().filter(|c| *c == command).count()
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Advances video playback. Returns true on the frame the clip ends.
    pub fn tick(&mut self, dt: f64) -> bool {
        let Some(remaining) = self.video_remaining else {
            return false;
        };
        let left = remaining - dt;
        if left <= 0.0 {
            self.video_remaining = None;
            true
        } else {
            self.video_remaining = Some(left);
            false
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_SECS)
    }
}

impl Host for Scene {
    fn set_active(&mut self, object: SceneObject, active: bool) -> Result<(), HostError> {
        if self.unwired.contains(&object) {
            return Err(HostError::UnwiredObject(object));
        }
        self.journal.push(SceneCommand::SetActive(object, active));
        self.visible.insert(object, active);
        Ok(())
    }

    fn effect(&mut self, target: EffectTarget, command: EffectCommand) -> Result<(), HostError> {
        if self.unwired_effects.contains(&target) {
            return Err(HostError::UnwiredEffect(target));
        }
        self.journal.push(SceneCommand::Effect(target, command));
        let state = match command {
            EffectCommand::Play => EffectState::Playing,
            EffectCommand::Stop => EffectState::Stopped,
            EffectCommand::Reset => EffectState::Idle,
        };
        self.effects.insert(target, state);
        Ok(())
    }

    fn lock_prop(&mut self) -> Result<(), HostError> {
        self.journal.push(SceneCommand::LockProp);
        self.prop_locked = true;
        Ok(())
    }

    fn reset_prop(&mut self) -> Result<(), HostError> {
        self.journal.push(SceneCommand::ResetProp);
        self.prop_locked = false;
        Ok(())
    }

    fn reset_video(&mut self) -> Result<(), HostError> {
        self.journal.push(SceneCommand::ResetVideo);
        self.video_remaining = Some(self.video_secs.max(0.0));
        Ok(())
    }
}

impl SessionFlow<Scene> {
    /// One kiosk frame. The flow advances before the clip does, so a delay
    /// started by the clip ending runs from the next frame. Returns true on
    /// the frame the clip ended.
    pub fn frame(&mut self, dt: f64) -> bool {
        self.tick(dt);
        let finished = self.host_mut().tick(dt);
        if finished {
            self.on_video_finished();
        }
        finished
    }
}
