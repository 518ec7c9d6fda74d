//! Narrow contract between the session core and whatever renders it.
//!
//! The core never owns a visual. It only flips visibility of named scene
//! objects and sends fire-and-forget commands to effects, the needle prop and
//! the instruction video. Every command is idempotent on the host side.

use crate::error::HostError;
use crate::variant::Variant;

/// Everything the core toggles with `set_active`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SceneObject {
    IntroPanel,
    InstructionPanel,
    SelectionPanel,
    ChallengePanel,
    ResultPanel,
    ResultSuccess,
    ResultFail,
    /// Objects handed over to the next kiosk flow after a result
    NextFlow,
    SelectMarker(Variant),
    PointSet(Variant),
    GamePanel(Variant),
    SuccessPieces(Variant),
    FailObject(Variant),
    ExtraObject(Variant),
}

impl SceneObject {
    /// The four step panels, in flow order
    pub const STEP_PANELS: [SceneObject; 4] = [
        SceneObject::IntroPanel,
        SceneObject::InstructionPanel,
        SceneObject::SelectionPanel,
        SceneObject::ChallengePanel,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum EffectTarget {
    /// Success pieces sliding apart
    PieceMove(Variant),
    /// Failed candy tilting over
    PieceTilt(Variant),
    Shake,
    /// Debris spawned under the needle while a point is held
    Debris,
    /// Decorative countdown dial
    TimerDial,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum EffectCommand {
    Play,
    Stop,
    Reset,
}

/// Commands the core issues to its collaborators.
///
/// An `Err` means the collaborator is not wired; the core logs it and keeps
/// going.
pub trait Host {
    fn set_active(&mut self, object: SceneObject, active: bool) -> Result<(), HostError>;
    fn effect(&mut self, target: EffectTarget, command: EffectCommand) -> Result<(), HostError>;
    /// Disable dragging and park the needle at its rest position
    fn lock_prop(&mut self) -> Result<(), HostError>;
    fn reset_prop(&mut self) -> Result<(), HostError>;
    /// Rewind and replay the instruction video
    fn reset_video(&mut self) -> Result<(), HostError>;
}

/// Logs an unwired collaborator and carries on.
pub(crate) fn skip_unwired(result: Result<(), HostError>) {
    if let Err(err) = result {
        log::warn!("{err}, skipped");
    }
}
