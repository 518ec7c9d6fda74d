//! Top-level session flow of the kiosk.
//!
//! ```text
//! Intro -> Instruction -(video + delay)-> Selection -> Challenge
//!   -> ResultPending -(delay)-> ResultShown -(delay)-> Transitioning
//!   -(delay)-> ResettingDelay -> full reset -> Intro
//! ```
//!
//! Button presses call [`SessionFlow::advance_stage`] / [`SessionFlow::select`],
//! the host forwards frame deltas to [`SessionFlow::tick`], and every delayed
//! arrow is a [`PendingTimers`] slot that a reset can cancel at any point.

use crate::challenge::{Challenge, ChallengeEvent, Outcome};
use crate::config::Config;
use crate::host::{skip_unwired, EffectCommand, EffectTarget, Host, SceneObject};
use crate::selection::SelectionState;
use crate::timers::{PendingTimers, TimerKind};
use crate::variant::{PointId, Variant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum FlowStage {
    Intro,
    Instruction,
    Selection,
    Challenge,
    ResultPending,
    ResultShown,
    Transitioning,
    ResettingDelay,
}

impl FlowStage {
    /// Any stage of the automated result sequence
    pub fn is_presenting_result(self) -> bool {
        matches!(
            self,
            FlowStage::ResultPending
                | FlowStage::ResultShown
                | FlowStage::Transitioning
                | FlowStage::ResettingDelay
        )
    }

    /// Step panel shown for this stage. Result stages keep the challenge panel.
    pub fn step_panel(self) -> SceneObject {
        match self {
            FlowStage::Intro => SceneObject::IntroPanel,
            FlowStage::Instruction => SceneObject::InstructionPanel,
            FlowStage::Selection => SceneObject::SelectionPanel,
            _ => SceneObject::ChallengePanel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowDelays {
    pub instruction: f64,
    pub result_show: f64,
    pub auto_transition: f64,
    pub auto_reset: f64,
}

impl From<&Config> for FlowDelays {
    fn from(config: &Config) -> Self {
        Self {
            instruction: config.instruction_delay_secs,
            result_show: config.result_show_delay_secs,
            auto_transition: config.auto_transition_delay_secs,
            auto_reset: config.auto_reset_delay_secs,
        }
    }
}

pub struct SessionFlow<H: Host> {
    host: H,
    stage: FlowStage,
    timers: PendingTimers,
    selection: SelectionState,
    challenge: Challenge,
    delays: FlowDelays,
    enable_auto_reset: bool,
    last_result: Option<(Variant, Outcome)>,
}

impl<H: Host> SessionFlow<H> {
    pub fn new(config: &Config, host: H) -> Self {
        let mut flow = Self {
            host,
            stage: FlowStage::Intro,
            timers: PendingTimers::new(),
            selection: SelectionState::from_config(config),
            challenge: Challenge::from_config(config),
            delays: FlowDelays::from(config),
            enable_auto_reset: config.enable_auto_reset,
            last_result: None,
        };
        flow.selection.reset(&mut flow.host, &mut flow.challenge);
        flow.show_step(FlowStage::Intro);
        flow.hide_result_panel();
        flow.hide_all_dalgona_results();
        flow.set_next_flow(false);
        flow
    }

    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn timers(&self) -> &PendingTimers {
        &self.timers
    }

    pub fn last_result(&self) -> Option<(Variant, Outcome)> {
        self.last_result
    }

    /// Button input is swallowed while the result cinematic runs.
    pub fn is_showing_result(&self) -> bool {
        matches!(
            self.stage,
            FlowStage::ResultPending | FlowStage::ResettingDelay
        )
    }

    pub fn is_waiting_for_instruction_advance(&self) -> bool {
        self.timers.is_pending(TimerKind::InstructionAdvance)
    }

    /// The per-step "next" button. Returns whether the stage changed.
    pub fn advance_stage(&mut self) -> bool {
        if self.is_showing_result() {
            log::debug!("button ignored while a result is presented");
            return false;
        }

        match self.stage {
            FlowStage::Intro => {
                self.enter_step(FlowStage::Instruction);
                skip_unwired(self.host.reset_video());
                true
            }
            FlowStage::Instruction if self.is_waiting_for_instruction_advance() => {
                log::debug!("button ignored while waiting for the automatic advance");
                false
            }
            FlowStage::Instruction => {
                self.enter_step(FlowStage::Selection);
                true
            }
            FlowStage::Selection => {
                self.start_challenge();
                true
            }
            stage => {
                log::debug!("no button advance from {stage}");
                false
            }
        }
    }

    /// Video collaborator callback: the instruction clip reached its end.
    pub fn on_video_finished(&mut self) {
        if self.stage != FlowStage::Instruction {
            log::debug!("video finished during {}, ignored", self.stage);
            return;
        }
        log::info!(
            "instruction video finished, selection in {:.1}s",
            self.delays.instruction
        );
        self.timers
            .start(TimerKind::InstructionAdvance, self.delays.instruction);
    }

    pub fn select(&mut self, variant: Variant) -> bool {
        if self.stage.is_presenting_result() || self.stage == FlowStage::Challenge {
            log::debug!("selection ignored during {}", self.stage);
            return false;
        }
        self.selection
            .select(variant, &mut self.host, &mut self.challenge);
        true
    }

    /// Selection from a raw button index; out-of-range values fall back to 0.
    pub fn select_index(&mut self, index: i64) -> bool {
        self.select(Variant::new(index))
    }

    pub fn on_probe_enter(&mut self, point: PointId) {
        if self.stage != FlowStage::Challenge {
            return;
        }
        if let Some(event) = self.challenge.on_probe_enter(point) {
            self.handle_challenge_event(event);
        }
    }

    pub fn on_probe_exit(&mut self, point: PointId) {
        if self.stage != FlowStage::Challenge {
            return;
        }
        if let Some(event) = self.challenge.on_probe_exit(point) {
            self.handle_challenge_event(event);
        }
    }

    /// One frame. Due timers fire first, then the challenge advances.
    pub fn tick(&mut self, dt: f64) {
        for token in self.timers.advance(dt) {
            if !self.timers.is_current(token) {
                log::debug!("stale {} timer dropped", token.kind);
                continue;
            }
            self.fire(token.kind);
        }

        if self.stage == FlowStage::Challenge {
            for event in self.challenge.tick(dt) {
                self.handle_challenge_event(event);
            }
        }
    }

    /// Ends the attempt, locks the needle, plays the result animation for
    /// `variant` and starts the countdown to the result panel. A repeated
    /// report supersedes the pending one.
    pub fn report_outcome(&mut self, variant: Variant, outcome: Outcome) {
        log::info!("game {outcome} on variant {variant}");
        self.last_result = Some((variant, outcome));

        if let Some(event) = self.challenge.finish(outcome) {
            log::debug!("{event:?} on report");
        }
        skip_unwired(self.host.effect(EffectTarget::Debris, EffectCommand::Stop));
        skip_unwired(self.host.effect(EffectTarget::TimerDial, EffectCommand::Stop));
        skip_unwired(self.host.lock_prop());
        skip_unwired(self.host.set_active(SceneObject::GamePanel(variant), false));
        self.show_dalgona_result(variant, outcome);

        self.timers
            .start(TimerKind::ResultShow, self.delays.result_show);
        self.stage = FlowStage::ResultPending;
    }

    /// Back to the intro from anywhere, with every timer cancelled.
    pub fn full_reset(&mut self) {
        log::info!("full reset from {}", self.stage);
        self.timers.cancel_all();

        self.selection.reset(&mut self.host, &mut self.challenge);
        self.challenge.reset();
        skip_unwired(self.host.effect(EffectTarget::TimerDial, EffectCommand::Reset));
        skip_unwired(self.host.effect(EffectTarget::Debris, EffectCommand::Stop));
        skip_unwired(self.host.reset_prop());
        skip_unwired(self.host.reset_video());

        for v in Variant::ALL {
            skip_unwired(self.host.set_active(SceneObject::GamePanel(v), false));
        }
        self.hide_result_panel();
        self.hide_all_dalgona_results();
        self.set_next_flow(false);
        self.reset_piece_effects();
        skip_unwired(self.host.effect(EffectTarget::Shake, EffectCommand::Reset));

        self.last_result = None;
        self.enter_step(FlowStage::Intro);
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::InstructionAdvance => {
                if self.stage == FlowStage::Instruction {
                    self.enter_step(FlowStage::Selection);
                }
            }
            TimerKind::ResultShow => self.show_result(),
            TimerKind::AutoTransition => self.execute_transition(),
            TimerKind::AutoReset => {
                log::info!("auto reset");
                self.full_reset();
            }
        }
    }

    fn handle_challenge_event(&mut self, event: ChallengeEvent) {
        match event {
            ChallengeEvent::Engaged(_) => {
                skip_unwired(self.host.effect(EffectTarget::Debris, EffectCommand::Play));
            }
            ChallengeEvent::Released(_) | ChallengeEvent::PointCompleted(_) => {
                skip_unwired(self.host.effect(EffectTarget::Debris, EffectCommand::Stop));
            }
            ChallengeEvent::SetCompleted => self.finish_challenge(Outcome::Success),
            ChallengeEvent::TimeExpired => self.finish_challenge(Outcome::Failure),
        }
    }

    fn finish_challenge(&mut self, outcome: Outcome) {
        let variant = self.selection.variant();
        self.report_outcome(variant, outcome);
    }

    fn start_challenge(&mut self) {
        let variant = self.selection.variant();
        self.enter_step(FlowStage::Challenge);
        skip_unwired(self.host.set_active(SceneObject::GamePanel(variant), true));
        self.challenge.start();
        skip_unwired(self.host.effect(EffectTarget::TimerDial, EffectCommand::Play));
    }

    fn show_result(&mut self) {
        let Some((_, outcome)) = self.last_result else {
            log::warn!("result timer fired without an outcome");
            return;
        };

        skip_unwired(self.host.set_active(SceneObject::ResultPanel, true));
        let success = outcome == Outcome::Success;
        skip_unwired(self.host.set_active(SceneObject::ResultSuccess, success));
        skip_unwired(self.host.set_active(SceneObject::ResultFail, !success));
        log::info!("result panel shown: {outcome}");

        self.stage = FlowStage::ResultShown;
        self.timers
            .start(TimerKind::AutoTransition, self.delays.auto_transition);
    }

    fn execute_transition(&mut self) {
        log::info!("handing over to the next flow");
        self.hide_all_dalgona_results();
        self.hide_result_panel();
        self.reset_piece_effects();
        self.set_next_flow(true);
        self.stage = FlowStage::Transitioning;

        if self.enable_auto_reset {
            self.timers
                .start(TimerKind::AutoReset, self.delays.auto_reset);
            self.stage = FlowStage::ResettingDelay;
        }
    }

    fn enter_step(&mut self, stage: FlowStage) {
        log::info!("{} -> {}", self.stage, stage);
        self.show_step(stage);
        self.stage = stage;
    }

    fn show_step(&mut self, stage: FlowStage) {
        let shown = stage.step_panel();
        for panel in SceneObject::STEP_PANELS {
            skip_unwired(self.host.set_active(panel, panel == shown));
        }
    }

    fn show_dalgona_result(&mut self, variant: Variant, outcome: Outcome) {
        self.hide_all_dalgona_results();
        match outcome {
            Outcome::Success => {
                skip_unwired(self.host.set_active(SceneObject::SuccessPieces(variant), true));
                skip_unwired(self.host.effect(EffectTarget::PieceMove(variant), EffectCommand::Play));
            }
            Outcome::Failure => {
                skip_unwired(self.host.set_active(SceneObject::FailObject(variant), true));
                skip_unwired(self.host.effect(EffectTarget::PieceTilt(variant), EffectCommand::Play));
            }
        }
        skip_unwired(self.host.set_active(SceneObject::ExtraObject(variant), true));
    }

    fn hide_all_dalgona_results(&mut self) {
        for v in Variant::ALL {
            skip_unwired(self.host.set_active(SceneObject::SuccessPieces(v), false));
            skip_unwired(self.host.set_active(SceneObject::FailObject(v), false));
            skip_unwired(self.host.set_active(SceneObject::ExtraObject(v), false));
        }
    }

    fn reset_piece_effects(&mut self) {
        for v in Variant::ALL {
            skip_unwired(self.host.effect(EffectTarget::PieceMove(v), EffectCommand::Reset));
            skip_unwired(self.host.effect(EffectTarget::PieceTilt(v), EffectCommand::Reset));
        }
    }

    fn hide_result_panel(&mut self) {
        skip_unwired(self.host.set_active(SceneObject::ResultPanel, false));
        skip_unwired(self.host.set_active(SceneObject::ResultSuccess, false));
        skip_unwired(self.host.set_active(SceneObject::ResultFail, false));
    }

    fn set_next_flow(&mut self, active: bool) {
        skip_unwired(self.host.set_active(SceneObject::NextFlow, active));
    }
}
