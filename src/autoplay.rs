//! Scripted, display-less run of one whole kiosk session.
//!
//! Used by `dalgona --headless` and by the integration tests to drive the
//! real flow with fixed frame deltas: watch the video, pick a variant, hold
//! each point (or let the clock run out) and wait for the auto reset.

use crate::challenge::Outcome;
use crate::config::Config;
use crate::flow::{FlowStage, SessionFlow};
use crate::runtime::{Clock, FixedClock};
use crate::scene::Scene;
use crate::variant::{PointId, Variant};

#[derive(Debug, Clone, Copy)]
pub struct AutoplayPlan {
    pub variant: Variant,
    /// Leave the points alone so the challenge times out
    pub fail: bool,
    /// Unscaled seconds per frame
    pub frame_secs: f64,
}

impl Default for AutoplayPlan {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            fail: false,
            frame_secs: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub lines: Vec<String>,
    pub outcome: Option<Outcome>,
    pub completed: Vec<PointId>,
    pub returned_to_intro: bool,
}

struct Driver {
    flow: SessionFlow<Scene>,
    clock: FixedClock,
    elapsed: f64,
    frames_left: u64,
    transcript: Transcript,
}

impl Driver {
    fn note(&mut self, line: String) {
        self.transcript
            .lines
            .push(format!("[{:>7.2}s] {line}", self.elapsed));
    }

    /// One frame; returns false once the frame budget is spent.
    fn frame(&mut self) -> bool {
        if self.frames_left == 0 {
            return false;
        }
        self.frames_left -= 1;

        let before = self.flow.stage();
        let completed_before = self.flow.challenge().tracker().completed_count();

        let dt = self.clock.delta();
        let video_finished = self.flow.frame(dt);
        self.elapsed += dt;
        if video_finished {
            self.note("instruction video finished".to_string());
        }

        let tracker = self.flow.challenge().tracker();
        if tracker.completed_count() > completed_before {
            let newest = tracker.completed().last().copied();
            if let Some(point) = newest {
                self.note(format!("{point} completed"));
            }
        }
        let after = self.flow.stage();
        if after != before {
            self.note(format!("{before} -> {after}"));
        }
        true
    }

    fn run_until(&mut self, done: impl Fn(&SessionFlow<Scene>) -> bool) -> bool {
        while !done(&self.flow) {
            if !self.frame() {
                return false;
            }
        }
        true
    }
}

pub fn run(config: &Config, plan: &AutoplayPlan) -> Transcript {
    let config = config.clone().sanitized();
    let mut clock = FixedClock::new(plan.frame_secs.max(0.001), config.time_scale);
    let dt = clock.delta();

    let budget_secs = config.video_secs
        + config.instruction_delay_secs
        + config.time_limit_secs
        + config.result_show_delay_secs
        + config.auto_transition_delay_secs
        + config.auto_reset_delay_secs
        + 10.0;

    let mut driver = Driver {
        flow: SessionFlow::new(&config, Scene::new(config.video_secs)),
        clock,
        elapsed: 0.0,
        frames_left: (budget_secs / dt).ceil() as u64 + 100,
        transcript: Transcript::default(),
    };

    driver.flow.advance_stage();
    driver.note(format!("{} -> {}", FlowStage::Intro, driver.flow.stage()));

    if !driver.run_until(|f| f.stage() == FlowStage::Selection) {
        driver.note("never reached the selection step".to_string());
        return driver.transcript;
    }

    driver.flow.select(plan.variant);
    driver.note(format!(
        "selected {} ({})",
        plan.variant,
        config.variant_name(plan.variant)
    ));
    driver.flow.advance_stage();
    driver.note(format!("{} -> {}", FlowStage::Selection, driver.flow.stage()));

    if !plan.fail {
        let targets = driver.flow.challenge().tracker().targets().to_vec();
        for point in targets {
            driver.flow.on_probe_enter(point);
            driver.run_until(|f| {
                f.challenge().is_terminal()
                    || f.challenge()
                        .tracker()
                        .point(point)
                        .map_or(true, |p| p.is_completed())
            });
            driver.flow.on_probe_exit(point);
            if driver.flow.challenge().is_terminal() {
                break;
            }
        }
    }

    driver.run_until(|f| f.stage() != FlowStage::Challenge);
    driver.transcript.outcome = driver.flow.challenge().outcome();
    driver.transcript.completed = driver.flow.challenge().tracker().completed();
    if let Some(outcome) = driver.transcript.outcome {
        let line = format!(
            "outcome {outcome}, {}/{} points",
            driver.transcript.completed.len(),
            driver.flow.challenge().tracker().targets().len()
        );
        driver.note(line);
    }

    if config.enable_auto_reset {
        driver.transcript.returned_to_intro =
            driver.run_until(|f| f.stage() == FlowStage::Intro);
    } else {
        driver.run_until(|f| f.stage() == FlowStage::Transitioning);
    }

    driver.transcript
}
