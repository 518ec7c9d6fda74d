use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dalgona::challenge::Outcome;
use dalgona::config::Config;
use dalgona::flow::{FlowStage, SessionFlow};
use dalgona::runtime::{FixedClock, KioskEvent, Runner, ScriptedEvents};
use dalgona::scene::Scene;
use dalgona::variant::Variant;

const FRAME_SECS: f64 = 0.25;

fn quick_config() -> Config {
    Config {
        hold_secs: 0.5,
        time_limit_secs: 5.0,
        instruction_delay_secs: 0.5,
        result_show_delay_secs: 0.5,
        auto_transition_delay_secs: 0.5,
        auto_reset_delay_secs: 0.5,
        video_secs: 0.5,
        ..Config::default()
    }
}

fn press(code: KeyCode) -> KioskEvent {
    KioskEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn scripted(events: impl IntoIterator<Item = KioskEvent>) -> Runner<ScriptedEvents, FixedClock> {
    Runner::new(
        ScriptedEvents::new(events),
        FixedClock::new(FRAME_SECS, 1.0),
        Duration::ZERO,
    )
}

// Drives SessionFlow through Runner/ScriptedEvents the way the kiosk loop
// does, with a fixed frame delta per step instead of the wall clock.
#[test]
fn headless_session_plays_through_and_resets() {
    let mut flow = SessionFlow::new(&quick_config(), Scene::new(0.5));
    let mut runner = scripted([press(KeyCode::Enter), press(KeyCode::Char('2'))]);

    let mut seen = vec![flow.stage()];
    let mut needle = 0usize;
    for _ in 0..400u32 {
        let frame = runner.step().unwrap();
        if let Some(KioskEvent::Key(key)) = frame.event {
            match key.code {
                KeyCode::Enter => {
                    flow.advance_stage();
                }
                KeyCode::Char(c) => {
                    flow.select_index(c as i64 - '1' as i64);
                }
                _ => {}
            }
        }

        flow.frame(frame.dt);

        if flow.stage() == FlowStage::Selection
            && flow.selection().variant() == Variant::ALL[1]
            && runner.events_mut().is_empty()
        {
            runner.events_mut().push(press(KeyCode::Enter));
        }
        if flow.stage() == FlowStage::Challenge {
            let targets = flow.challenge().tracker().targets().to_vec();
            if flow.challenge().tracker().engaged().is_none() && needle < targets.len() {
                flow.on_probe_enter(targets[needle]);
                needle += 1;
            }
        }

        if seen.last() != Some(&flow.stage()) {
            seen.push(flow.stage());
        }
        if seen.len() > 1 && flow.stage() == FlowStage::Intro {
            break;
        }
    }

    assert_eq!(
        seen,
        vec![
            FlowStage::Intro,
            FlowStage::Instruction,
            FlowStage::Selection,
            FlowStage::Challenge,
            FlowStage::ResultPending,
            FlowStage::ResultShown,
            FlowStage::ResettingDelay,
            FlowStage::Intro,
        ]
    );
    assert_eq!(needle, 4, "circle has four points");
}

#[test]
fn video_end_delay_counts_from_the_next_frame() {
    let config = Config {
        video_secs: 1.0,
        instruction_delay_secs: 1.0,
        ..quick_config()
    };
    let mut flow = SessionFlow::new(&config, Scene::new(config.video_secs));
    let mut runner = Runner::new(
        ScriptedEvents::new([press(KeyCode::Enter)]),
        FixedClock::new(1.0, 1.0),
        Duration::ZERO,
    );

    let mut stages = Vec::new();
    for _ in 0..3 {
        let frame = runner.step().unwrap();
        if frame.event.is_some() {
            flow.advance_stage();
        }
        flow.frame(frame.dt);
        stages.push(flow.stage());
    }

    // the clip ends at t=1.0; the one second delay only elapses at t=2.0
    assert_eq!(
        stages,
        vec![
            FlowStage::Instruction,
            FlowStage::Selection,
            FlowStage::Selection
        ]
    );
}

#[test]
fn headless_idle_challenge_times_out() {
    let mut flow = SessionFlow::new(&quick_config(), Scene::new(0.5));
    flow.advance_stage();
    flow.advance_stage();
    flow.advance_stage();
    assert_eq!(flow.stage(), FlowStage::Challenge);

    let mut runner = scripted([]);

    for _ in 0..100u32 {
        let frame = runner.step().unwrap();
        assert_eq!(frame.event, None);
        flow.frame(frame.dt);
        if flow.stage() != FlowStage::Challenge {
            break;
        }
    }

    assert_eq!(flow.stage(), FlowStage::ResultPending);
    assert_eq!(flow.last_result(), Some((Variant::default(), Outcome::Failure)));
}
