// End-to-end properties of the session flow, driven through the public API
// with the in-memory scene as host.

use assert_matches::assert_matches;
use dalgona::challenge::{
    Challenge, ChallengeEvent, ChallengeTimer, Outcome, PointProgressTracker, Rgb, TargetPoint,
};
use dalgona::config::Config;
use dalgona::flow::{FlowStage, SessionFlow};
use dalgona::host::SceneObject;
use dalgona::scene::{Scene, SceneCommand};
use dalgona::variant::{PointId, Variant};

const TRIANGLE: Variant = Variant::ALL[2];

fn config() -> Config {
    Config {
        hold_secs: 3.0,
        time_limit_secs: 60.0,
        instruction_delay_secs: 1.0,
        result_show_delay_secs: 1.0,
        auto_transition_delay_secs: 1.0,
        auto_reset_delay_secs: 1.0,
        ..Config::default()
    }
}

fn flow_in_challenge(variant: Variant) -> SessionFlow<Scene> {
    let mut flow = SessionFlow::new(&config(), Scene::default());
    flow.advance_stage();
    flow.advance_stage();
    flow.select(variant);
    flow.advance_stage();
    assert_eq!(flow.stage(), FlowStage::Challenge);
    flow
}

fn challenge(points: &[u32], hold_secs: f64, limit: f64) -> Challenge {
    let mut challenge = Challenge::new(
        PointProgressTracker::new(
            points.iter().map(|&id| TargetPoint::new(PointId(id), Rgb::WHITE)),
            hold_secs,
            Rgb::GREEN,
        ),
        ChallengeTimer::new(limit),
    );
    challenge.target(points.iter().copied().map(PointId).collect());
    challenge.start();
    challenge
}

#[test]
fn completed_count_never_decreases_and_freezes_when_terminal() {
    let mut c = challenge(&[1, 2, 3], 1.0, 5.0);
    let mut last = 0;

    // hop between points, sometimes leaving before the hold is reached
    let script = [1, 1, 2, 2, 2, 2, 3, 1, 3, 3, 3, 3, 3, 3];
    for id in script {
        c.on_probe_enter(PointId(id));
        c.tick(0.4);
        let now = c.tracker().completed_count();
        assert!(now >= last, "completed count went from {last} to {now}");
        last = now;
        if c.is_terminal() {
            break;
        }
    }

    assert!(c.is_terminal());
    let frozen = c.tracker().completed();
    c.on_probe_enter(PointId(3));
    assert!(c.tick(10.0).is_empty());
    assert_eq!(c.tracker().completed(), frozen);
}

#[test]
fn exiting_a_point_resets_its_hold() {
    let mut flow = flow_in_challenge(TRIANGLE);
    flow.on_probe_enter(PointId(20));
    flow.tick(2.5);
    assert_eq!(flow.challenge().tracker().hold_elapsed(), 2.5);

    flow.on_probe_exit(PointId(20));
    assert_eq!(flow.challenge().tracker().hold_elapsed(), 0.0);

    flow.on_probe_enter(PointId(20));
    flow.tick(2.5);
    assert_eq!(flow.challenge().tracker().completed_count(), 0);
}

#[test]
fn limit_before_last_completion_fails() {
    let mut c = challenge(&[1], 1.0, 2.0);
    c.tick(1.5);
    c.on_probe_enter(PointId(1));

    let events = c.tick(1.0);
    assert_matches!(
        events.as_slice(),
        [ChallengeEvent::Released(PointId(1)), ChallengeEvent::TimeExpired]
    );
    assert_eq!(c.outcome(), Some(Outcome::Failure));
    assert!(!events.contains(&ChallengeEvent::SetCompleted));
    assert!(c.tick(1.0).is_empty());
}

#[test]
fn last_completion_on_the_limit_tick_succeeds() {
    let mut c = challenge(&[1], 1.0, 1.0);
    c.on_probe_enter(PointId(1));

    let events = c.tick(1.0);
    assert_matches!(
        events.as_slice(),
        [ChallengeEvent::PointCompleted(PointId(1)), ChallengeEvent::SetCompleted]
    );
    assert_eq!(c.outcome(), Some(Outcome::Success));
}

#[test]
fn full_reset_from_every_stage_lands_on_intro() {
    let drivers: [fn(&mut SessionFlow<Scene>); 8] = [
        |_| {},
        |f| {
            f.advance_stage();
        },
        |f| {
            f.advance_stage();
            f.advance_stage();
        },
        |f| {
            f.advance_stage();
            f.advance_stage();
            f.advance_stage();
            f.on_probe_enter(PointId(0));
            f.tick(3.0);
        },
        |f| f.report_outcome(Variant::default(), Outcome::Success),
        |f| {
            f.report_outcome(Variant::default(), Outcome::Failure);
            f.tick(1.0);
        },
        |f| {
            f.advance_stage();
            f.on_video_finished();
        },
        |f| {
            f.report_outcome(Variant::default(), Outcome::Success);
            f.tick(1.0);
            f.tick(1.0);
        },
    ];

    for drive in drivers {
        let mut flow = SessionFlow::new(&config(), Scene::default());
        drive(&mut flow);
        let from = flow.stage();

        flow.full_reset();

        assert_eq!(flow.stage(), FlowStage::Intro, "reset from {from}");
        assert!(!flow.timers().any_pending(), "timers left after reset from {from}");
        assert_eq!(flow.challenge().tracker().completed_count(), 0);
        assert!(!flow.challenge().is_running());
        assert_eq!(flow.last_result(), None);
        assert!(flow.host().is_active(SceneObject::IntroPanel));
        assert!(!flow.host().is_active(SceneObject::NextFlow));
        assert!(!flow.host().is_prop_locked());

        // nothing scheduled before the reset may fire afterwards
        flow.tick(30.0);
        assert_eq!(flow.stage(), FlowStage::Intro, "late firing after reset from {from}");
    }
}

#[test]
fn three_point_scenario_ends_in_failure_with_two_done() {
    let mut flow = flow_in_challenge(TRIANGLE);
    let (a, b, c) = (PointId(20), PointId(21), PointId(22));

    flow.on_probe_enter(a);
    for _ in 0..31 {
        flow.tick(0.1);
    }
    flow.on_probe_exit(a);
    assert!(flow.challenge().tracker().point(a).unwrap().is_completed());

    flow.on_probe_enter(b);
    for _ in 0..6 {
        flow.tick(0.5);
    }
    flow.on_probe_exit(b);
    assert!(flow.challenge().tracker().point(b).unwrap().is_completed());

    let mut guard = 0;
    while flow.stage() == FlowStage::Challenge && guard < 1_000 {
        flow.tick(0.5);
        guard += 1;
    }

    assert_eq!(flow.stage(), FlowStage::ResultPending);
    assert_eq!(flow.challenge().outcome(), Some(Outcome::Failure));
    assert_eq!(flow.challenge().tracker().completed(), vec![a, b]);
    assert!(!flow.challenge().tracker().point(c).unwrap().is_completed());
    assert_eq!(
        flow.challenge().tracker().point(a).unwrap().accent(),
        config().complete_color
    );
    assert!(flow.host().is_active(SceneObject::FailObject(TRIANGLE)));
}

#[test]
fn later_selection_wins() {
    let mut flow = SessionFlow::new(&config(), Scene::default());
    flow.advance_stage();
    flow.advance_stage();
    flow.select_index(1);
    flow.select_index(0);
    flow.advance_stage();

    flow.on_probe_enter(PointId(10));
    assert_eq!(flow.challenge().tracker().engaged(), None);
    flow.on_probe_enter(PointId(0));
    assert_eq!(flow.challenge().tracker().engaged(), Some(PointId(0)));

    assert!(flow.host().is_active(SceneObject::PointSet(Variant::ALL[0])));
    assert!(!flow.host().is_active(SceneObject::PointSet(Variant::ALL[1])));
    assert!(flow.host().is_active(SceneObject::GamePanel(Variant::ALL[0])));
}

#[test]
fn duplicate_report_shows_result_once() {
    let mut flow = SessionFlow::new(&config(), Scene::default());
    flow.report_outcome(Variant::default(), Outcome::Success);
    flow.tick(0.5);
    flow.report_outcome(Variant::default(), Outcome::Success);

    // the first countdown was superseded
    flow.tick(0.6);
    assert_eq!(flow.stage(), FlowStage::ResultPending);

    flow.tick(0.4);
    assert_eq!(flow.stage(), FlowStage::ResultShown);
    flow.tick(0.1);
    assert_eq!(
        flow.host()
            .count(&SceneCommand::SetActive(SceneObject::ResultPanel, true)),
        1
    );
}
