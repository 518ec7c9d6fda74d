//! Frame pump for the kiosk loop.
//!
//! [`Runner::step`] waits up to one poll interval for terminal input and
//! hands back a [`Frame`]: the input (if any) plus the time-scaled delta the
//! session flow should advance by.

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Terminal input the kiosk reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KioskEvent {
    Key(KeyEvent),
    Resize,
}

/// One turn of the kiosk loop
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub event: Option<KioskEvent>,
    /// Seconds to advance the flow by, time scale applied
    pub dt: f64,
}

pub trait KioskEventSource {
    /// Waits up to `timeout` for the next input.
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<KioskEvent>>;
}

/// Reads the real terminal
#[derive(Debug, Default)]
pub struct CrosstermEventSource;

impl KioskEventSource for CrosstermEventSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<KioskEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(match event::read()? {
            // key releases would double every button press on some terminals
            CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(KioskEvent::Key(key)),
            CtEvent::Resize(_, _) => Some(KioskEvent::Resize),
            _ => None,
        })
    }
}

/// Replays queued input, one event per poll, without waiting
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    queue: VecDeque<KioskEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = KioskEvent>) -> Self {
        Self {
            queue: events.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: KioskEvent) {
        self.queue.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl KioskEventSource for ScriptedEvents {
    fn poll(&mut self, _timeout: Duration) -> io::Result<Option<KioskEvent>> {
        Ok(self.queue.pop_front())
    }
}

/// Source of per-frame deltas. Implementations apply the designer time scale.
pub trait Clock {
    fn delta(&mut self) -> f64;
}

/// Wall time since the previous frame
#[derive(Debug)]
pub struct WallClock {
    last: Instant,
    time_scale: f64,
}

impl WallClock {
    pub fn new(time_scale: f64) -> Self {
        Self {
            last: Instant::now(),
            time_scale,
        }
    }
}

impl Clock for WallClock {
    fn delta(&mut self) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        dt * self.time_scale
    }
}

/// The same delta every frame, for scripted runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    dt: f64,
}

impl FixedClock {
    pub fn new(step_secs: f64, time_scale: f64) -> Self {
        Self {
            dt: step_secs * time_scale,
        }
    }
}

impl Clock for FixedClock {
    fn delta(&mut self) -> f64 {
        self.dt
    }
}

pub struct Runner<E: KioskEventSource, C: Clock> {
    events: E,
    clock: C,
    poll_interval: Duration,
}

impl<E: KioskEventSource, C: Clock> Runner<E, C> {
    pub fn new(events: E, clock: C, poll_interval: Duration) -> Self {
        Self {
            events,
            clock,
            poll_interval,
        }
    }

    /// Next input (if any arrives within the poll interval) and the delta
    /// measured up to now.
    pub fn step(&mut self) -> io::Result<Frame> {
        let event = self.events.poll(self.poll_interval)?;
        Ok(Frame {
            event,
            dt: self.clock.delta(),
        })
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }
}
