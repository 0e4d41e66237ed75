//! The show and the loop that drives it.
//!
//! [`Show`] sequences the intro caption and the fireworks engine and tracks
//! pause/stop state. [`run`] is the explicit frame loop: it checks a
//! [`CancelToken`] at the top of every iteration, waits on the host for the
//! next frame, ticks the show and presents.

use crate::clock::Clock;
use crate::config::ShowConfig;
use crate::error::{Error, Result};
use crate::intro::Typewriter;
use crate::sim::{Engine, TickReport};
use crate::surface::{CompositeMode, Surface};
use log::{info, trace, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared stop flag. Clones observe the same flag, so another thread (or a
/// key handler) can end the loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    /// Constructed, `start` not yet called.
    Idle,
    /// Typing the caption; no fireworks yet.
    Intro,
    Running,
    Paused,
    /// Terminal.
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShowStats {
    pub frames: u64,
    pub launches: u64,
    pub detonations: u64,
    pub sparks_spawned: u64,
    pub peak_sparks: usize,
}

impl ShowStats {
    fn record(&mut self, report: &TickReport) {
        self.frames += 1;
        self.launches += report.launched as u64;
        self.detonations += report.detonations as u64;
        self.sparks_spawned += report.sparks_spawned as u64;
        self.peak_sparks = self.peak_sparks.max(report.sparks);
    }
}

pub struct Show<C: Clock> {
    engine: Engine,
    intro: Typewriter,
    clock: C,
    state: ShowState,
    stats: ShowStats,
}

impl<C: Clock> Show<C> {
    pub fn new(config: &ShowConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: Engine::new(config),
            intro: Typewriter::new(&config.intro.text, config.intro.char_interval_ms),
            clock,
            state: ShowState::Idle,
            stats: ShowStats::default(),
        })
    }

    pub fn state(&self) -> ShowState {
        self.state
    }

    pub fn stats(&self) -> ShowStats {
        self.stats
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The one thing outside collaborators may ask: are fireworks going?
    pub fn is_running(&self) -> bool {
        self.state == ShowState::Running
    }

    /// Check the surface and start the intro, or the fireworks directly when
    /// there is no caption.
    pub fn start(&mut self, surface: &dyn Surface) -> Result<()> {
        check_surface(surface)?;
        if self.state != ShowState::Idle {
            return Ok(());
        }
        if self.intro.is_done() {
            self.begin(surface)
        } else {
            info!("intro started");
            self.state = ShowState::Intro;
            Ok(())
        }
    }

    /// Start the fireworks. Called by the intro once it completes; hosts
    /// without an intro may call it directly.
    pub fn begin(&mut self, surface: &dyn Surface) -> Result<()> {
        check_surface(surface)?;
        match self.state {
            ShowState::Idle | ShowState::Intro => {
                info!(
                    "fireworks started on a {:.0}x{:.0} surface",
                    surface.width(),
                    surface.height()
                );
                self.state = ShowState::Running;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state == ShowState::Running {
            info!("paused");
            self.state = ShowState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == ShowState::Paused {
            info!("resumed");
            self.state = ShowState::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            ShowState::Running => self.pause(),
            ShowState::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn stop(&mut self) {
        if self.state != ShowState::Stopped {
            let s = self.stats;
            info!(
                "stopped after {} frames: {} launches, {} detonations, {} sparks (peak {})",
                s.frames, s.launches, s.detonations, s.sparks_spawned, s.peak_sparks
            );
            self.state = ShowState::Stopped;
        }
    }

    /// Produce one frame. Returns the engine's report when the fireworks
    /// ticked, `None` during the intro or while idle, paused or stopped.
    pub fn frame(&mut self, surface: &mut dyn Surface) -> Result<Option<TickReport>> {
        let now = self.clock.now_ms();
        match self.state {
            ShowState::Intro => {
                surface.set_composite(CompositeMode::SourceOver);
                surface.clear();
                let done = self.intro.advance(now);
                self.intro.draw(surface);
                if done {
                    self.begin(&*surface)?;
                }
                Ok(None)
            }
            ShowState::Running => {
                let report = self.engine.tick(now, surface);
                self.intro.draw(surface);
                self.stats.record(&report);
                trace!("{report:?}");
                Ok(Some(report))
            }
            ShowState::Idle | ShowState::Paused | ShowState::Stopped => Ok(None),
        }
    }
}

fn check_surface(surface: &dyn Surface) -> Result<()> {
    let (width, height) = (surface.width(), surface.height());
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(Error::InvalidSurface { width, height });
    }
    Ok(())
}

/// Hands out frame deadlines at a fixed rate. When the caller falls more
/// than a frame behind, the missed frames are dropped, not replayed.
#[derive(Debug, Clone)]
pub struct FramePacer {
    period: Duration,
    next: Instant,
}

impl FramePacer {
    pub fn new(fps: u32, now: Instant) -> Self {
        Self {
            period: Duration::from_secs(1) / fps.max(1),
            next: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Deadline of the upcoming frame.
    pub fn next_deadline(&mut self, now: Instant) -> Instant {
        let deadline = self.next;
        if now > deadline + self.period {
            let skipped = (now - deadline).as_nanos() / self.period.as_nanos().max(1);
            warn!("running late, skipping {skipped} frame(s)");
            self.next = now + self.period;
            return now;
        }
        self.next = deadline + self.period;
        deadline
    }
}

/// Input the host collected while waiting for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Quit,
    TogglePause,
    /// The surface changed size; the new size is read on the next tick.
    Resized,
}

/// The environment a show runs in: a frame scheduler plus a drawing surface.
pub trait Host {
    type Surface: Surface;

    /// Block until the next frame is due, pushing any input received in
    /// the meantime.
    fn wait_for_frame(&mut self, events: &mut Vec<HostEvent>) -> Result<()>;

    fn surface(&mut self) -> &mut Self::Surface;

    /// Make the frame just drawn visible.
    fn present(&mut self) -> Result<()>;
}

/// Run until `cancel` fires or the host reports [`HostEvent::Quit`].
pub fn run<C: Clock, H: Host>(show: &mut Show<C>, host: &mut H, cancel: &CancelToken) -> Result<()> {
    show.start(&*host.surface())?;

    let mut events = Vec::new();
    while !cancel.is_cancelled() {
        host.wait_for_frame(&mut events)?;
        for event in events.drain(..) {
            match event {
                HostEvent::Quit => cancel.cancel(),
                HostEvent::TogglePause => show.toggle_pause(),
                HostEvent::Resized => {
                    let surface = host.surface();
                    info!("surface resized to {:.0}x{:.0}", surface.width(), surface.height());
                }
            }
        }
        if cancel.is_cancelled() {
            break;
        }
        // Paused frames draw nothing, so the last picture stays on screen
        let drawing = matches!(show.state(), ShowState::Intro | ShowState::Running);
        show.frame(host.surface())?;
        if drawing {
            host.present()?;
        }
    }

    show.stop();
    Ok(())
}
