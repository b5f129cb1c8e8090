//! Cancellable per-frame animation loop.
//!
//! A [`FrameScheduler`] owns at most one running loop. Each loop pairs a draw
//! callback with the [`AnimationState`] it animates. The host calls
//! [`tick`](FrameScheduler::tick) once per display refresh (on winit's
//! `RedrawRequested`). Every tick adds the rate into the rotation and then draws.
//! A draw that reports [`FrameStatus::Skipped`] puts the rotation back, so a
//! frame that never reached the screen does not move the animation.
//!
//! Starting a loop cancels the previous one and returns a fresh
//! [`SchedulerHandle`]. A handle from an earlier start goes stale: stopping it or
//! changing its rate is a no-op, so a late caller cannot disturb the current loop.
//!
//! The scheduler is generic over the context handed to the draw callback. The
//! application passes its GPU context; tests pass plain recorders.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::error::Result;
use crate::frame::FrameStatus;

/// Rotation axis of an animated object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a `Vec3`.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" | "0" => Ok(Axis::X),
            "y" | "Y" | "1" => Ok(Axis::Y),
            "z" | "Z" | "2" => Ok(Axis::Z),
            other => Err(format!("unknown axis '{other}'")),
        }
    }
}

/// Accumulated rotation and its per-tick rate, both in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationState {
    pub rotation: Vec3,
    pub rate: Vec3,
}

impl AnimationState {
    /// Starts from zero rotation.
    pub fn new(rate: Vec3) -> Self {
        Self {
            rotation: Vec3::ZERO,
            rate,
        }
    }

    pub fn set_rate(&mut self, axis: Axis, rate: f32) {
        self.rate[axis.index()] = rate;
    }

    /// Adds the rate into the rotation once.
    pub fn advance(&mut self) {
        self.rotation += self.rate;
    }
}

/// Identifies one started loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SchedulerHandle(u64);

impl SchedulerHandle {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Draw callback driven by the scheduler.
pub type DrawFn<Ctx> = Box<dyn FnMut(&mut Ctx, &AnimationState) -> Result<FrameStatus>>;

/// What a call to [`FrameScheduler::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// No loop is running; nothing was drawn.
    Idle,
    /// The active loop drew its `frame`-th frame (1-based).
    Drawn { frame: u64 },
    /// The draw had no surface to present to; the state was left as it was.
    Skipped,
}

struct ActiveLoop<Ctx> {
    handle: SchedulerHandle,
    state: AnimationState,
    draw: DrawFn<Ctx>,
    frames: u64,
}

/// Runs at most one animation loop at a time.
pub struct FrameScheduler<Ctx> {
    generation: u64,
    active: Option<ActiveLoop<Ctx>>,
}

impl<Ctx> Default for FrameScheduler<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> fmt::Debug for FrameScheduler<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("generation", &self.generation)
            .field("active", &self.handle())
            .field("state", &self.state())
            .finish()
    }
}

impl<Ctx> FrameScheduler<Ctx> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            active: None,
        }
    }

    /// Starts a loop, cancelling the running one first.
    pub fn start<F>(&mut self, state: AnimationState, draw: F) -> SchedulerHandle
    where
        F: FnMut(&mut Ctx, &AnimationState) -> Result<FrameStatus> + 'static,
    {
        if let Some(previous) = self.active.take() {
            log::debug!(
                "cancelling animation loop {} after {} frames",
                previous.handle.0,
                previous.frames
            );
        }

        self.generation += 1;
        let handle = SchedulerHandle(self.generation);
        log::debug!("starting animation loop {} with rate {}", handle.0, state.rate);

        self.active = Some(ActiveLoop {
            handle,
            state,
            draw: Box::new(draw),
            frames: 0,
        });
        handle
    }

    /// Stops the loop identified by `handle`. Returns `false` for a stale handle.
    pub fn stop(&mut self, handle: SchedulerHandle) -> bool {
        if !self.is_active(handle) {
            return false;
        }
        self.stop_active();
        true
    }

    /// Stops whatever loop is running.
    pub fn stop_active(&mut self) -> Option<SchedulerHandle> {
        let stopped = self.active.take()?;
        log::debug!(
            "stopped animation loop {} after {} frames",
            stopped.handle.0,
            stopped.frames
        );
        Some(stopped.handle)
    }

    pub fn handle(&self) -> Option<SchedulerHandle> {
        self.active.as_ref().map(|active| active.handle)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_active(&self, handle: SchedulerHandle) -> bool {
        self.handle() == Some(handle)
    }

    /// Animation state of the running loop.
    pub fn state(&self) -> Option<&AnimationState> {
        self.active.as_ref().map(|active| &active.state)
    }

    /// Frames drawn by the running loop so far.
    pub fn frames(&self) -> u64 {
        self.active.as_ref().map_or(0, |active| active.frames)
    }

    /// Changes one rate component of the running loop without restarting it.
    ///
    /// Returns `false` for a stale handle.
    pub fn set_rate(&mut self, handle: SchedulerHandle, axis: Axis, rate: f32) -> bool {
        match &mut self.active {
            Some(active) if active.handle == handle => {
                active.state.set_rate(axis, rate);
                true
            }
            _ => false,
        }
    }

    /// Advances the running loop by one frame: rotation += rate, then draw.
    ///
    /// A draw error cancels the loop before it is returned; no further ticks
    /// fire for it.
    pub fn tick(&mut self, ctx: &mut Ctx) -> Result<Tick> {
        let Some(active) = &mut self.active else {
            return Ok(Tick::Idle);
        };

        let previous = active.state;
        active.state.advance();
        match (active.draw)(ctx, &active.state) {
            Ok(FrameStatus::Presented) => {
                active.frames += 1;
                Ok(Tick::Drawn {
                    frame: active.frames,
                })
            }
            Ok(FrameStatus::Skipped) => {
                active.state = previous;
                Ok(Tick::Skipped)
            }
            Err(err) => {
                log::debug!("animation loop {} failed: {err}", active.handle.0);
                self.active = None;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    /// Records every rotation a draw callback sees, tagged with the loop it came from.
    #[derive(Default)]
    struct Recorder {
        draws: Vec<(&'static str, Vec3)>,
    }

    fn recording(
        tag: &'static str,
    ) -> impl FnMut(&mut Recorder, &AnimationState) -> Result<FrameStatus> {
        move |rec, state| {
            rec.draws.push((tag, state.rotation));
            Ok(FrameStatus::Presented)
        }
    }

    #[test]
    fn idle_scheduler_does_not_draw() {
        let mut scheduler = FrameScheduler::<Recorder>::new();
        let mut rec = Recorder::default();

        assert_eq!(scheduler.tick(&mut rec).unwrap(), Tick::Idle);
        assert!(rec.draws.is_empty());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn zero_rate_leaves_rotation_unchanged() {
        let mut scheduler = FrameScheduler::new();
        let mut rec = Recorder::default();
        scheduler.start(AnimationState::new(Vec3::ZERO), recording("static"));

        for _ in 0..240 {
            scheduler.tick(&mut rec).unwrap();
        }

        assert_eq!(rec.draws.len(), 240);
        assert!(rec.draws.iter().all(|(_, rotation)| *rotation == Vec3::ZERO));
    }

    #[test]
    fn rotation_accumulates_rate_per_tick() {
        let rate = Vec3::new(0.01, -0.02, 0.2);
        let mut scheduler = FrameScheduler::new();
        let mut rec = Recorder::default();
        scheduler.start(AnimationState::new(rate), recording("spin"));

        let n = 500;
        for _ in 0..n {
            scheduler.tick(&mut rec).unwrap();
        }

        let rotation = scheduler.state().unwrap().rotation;
        assert!(rotation.abs_diff_eq(rate * n as f32, 1e-3), "{rotation}");
        // The draw sees the rotation after the rate was added.
        assert!(rec.draws[0].1.abs_diff_eq(rate, 1e-7));
        assert_eq!(scheduler.frames(), n);
    }

    #[test]
    fn restart_leaves_exactly_one_loop() {
        let mut scheduler = FrameScheduler::new();
        let mut rec = Recorder::default();

        let first = scheduler.start(AnimationState::new(Vec3::X), recording("first"));
        scheduler.tick(&mut rec).unwrap();
        let second = scheduler.start(AnimationState::new(Vec3::Y), recording("second"));

        for _ in 0..3 {
            assert!(matches!(scheduler.tick(&mut rec).unwrap(), Tick::Drawn { .. }));
        }

        let tags: Vec<_> = rec.draws.iter().map(|(tag, _)| *tag).collect();
        assert_eq!(tags, ["first", "second", "second", "second"]);
        assert_ne!(first, second);
        assert!(second.generation() > first.generation());
        assert!(!scheduler.is_active(first));
        assert!(scheduler.is_active(second));
        // The new loop starts from zero rotation.
        assert_eq!(rec.draws[1].1, Vec3::Y);
    }

    #[test]
    fn stop_prevents_further_ticks() {
        let mut scheduler = FrameScheduler::new();
        let mut rec = Recorder::default();
        let handle = scheduler.start(AnimationState::new(Vec3::ONE), recording("spin"));

        scheduler.tick(&mut rec).unwrap();
        assert!(scheduler.stop(handle));
        assert_eq!(scheduler.tick(&mut rec).unwrap(), Tick::Idle);
        assert_eq!(rec.draws.len(), 1);
        assert!(!scheduler.stop(handle));
    }

    #[test]
    fn stale_handle_cannot_touch_current_loop() {
        let mut scheduler = FrameScheduler::new();
        let mut rec = Recorder::default();
        let stale = scheduler.start(AnimationState::new(Vec3::ZERO), recording("old"));
        let current = scheduler.start(AnimationState::new(Vec3::ZERO), recording("new"));

        assert!(!scheduler.stop(stale));
        assert!(!scheduler.set_rate(stale, Axis::X, 1.0));
        assert!(scheduler.set_rate(current, Axis::Z, 0.5));

        scheduler.tick(&mut rec).unwrap();
        assert_eq!(rec.draws, [("new", Vec3::new(0.0, 0.0, 0.5))]);
    }

    #[test]
    fn draw_failure_cancels_loop() {
        let mut scheduler = FrameScheduler::<Recorder>::new();
        let mut rec = Recorder::default();
        scheduler.start(AnimationState::default(), |_, _| {
            Err(RenderError::InvalidPipeline("broken".into()))
        });

        assert!(scheduler.tick(&mut rec).is_err());
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.tick(&mut rec).unwrap(), Tick::Idle);
    }

    #[test]
    fn skipped_frame_keeps_rotation() {
        let mut scheduler = FrameScheduler::<Vec<Vec3>>::new();
        let mut seen = Vec::new();
        let mut presented = false;
        scheduler.start(AnimationState::new(Vec3::X), move |seen, state| {
            seen.push(state.rotation);
            presented = !presented;
            Ok(if presented {
                FrameStatus::Presented
            } else {
                FrameStatus::Skipped
            })
        });

        assert_eq!(scheduler.tick(&mut seen).unwrap(), Tick::Drawn { frame: 1 });
        assert_eq!(scheduler.tick(&mut seen).unwrap(), Tick::Skipped);
        assert_eq!(scheduler.tick(&mut seen).unwrap(), Tick::Drawn { frame: 2 });

        // The skipped tick drew rotation 2 but did not keep it.
        assert_eq!(seen, [Vec3::X, Vec3::X * 2.0, Vec3::X * 2.0]);
        assert_eq!(scheduler.state().unwrap().rotation, Vec3::X * 2.0);
        assert_eq!(scheduler.frames(), 2);
    }

    #[test]
    fn axis_names_and_indices() {
        assert_eq!("1".parse::<Axis>(), Ok(Axis::Y));
        assert_eq!("Z".parse::<Axis>(), Ok(Axis::Z));
        assert!("w".parse::<Axis>().is_err());
        assert_eq!(Axis::ALL.map(Axis::index), [0, 1, 2]);
    }
}
