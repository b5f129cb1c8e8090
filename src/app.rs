use std::sync::Arc;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::demos::{Demo, SceneSetup, Scheduler};
use crate::error::{RenderError, Result};
use crate::frame::CLEAR_COLOR;
use crate::geometry::{LinePoints, cursor_to_ndc};
use crate::gpu::GpuContext;
use crate::input::{Control, Input};
use crate::params::SceneParams;
use crate::scheduler::Axis;

/// Configuration for the app window and the scene it opens with.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub demo: Demo,
    pub params: SceneParams,
    /// Background of the 3D scenes. The lines scene always clears to white.
    pub clear_color: wgpu::Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Spinframe".to_string(),
            width: 800,
            height: 600,
            demo: Demo::default(),
            params: SceneParams::default(),
            clear_color: CLEAR_COLOR,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn demo(mut self, demo: Demo) -> Self {
        self.demo = demo;
        self
    }

    pub fn params(mut self, params: SceneParams) -> Self {
        self.params = params;
        self
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }
}

/// Opens a window and runs the configured scene until the window closes.
///
/// Returns the first fatal error: no usable GPU, a pipeline that fails to
/// build, or a surface that cannot be presented to.
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new()
        .map_err(|e| RenderError::UnsupportedEnvironment(format!("cannot create event loop: {e}")))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = SpinframeApp::Pending(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| RenderError::UnsupportedEnvironment(format!("event loop failed: {e}")))?;

    match app {
        SpinframeApp::Exited(Some(err)) => Err(err),
        _ => Ok(()),
    }
}

enum SpinframeApp {
    Pending(AppConfig),
    Running(Box<Session>),
    Exited(Option<RenderError>),
}

impl SpinframeApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RenderError) {
        log::error!("{err}");
        *self = SpinframeApp::Exited(Some(err));
        event_loop.exit();
    }
}

impl ApplicationHandler for SpinframeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self, SpinframeApp::Pending(_)) {
            return;
        }
        let SpinframeApp::Pending(config) = std::mem::replace(self, SpinframeApp::Exited(None))
        else {
            return;
        };

        match Session::new(event_loop, config) {
            Ok(session) => *self = SpinframeApp::Running(Box::new(session)),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let SpinframeApp::Running(session) = self else {
            return;
        };

        if let Err(err) = session.handle_event(event_loop, event) {
            self.fail(event_loop, err);
        }
    }
}

/// Everything alive while the window is open.
struct Session {
    window: Arc<Window>,
    gpu: GpuContext,
    scheduler: Scheduler,
    input: Input,
    demo: Demo,
    params: SceneParams,
    lines: LinePoints,
    clear_color: wgpu::Color,
    /// Axis the rate controls act on.
    selected: Axis,
    /// The surface changed size since the last redraw.
    resized: bool,
}

impl Session {
    fn new(event_loop: &ActiveEventLoop, config: AppConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| RenderError::UnsupportedEnvironment(format!("cannot open window: {e}")))?,
        );
        let gpu = GpuContext::new(window.clone())?;

        let mut session = Self {
            window,
            gpu,
            scheduler: Scheduler::new(),
            input: Input::new(),
            demo: config.demo,
            params: config.params,
            lines: LinePoints::default(),
            clear_color: config.clear_color,
            selected: Axis::X,
            resized: false,
        };
        session.restart()?;
        session.window.request_redraw();
        Ok(session)
    }

    /// Rebuilds the scene from the current parameters, replacing the running loop.
    fn restart(&mut self) -> Result<()> {
        self.start_scene(Vec3::ZERO)
    }

    /// Rebuilds the scene for the new surface size, keeping its rotation.
    fn resume(&mut self) -> Result<()> {
        let rotation = self.scheduler.state().map_or(Vec3::ZERO, |state| state.rotation);
        self.start_scene(rotation)
    }

    fn start_scene(&mut self, rotation: Vec3) -> Result<()> {
        let setup = SceneSetup {
            params: &self.params,
            lines: &self.lines,
            clear_color: self.clear_color,
            rotation,
        };
        self.demo.start(&self.gpu, &setup, &mut self.scheduler)?;
        Ok(())
    }

    fn handle_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) -> Result<()> {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resized |= self.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                // A drag-resize sends many sizes per frame; rebuild once.
                if std::mem::take(&mut self.resized) && self.scheduler.is_running() {
                    self.resume()?;
                }
                for control in self.input.drain_controls() {
                    self.apply(event_loop, control)?;
                }
                self.scheduler.tick(&mut self.gpu)?;
                self.window.request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, control: Control) -> Result<()> {
        match control {
            Control::SelectAxis(axis) => {
                self.selected = axis;
                log::info!(
                    "adjusting {axis} rate (currently {:.0})",
                    self.params.rate_input(axis)
                );
            }
            Control::StepRate(delta) => {
                let changed = interactive(self.params.step_rate(self.selected, delta))?;
                if changed {
                    log::info!(
                        "{} rate set to {:.0}",
                        self.selected,
                        self.params.rate_input(self.selected)
                    );
                    self.restart()?;
                }
            }
            Control::CycleLightAxis => {
                self.params.light_axis = self.params.light_axis.next();
                log::info!("light orbits the {} axis", self.params.light_axis);
                self.restart()?;
            }
            Control::Restart => self.restart()?,
            Control::ToggleRunning => {
                if self.scheduler.stop_active().is_none() {
                    self.restart()?;
                }
            }
            Control::Quit => event_loop.exit(),
            Control::Click(position) => {
                if self.demo == Demo::Lines {
                    let point = cursor_to_ndc(position, self.gpu.width(), self.gpu.height());
                    self.lines.push(point);
                    self.restart()?;
                } else {
                    let fraction = position.x / self.gpu.width() as f32;
                    if interactive(self.params.set_rate_track(self.selected, fraction))? {
                        self.restart()?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Rejected input from the window never ends the session; it is logged instead.
fn interactive(result: Result<bool>) -> Result<bool> {
    match result {
        Err(err @ RenderError::InvalidInput { .. }) => {
            log::warn!("{err}");
            Ok(false)
        }
        other => other,
    }
}
