//! Native window host: runs one particle network as a window backdrop.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::{NetworkConfig, Section};
use crate::error::AppError;
use crate::gpu::{logical_viewport, GpuCanvas};
use crate::input::Pointer;
use crate::manager::SessionManager;
use crate::render::DrawList;
use crate::session::{FrameHandle, FrameScheduler, SessionId, Visibility};
use crate::surface::{Extent, SurfaceHost};
use crate::theme::{Theme, ThemeHints, ThemeSignal};

/// A particle network backdrop window.
///
/// Use method chaining to configure, then call `.run()` to start.
pub struct Backdrop {
    canvas_id: String,
    config: Option<NetworkConfig>,
    section: Option<Section>,
    title: String,
    size: (f64, f64),
    seed: Option<u64>,
}

impl Backdrop {
    /// A backdrop for the named canvas. The identifier picks the section
    /// preset unless a configuration is given.
    pub fn new(canvas_id: impl Into<String>) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            config: None,
            section: None,
            title: "constellation".to_string(),
            size: (1280.0, 720.0),
            seed: None,
        }
    }

    /// Use an explicit configuration instead of a section preset.
    pub fn with_config(mut self, config: NetworkConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = (width, height);
        self
    }

    /// Seed particle placement for a reproducible layout.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configuration this backdrop will mount with.
    pub fn resolved_config(&self) -> NetworkConfig {
        match &self.config {
            Some(config) => config.clone(),
            None => {
                let section = self
                    .section
                    .unwrap_or_else(|| Section::from_canvas_id(&self.canvas_id));
                debug!("{}: using {} preset", self.canvas_id, section.name());
                NetworkConfig::for_section(section)
            }
        }
    }

    /// Run the backdrop. This blocks until the window is closed.
    pub fn run(self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Measures a window in logical pixels.
struct WindowHost {
    window: Arc<Window>,
}

impl SurfaceHost for WindowHost {
    fn measure(&self) -> Extent {
        let size = self.window.inner_size().to_logical::<f32>(self.window.scale_factor());
        Extent::new(size.width, size.height)
    }

    fn pixel_ratio(&self) -> f32 {
        self.window.scale_factor() as f32
    }
}

/// Frame scheduling on top of `request_redraw`. Only one frame can be
/// pending at a time, which is all a single-window host needs.
struct RedrawScheduler {
    window: Arc<Window>,
    next: u64,
    pending: Option<(SessionId, FrameHandle)>,
}

impl RedrawScheduler {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next: 0,
            pending: None,
        }
    }

    fn take_pending(&mut self) -> Option<(SessionId, FrameHandle)> {
        self.pending.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self, session: &SessionId) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some((session.clone(), handle));
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending.as_ref().is_some_and(|(_, h)| *h == handle) {
            self.pending = None;
        }
    }
}

fn map_theme(theme: winit::window::Theme) -> Theme {
    match theme {
        winit::window::Theme::Light => Theme::Light,
        winit::window::Theme::Dark => Theme::Dark,
    }
}

struct App {
    settings: Backdrop,
    id: SessionId,
    window: Option<Arc<Window>>,
    gpu: Option<GpuCanvas>,
    manager: Option<SessionManager<RedrawScheduler>>,
    theme: ThemeSignal,
    pointer: Pointer,
    list: DrawList,
    error: Option<AppError>,
}

impl App {
    fn new(settings: Backdrop) -> Self {
        let id = SessionId::new(settings.canvas_id.clone());
        Self {
            settings,
            id,
            window: None,
            gpu: None,
            manager: None,
            theme: ThemeSignal::new(ThemeHints::default()),
            pointer: Pointer::new(),
            list: DrawList::new(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.settings.size;
        let window_attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = pollster::block_on(GpuCanvas::new(window.clone()))?;

        if let Some(theme) = window.theme() {
            self.theme.set_theme(map_theme(theme));
        }

        let mut manager =
            SessionManager::new(RedrawScheduler::new(window.clone()), self.theme.clone());
        if let Some(seed) = self.settings.seed {
            manager = manager.with_seed(seed);
        }
        let config = self.settings.resolved_config();
        let host: Box<dyn SurfaceHost> = Box::new(WindowHost {
            window: window.clone(),
        });
        manager.create(self.id.clone(), Some(host), config);

        info!("backdrop {} started", self.id);
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.manager = Some(manager);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(manager), Some(gpu), Some(window)) =
            (self.manager.as_mut(), self.gpu.as_mut(), self.window.as_ref())
        else {
            return;
        };

        // A redraw without a pending frame comes from the system (expose,
        // resize while paused); repaint the current state unchanged.
        let drawn = match manager.scheduler_mut().take_pending() {
            Some((id, handle)) => manager.frame(&id, handle, &mut self.list),
            None => false,
        };
        let Some(session) = manager.get(&self.id) else {
            return;
        };
        if !drawn {
            session.render(&mut self.list);
        }
        if session.surface().is_none() {
            return;
        }

        gpu.prepare(&self.list, logical_viewport(window.inner_size(), window.scale_factor()));
        match gpu.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory, closing");
                event_loop.exit();
            }
            Err(e) => warn!("render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.start(event_loop) {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        if self.pointer.handle_event(&event, scale_factor) {
            if let Some(manager) = self.manager.as_mut() {
                manager.set_pointer(&self.id, self.pointer.position());
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(manager) = self.manager.as_mut() {
                    manager.destroy_all();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(physical_size);
                }
                if let Some(manager) = self.manager.as_mut() {
                    manager.notify_resize(Instant::now());
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(manager) = self.manager.as_mut() {
                    manager.notify_resize(Instant::now());
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let Some(manager) = self.manager.as_mut() {
                    let visibility = if occluded {
                        Visibility::Hidden
                    } else {
                        Visibility::Visible
                    };
                    manager.set_visibility(visibility);
                }
            }
            WindowEvent::ThemeChanged(theme) => {
                self.theme.set_theme(map_theme(theme));
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        manager.poll(Instant::now());
        match manager.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
