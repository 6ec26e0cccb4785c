#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod camera;
mod simulation;

pub use camera::Camera;
pub use simulation::{Mode, Simulation, SimulationError, DEFAULT_DELAY_MILLIS, SOUP_DENSITY};

use log::{error, info, warn};
use pixels::wgpu::Color;
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Cursor, CursorIcon, Window, WindowId};

const BACKGROUND_COLOR: Color = Color::BLACK;
const EMPTY_CELL_COLOR: [u8; 4] = [0x00, 0x00, 0x00, 0xff];
const LIVE_CELL_COLOR: [u8; 4] = [0x00, 0x80, 0x13, 0xff];
const PAINTED_CELL_COLOR: [u8; 4] = [0x60, 0xc0, 0x70, 0xff];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

pub fn window_size_to_grid_size(
    window_size: PhysicalSize<u32>,
    cell_pixel_width: u32,
) -> GridSize {
    let cell_pixel_width = cell_pixel_width.max(1);
    GridSize::new(
        (window_size.width / cell_pixel_width).max(1),
        (window_size.height / cell_pixel_width).max(1),
    )
}

#[derive(Clone, Copy, Debug)]
pub struct AppConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub cell_pixel_width: u32,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("could not create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("pixel surface failed: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("could not resize pixel surface: {0}")]
    Texture(#[from] pixels::TextureError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Runs the window until it is closed. Blocks the calling thread.
pub fn animate(simulation: Simulation, camera: Camera, config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut handler = AppEventHandler::new(simulation, camera, config);
    event_loop.run_app(&mut handler)?;
    handler.error.map_or(Ok(()), Err)
}

struct App {
    simulation: Simulation,
    camera: Camera,
    window: Arc<Window>,
    pixels: Pixels<'static>,
    grid_size: GridSize,
    cell_pixel_width: u32,
    next_update: Instant,
    cursor: Option<PhysicalPosition<f64>>,
    held_button: Option<MouseButton>,
}

impl App {
    fn new(
        event_loop: &ActiveEventLoop,
        simulation: Simulation,
        mut camera: Camera,
        config: AppConfig,
    ) -> Result<Self, AppError> {
        let window = Arc::new(Self::build_window(event_loop, config)?);
        let grid_size = window_size_to_grid_size(window.inner_size(), config.cell_pixel_width);
        let pixels = Self::build_pixels(&window, grid_size)?;
        if let Some((min, max)) = simulation.bounding_box() {
            camera.center_on(min, max, grid_size);
        }
        Ok(Self {
            next_update: Instant::now() + simulation.delay(),
            simulation,
            camera,
            window,
            pixels,
            grid_size,
            cell_pixel_width: config.cell_pixel_width,
            cursor: None,
            held_button: None,
        })
    }

    fn build_window(event_loop: &ActiveEventLoop, config: AppConfig) -> Result<Window, AppError> {
        let window_attributes = Window::default_attributes()
            .with_title("Conway's Game of Life")
            .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
            .with_cursor(Cursor::Icon(CursorIcon::Crosshair))
            .with_visible(false);
        Ok(event_loop.create_window(window_attributes)?)
    }

    fn build_pixels(
        window: &Arc<Window>,
        grid_size: GridSize,
    ) -> Result<Pixels<'static>, AppError> {
        let window_size = window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());
        Ok(
            PixelsBuilder::new(grid_size.width, grid_size.height, surface_texture)
                .clear_color(BACKGROUND_COLOR)
                .build()?,
        )
    }

    fn on_create(&mut self) {
        self.update_title();
        self.window.request_redraw();
        self.window.set_visible(true);
    }

    fn on_time_step(&mut self) {
        if self.simulation.advance() {
            self.refresh_view();
        }

        let now = Instant::now();
        while self.next_update < now {
            self.next_update += self.simulation.delay();
        }
    }

    fn refresh_view(&mut self) {
        self.update_title();
        self.window.request_redraw();
    }

    fn update_title(&self) {
        let grid = self.simulation.grid();
        let title = match self.simulation.mode() {
            Mode::Editing => "Conway's Game of Life - editing".to_string(),
            mode => format!(
                "Conway's Game of Life - {:?} - generation {} - {} live - {} ms",
                mode,
                grid.generation(),
                grid.population(),
                self.simulation.delay_millis()
            ),
        };
        self.window.set_title(&title);
    }

    fn on_resize(&mut self, size: PhysicalSize<u32>) -> Result<(), AppError> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.grid_size = window_size_to_grid_size(size, self.cell_pixel_width);
        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels
            .resize_buffer(self.grid_size.width, self.grid_size.height)?;
        self.window.request_redraw();
        Ok(())
    }

    fn on_key(&mut self, code: KeyCode) -> Result<(), AppError> {
        match code {
            KeyCode::Space => {
                self.simulation.toggle_run()?;
                self.next_update = Instant::now() + self.simulation.delay();
            }
            KeyCode::KeyN | KeyCode::Enter => self.simulation.step_once()?,
            KeyCode::Backspace | KeyCode::Delete => self.simulation.end_run(),
            KeyCode::KeyR => {
                let (min, max) = self.camera.visible_area(self.grid_size);
                self.simulation.seed_random_soup(min, max, SOUP_DENSITY);
            }
            KeyCode::Equal => self.change_delay(self.simulation.delay_millis() / 2),
            KeyCode::Minus => self.change_delay(self.simulation.delay_millis().saturating_mul(2)),
            KeyCode::ArrowLeft => self.camera.pan(-1, 0),
            KeyCode::ArrowRight => self.camera.pan(1, 0),
            KeyCode::ArrowUp => self.camera.pan(0, -1),
            KeyCode::ArrowDown => self.camera.pan(0, 1),
            _ => return Ok(()),
        }
        self.refresh_view();
        Ok(())
    }

    fn change_delay(&mut self, millis: i64) {
        if let Err(err) = self.simulation.set_delay_millis(millis) {
            warn!("Ignoring delay change: {err}");
        }
    }

    fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(position);
        if let Some(button) = self.held_button {
            self.on_drag(button);
        }
    }

    fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.held_button = Some(button);
                self.on_drag(button);
            }
            ElementState::Released => self.held_button = None,
        }
    }

    fn on_drag(&mut self, button: MouseButton) {
        let Some((col, row)) = self.cursor_pixel() else {
            return;
        };
        let changed = match button {
            MouseButton::Left => self.simulation.paint(self.camera.buffer_to_grid(col, row)),
            MouseButton::Right => self.simulation.erase(self.camera.buffer_to_grid(col, row)),
            MouseButton::Middle => {
                self.camera.pan_toward(col, row, self.grid_size);
                true
            }
            _ => false,
        };
        if changed {
            self.window.request_redraw();
        }
    }

    fn cursor_pixel(&self) -> Option<(usize, usize)> {
        let position = self.cursor?;
        self.pixels
            .window_pos_to_pixel((position.x as f32, position.y as f32))
            .ok()
    }

    fn on_redraw(&mut self) -> Result<(), AppError> {
        let frame = self.pixels.frame_mut();
        for pixel in frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&EMPTY_CELL_COLOR);
        }

        let color = match self.simulation.mode() {
            Mode::Editing => PAINTED_CELL_COLOR,
            Mode::Running | Mode::Paused => LIVE_CELL_COLOR,
        };
        let camera = self.camera;
        let grid_size = self.grid_size;
        self.simulation.for_each_visible_cell(|coord| {
            if let Some(index) = camera.grid_to_buffer_index(coord, grid_size) {
                let offset = 4 * index;
                if let Some(pixel) = frame.get_mut(offset..offset + 4) {
                    pixel.copy_from_slice(&color);
                }
            }
        });
        self.pixels.render()?;
        Ok(())
    }
}

struct AppEventHandler {
    pending: Option<(Simulation, Camera, AppConfig)>,
    app: Option<App>,
    error: Option<AppError>,
}

impl AppEventHandler {
    fn new(simulation: Simulation, camera: Camera, config: AppConfig) -> Self {
        Self {
            pending: Some((simulation, camera, config)),
            app: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for AppEventHandler {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let (StartCause::ResumeTimeReached { .. }, Some(app)) = (cause, self.app.as_mut()) {
            app.on_time_step();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some((simulation, camera, config)) = self.pending.take() else {
            return;
        };
        match App::new(event_loop, simulation, camera, config) {
            Ok(mut app) => {
                app.on_create();
                info!(
                    "Window ready, showing {}x{} cells",
                    app.grid_size.width, app.grid_size.height
                );
                self.app = Some(app);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(app) = self.app.as_mut() else {
            return;
        };
        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape | KeyCode::KeyQ => {
                    event_loop.exit();
                    Ok(())
                }
                _ => app.on_key(code),
            },
            WindowEvent::Resized(size) => app.on_resize(size),
            WindowEvent::CursorMoved { position, .. } => {
                app.on_cursor_moved(position);
                Ok(())
            }
            WindowEvent::MouseInput { state, button, .. } => {
                app.on_mouse_button(button, state);
                Ok(())
            }
            WindowEvent::RedrawRequested => app.on_redraw(),
            _ => Ok(()),
        };
        if let Err(err) = result {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(app) = self.app.as_ref() else {
            return;
        };
        let control_flow = match app.simulation.mode() {
            Mode::Running => ControlFlow::WaitUntil(app.next_update),
            Mode::Editing | Mode::Paused => ControlFlow::Wait,
        };
        event_loop.set_control_flow(control_flow);
    }
}
