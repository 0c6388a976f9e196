use crate::core::gfx::{self as renderer, RenderList, create_backend};
use crate::core::input::{self, InputEvent};
use crate::core::space::{self, Metrics, Viewport};
use crate::screens::{ScreenAction, menu};
use crate::ui::actors::Actor;
use crate::ui::{color, compose};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use log::{error, info, warn};
use std::{error::Error, sync::Arc, time::Instant};

const WINDOW_TITLE: &str = "The Return of Damareen";

pub struct AppState {
    menu_state: menu::State,
    frame_count: u32,
    last_title_update: Instant,
    last_frame_time: Instant,
    start_time: Instant,
    fullscreen_enabled: bool,
    show_fps: bool,
    metrics: Metrics,
    last_fps: f32,
    current_frame_vpf: u32,
    display_width: u32,
    display_height: u32,
}

pub struct App {
    window: Option<Arc<Window>>,
    backend: Option<renderer::Backend>,
    state: AppState,
}

impl AppState {
    fn new() -> Self {
        let config = crate::config::get();
        let fallback = config.display_viewport();
        let seed = config.resolved_ash_seed();
        info!("Ash seed: {seed}");
        let now = Instant::now();
        Self {
            menu_state: menu::init(seed, fallback, 0.0),
            frame_count: 0,
            last_title_update: now,
            last_frame_time: now,
            start_time: now,
            fullscreen_enabled: !config.windowed,
            show_fps: config.show_fps,
            metrics: space::metrics_for_window(
                config.display_width,
                config.display_height,
                fallback,
            ),
            last_fps: 0.0,
            current_frame_vpf: 0,
            display_width: config.display_width,
            display_height: config.display_height,
        }
    }

    #[inline(always)]
    fn fallback(&self) -> Viewport {
        self.metrics.fallback
    }
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            backend: None,
            state: AppState::new(),
        }
    }

    fn handle_action(&mut self, action: ScreenAction, event_loop: &ActiveEventLoop) {
        match action {
            ScreenAction::None => {}
            ScreenAction::Exit => {
                info!("Exit requested. Shutting down.");
                event_loop.exit();
            }
        }
    }

    fn route_input_event(&mut self, event_loop: &ActiveEventLoop, ev: InputEvent) {
        let action = menu::handle_input(&mut self.state.menu_state, &ev);
        self.handle_action(action, event_loop);
    }

    fn build_screen<'a>(&self, actors: &'a [Actor], clear_color: [f32; 4]) -> RenderList<'a> {
        compose::build_screen(actors, clear_color)
    }

    #[inline(always)]
    fn update_fps_title(&mut self, window: &Window, now: Instant) {
        self.state.frame_count += 1;
        let elapsed = now.duration_since(self.state.last_title_update);
        if elapsed.as_secs_f32() >= 1.0 {
            let fps = self.state.frame_count as f32 / elapsed.as_secs_f32();
            self.state.last_fps = fps;
            if self.state.show_fps {
                window.set_title(&format!(
                    "{WINDOW_TITLE} | {:.2} FPS | {} prims",
                    self.state.last_fps, self.state.current_frame_vpf
                ));
            }
            self.state.frame_count = 0;
            self.state.last_title_update = now;
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let mut window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_resizable(true)
            .with_transparent(false);

        let window_width = self.state.display_width;
        let window_height = self.state.display_height;

        if self.state.fullscreen_enabled {
            let monitor = event_loop.primary_monitor();
            if monitor.is_none() {
                warn!("No primary monitor reported; using BORDERLESS fullscreen on the current one.");
            }
            window_attributes = window_attributes
                .with_fullscreen(Some(winit::window::Fullscreen::Borderless(monitor)));
        } else {
            window_attributes =
                window_attributes.with_inner_size(PhysicalSize::new(window_width, window_height));
        }

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let sz = window.inner_size();
        self.state.metrics = space::metrics_for_window(sz.width, sz.height, self.state.fallback());
        let backend = create_backend(window.clone())?;

        self.window = Some(window);
        self.backend = Some(backend);
        info!("Starting event loop...");
        Ok(())
    }

    #[inline(always)]
    fn handle_key_event(&mut self, event_loop: &ActiveEventLoop, key_event: &KeyEvent) {
        for ev in input::map_key_event(key_event) {
            self.route_input_event(event_loop, ev);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window: &Window) {
        let now = Instant::now();
        let delta_time = now.duration_since(self.state.last_frame_time).as_secs_f64();
        self.state.last_frame_time = now;
        let total_elapsed = now.duration_since(self.state.start_time).as_secs_f64();

        let sz = window.inner_size();
        self.state.metrics = space::metrics_for_window(sz.width, sz.height, self.state.fallback());
        let viewport = self.state.metrics.viewport;

        let action = menu::update(&mut self.state.menu_state, total_elapsed, delta_time, viewport);
        self.handle_action(action, event_loop);

        let actors = menu::get_actors(&self.state.menu_state, viewport);
        let screen = self.build_screen(&actors, color::BACKDROP_RGBA);
        self.update_fps_title(window, now);

        if let Some(backend) = &mut self.backend {
            match backend.draw(&screen) {
                Ok(vpf) => self.state.current_frame_vpf = vpf,
                Err(e) => {
                    error!("Failed to draw frame: {e}");
                    event_loop.exit();
                }
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none()
            && let Err(e) = self.init_graphics(event_loop)
        {
            error!("Failed to initialize graphics: {e}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref().cloned() else {
            return;
        };
        if window_id != window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested. Shutting down.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.state.metrics = space::metrics_for_window(
                    new_size.width,
                    new_size.height,
                    self.state.fallback(),
                );
                if new_size.width > 0
                    && new_size.height > 0
                    && let Some(backend) = &mut self.backend
                {
                    backend.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                self.handle_key_event(event_loop, &key_event);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop, &window),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(backend) = &mut self.backend {
            backend.cleanup();
        }
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
