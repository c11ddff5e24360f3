use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use anyhow::Result;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::Key,
    window::{Window, WindowId},
};

use crate::{
    canvas::Canvas,
    color::Rgba,
    diagnostics::{exit_with_error, EnvLogSink, LogSink},
    draw::Platform,
    input::PlatformEvent,
    render::Render,
    software::SoftwareCanvas,
    text::{FontCache, FontdueLoader},
};

pub const DEFAULT_FONT_PATH: &str = "fonts/AnekLatin-Light.ttf";

/// What a game hands the platform. Called from the one and only loop thread.
pub trait Game {
    /// Called once, before the window exists.
    fn init(&mut self, width: u32, height: u32);

    fn on_keydown(&mut self, _key: &Key) {}

    fn on_resize(&mut self, _width: u32, _height: u32) {}

    /// `dt` is always `1 / framerate`, however long the frame actually took.
    fn update(&mut self, dt: f32);

    fn render(&mut self, platform: &mut Platform) -> Result<()>;
}

pub struct App {
    title: String,
    width: u32,
    height: u32,
    font_path: PathBuf,
    frame_rate: f32,
}

impl App {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_window_size(mut self, (width, height): (u32, u32)) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_font_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.font_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_framerate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn font_path(&self) -> &Path {
        &self.font_path
    }

    pub fn timestep(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Whole milliseconds slept at the end of every frame.
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis((1000.0 / self.frame_rate) as u64)
    }

    /// Runs `game` until the window is closed. Backend failures inside the
    /// loop end the process, see [`exit_with_error`].
    pub fn run<G: Game>(self, mut game: G) -> Result<()> {
        game.init(self.width, self.height);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut driver = Driver {
            app: self,
            game,
            running: None,
            sink: EnvLogSink,
        };
        event_loop.run_app(&mut driver)?;
        Ok(())
    }
}

pub fn make_window() -> App {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    App {
        title: "pixplat".into(),
        width: 16 * 100,
        height: 9 * 100,
        font_path: DEFAULT_FONT_PATH.into(),
        frame_rate: 60.0,
    }
}

// field order matters: the cache has to go before the canvas its textures live on
struct Running {
    cache: FontCache,
    canvas: SoftwareCanvas,
    render: Render,
    window: Arc<Window>,
}

struct Driver<G: Game> {
    app: App,
    game: G,
    running: Option<Running>,
    sink: EnvLogSink,
}

impl<G: Game> Driver<G> {
    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(self.app.title.as_str())
                    .with_inner_size(PhysicalSize::new(self.app.width, self.app.height))
                    .with_resizable(true),
            )?,
        );
        let render = Render::new(window.clone())?;
        let size = render.size();
        let canvas = SoftwareCanvas::new(size.width, size.height);
        let cache = FontCache::new(FontdueLoader::new(&self.app.font_path), EnvLogSink);

        Ok(Running {
            cache,
            canvas,
            render,
            window,
        })
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut running) = self.running.take() {
            if let Err(err) = running.cache.shutdown(&mut running.canvas) {
                log::warn!("font cache shutdown failed: {:#}", err);
            }
        }
        event_loop.exit();
    }
}

impl<G: Game> ApplicationHandler for Driver<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(err) => exit_with_error(err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(event) = PlatformEvent::from_window_event(&event) else {
            return;
        };
        if let PlatformEvent::Resized { width, height } = event {
            if let Some(running) = self.running.as_mut() {
                running.render.resize(PhysicalSize::new(width, height));
                if let Err(err) = running.canvas.resize(width, height) {
                    exit_with_error(err);
                }
            }
        }
        if dispatch(&mut self.game, event) {
            self.stop(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if event_loop.exiting() {
            return;
        }
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let result = frame(
            &mut self.game,
            &mut running.canvas,
            &mut running.cache,
            &mut self.sink,
            self.app.timestep(),
        )
        .and_then(|_| running.render.present(&running.canvas));
        if let Err(err) = result {
            exit_with_error(err);
        }
        running.window.request_redraw();

        // TODO: measure the frame instead of sleeping a fixed amount
        thread::sleep(self.app.frame_delay());
    }
}

/// Hands one event to the game. Returns true on quit.
fn dispatch<G: Game>(game: &mut G, event: PlatformEvent) -> bool {
    match event {
        PlatformEvent::Quit => return true,
        PlatformEvent::KeyDown(key) => game.on_keydown(&key),
        PlatformEvent::Resized { width, height } => game.on_resize(width, height),
    }
    false
}

/// Clear, update, render. Presenting is left to the caller.
fn frame<G: Game>(
    game: &mut G,
    canvas: &mut dyn Canvas,
    cache: &mut FontCache,
    sink: &mut dyn LogSink,
    dt: f32,
) -> Result<()> {
    canvas.set_draw_color(Rgba::TRANSPARENT)?;
    canvas.clear()?;
    game.update(dt);
    game.render(&mut Platform::new(canvas, cache, sink))
}
