//! Application event loop.
//!
//! [`run`] opens a window (or attaches to the `canvas` element on the web),
//! creates the GPU [`Context`] and activates one scene at a time.
//!
//! # Scene activation
//!
//! 1. The previous scene is ended, which releases all of its GPU resources.
//! 2. The new scene's assets are loaded: blocking on a tokio runtime natively,
//!    in a `spawn_local` future on the web that reports back through a user
//!    event.
//! 3. The scene is started and the fly camera is moved to its start position.
//!
//! # Each frame
//!
//! 1. Window events go to the fly camera and the [`ControlMap`]. Resolved
//!    controls either switch scenes or go to the active scene.
//! 2. On redraw the camera is updated and the scene records its pass into the
//!    multisampled target, which resolves into the surface texture.
//! 3. If drawing fails the scene is ended and the error logged. The app keeps
//!    running without an active scene.

use std::{fmt::Debug, iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    controls::{Control, ControlMap},
    resources::{Assets, load_assets},
    scenes::{Scene, SceneKind, blending::BlendingScene},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Environment variable naming the initial scene when no argument is given.
pub const SCENE_ENV: &str = "RENDER_LESSONS_SCENE";

/// Startup configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonConfig {
    /// Registry name of the first scene to show.
    pub scene: String,
    pub title: String,
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            scene: BlendingScene::NAME.to_string(),
            title: "Render Lessons".to_string(),
        }
    }
}

impl LessonConfig {
    /// An explicit scene name wins over the environment, which wins over the
    /// default. Blank values count as unset.
    pub fn resolve(arg: Option<String>, env: Option<String>) -> Self {
        let scene = [arg, env]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty());
        match scene {
            Some(scene) => Self {
                scene,
                ..Default::default()
            },
            None => Self::default(),
        }
    }

    /// Reads the first command line argument and [`SCENE_ENV`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().nth(1), std::env::var(SCENE_ENV).ok())
    }

    /// Reads the scene name from the page's URL fragment, e.g. `#Texture`.
    #[cfg(target_arch = "wasm32")]
    pub fn from_location() -> Self {
        let hash = web_sys::window()
            .and_then(|window| window.location().hash().ok())
            .map(|hash| hash.trim_start_matches('#').replace("%20", " "));
        Self::resolve(hash, None)
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Context),
    #[allow(dead_code)]
    AssetsLoaded {
        scene: SceneKind,
        assets: anyhow::Result<Assets>,
    },
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::AssetsLoaded { scene, assets } => f
                .debug_struct("AssetsLoaded")
                .field("scene", &scene.name())
                .field("ok", &assets.is_ok())
                .finish(),
        }
    }
}

/// Everything that exists once the GPU is up.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    gpu: InitContext,
    controls: ControlMap,
    scene: Option<SceneKind>,
    /// Name of the most recently requested scene, active or not.
    requested: &'static str,
    is_surface_configured: bool,
}

impl AppState {
    fn new(ctx: Context) -> Self {
        let gpu = InitContext::from(&ctx);
        Self {
            ctx,
            gpu,
            controls: ControlMap::new(),
            scene: None,
            requested: BlendingScene::NAME,
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.is_surface_configured = true;
            self.ctx.resize(width, height);
        }
    }

    fn end_scene(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.end();
        }
    }

    /// Start `scene` with its loaded assets and make it the active one.
    fn activate(&mut self, mut scene: SceneKind, assets: anyhow::Result<Assets>, title: &str) {
        if scene.name() != self.requested {
            log::debug!("Dropping {}, {} was requested since", scene.name(), self.requested);
            return;
        }
        self.end_scene();
        match assets.and_then(|assets| scene.start(&self.gpu, &assets)) {
            Ok(()) => {
                self.ctx.camera.camera = scene.camera();
                self.ctx.clear_colour = scene.clear_colour();
                self.ctx
                    .window
                    .set_title(&format!("{title} - {}", scene.name()));
                log::info!("Started scene {}", scene.name());
                self.scene = Some(scene);
            }
            Err(e) => {
                scene.end();
                log::error!("Cannot start scene {}: {e:#}", scene.name());
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }
        let Some(scene) = &mut self.scene else {
            return Ok(());
        };

        let output = self.ctx.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.ctx.color_format),
            ..Default::default()
        });
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let camera = self.ctx.camera.view();
        let target = self.ctx.targets.frame(&view);
        match scene.draw(&self.gpu, &mut encoder, target, &camera) {
            Ok(()) => {
                self.ctx.queue.submit(iter::once(encoder.finish()));
                output.present();
            }
            Err(e) => {
                log::error!("Scene {} failed to draw, ending it: {e:#}", scene.name());
                self.end_scene();
            }
        }
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: EventLoopProxy<FlowEvent>,
    config: LessonConfig,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: LessonConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            config,
            state: None,
            last_time: Instant::now(),
        })
    }

    fn on_initialized(&mut self, ctx: Context) {
        let size = ctx.window.inner_size();
        let mut state = AppState::new(ctx);
        state.resize(size.width, size.height);
        state.ctx.window.request_redraw();
        self.state = Some(state);
        let scene = self.config.scene.clone();
        self.request_scene(&scene);
    }

    /// End the active scene and start loading `name`.
    fn request_scene(&mut self, name: &str) {
        let Some(state) = &mut self.state else {
            return;
        };
        let scene = match SceneKind::by_name(name) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("{e:#}");
                return;
            }
        };
        state.end_scene();
        state.requested = scene.name();
        log::info!("Loading scene {}", scene.name());
        let request = scene.load();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let assets = self.async_runtime.block_on(load_assets(request));
            state.activate(scene, assets, &self.config.title);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let assets = load_assets(request).await;
                if proxy
                    .send_event(FlowEvent::AssetsLoaded { scene, assets })
                    .is_err()
                {
                    log::warn!("Event loop closed before the scene finished loading");
                }
            });
        }
    }

    fn switch_scene(&mut self, step: isize) {
        let Some(state) = &self.state else {
            return;
        };
        let name = match &state.scene {
            Some(scene) => scene.neighbour(step),
            None => SceneKind::by_name(state.requested)
                .map(|scene| scene.neighbour(step))
                .unwrap_or(state.requested),
        };
        self.request_scene(name);
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.config.title);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID))
                .map(|canvas| canvas.unchecked_into());
            window_attributes = window_attributes.with_canvas(canvas);
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(Context::new(window)) {
                Ok(ctx) => self.on_initialized(ctx),
                Err(e) => {
                    log::error!("App initialization failed: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match Context::new(window).await {
                    Ok(ctx) => {
                        if proxy.send_event(FlowEvent::Initialized(ctx)).is_err() {
                            log::warn!("Event loop closed before the GPU was ready");
                        }
                    }
                    Err(e) => log::error!("App initialization failed: {e:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(ctx) => self.on_initialized(ctx),
            FlowEvent::AssetsLoaded { scene, assets } => {
                if let Some(state) = &mut self.state {
                    state.activate(scene, assets, &self.config.title);
                }
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.ctx.camera.controller.handle_mouse(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        state.ctx.camera.controller.handle_window_events(&event);
        match state.controls.handle_window_events(&event) {
            Some(Control::NextScene) => self.switch_scene(1),
            Some(Control::PrevScene) => self.switch_scene(-1),
            Some(control) => {
                if let Some(scene) = &mut state.scene {
                    scene.on_control(&state.gpu, control);
                }
            }
            None => {}
        }

        let Some(state) = &mut self.state else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                state.end_scene();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                let camera = &mut state.ctx.camera;
                camera.controller.update(&mut camera.camera, dt);

                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {e}");
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run(config: LessonConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
