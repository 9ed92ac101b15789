use anyhow::{Context as _, Result, anyhow};
use aviator_input::{Action, Pointer};
use aviator_kernel::{FixedStep, SimConfig, World};
use aviator_render_wgpu::WgpuRenderer;
use aviator_tools::SceneInspector;
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Steps replayed at most per frame after a stall.
const MAX_CATCH_UP_STEPS: u32 = 5;

#[derive(Parser)]
#[command(
    name = "aviator-desktop",
    about = "Fly a low-poly airplane over the sea"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// RNG seed for the sea and the clouds (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// YAML simulation config
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Build the world from the config file, if any, and the seed override.
fn load_world(cli: &Cli) -> Result<World> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(World::new(config)?)
}

fn key_action(key: KeyCode) -> Action {
    match key {
        KeyCode::F1 => Action::ToggleHud,
        KeyCode::Escape => Action::Quit,
        _ => Action::Noop,
    }
}

/// Application state.
struct AppState {
    world: World,
    clock: FixedStep,
    show_hud: bool,
    last_frame: Instant,
    frame_ms: f32,
}

impl AppState {
    fn new(world: World) -> Self {
        let clock = FixedStep::new(world.config().step_rate_hz, MAX_CATCH_UP_STEPS);
        Self {
            world,
            clock,
            show_hud: true,
            last_frame: Instant::now(),
            frame_ms: 0.0,
        }
    }

    /// Run the animation steps that fell due since the previous frame.
    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.frame_ms = self.frame_ms * 0.9 + (dt * 1000.0) as f32 * 0.1;

        for _ in 0..self.clock.advance(dt) {
            if let Err(e) = self.world.step() {
                tracing::error!("step failed: {e}");
                break;
            }
        }
    }

    fn draw_hud(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let summary = SceneInspector::summary(&self.world);

        egui::Window::new("Aviator")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Tick: {}  Seed: {}", summary.tick, summary.seed));
                ui.label(format!(
                    "Nodes: {}  Meshes: {}",
                    summary.node_count, summary.mesh_nodes
                ));
                ui.label(format!(
                    "Waves: {}  Clouds: {}",
                    summary.waves, summary.clouds
                ));
                ui.separator();
                ui.label(format!(
                    "Pointer: ({:.2}, {:.2})",
                    summary.pointer[0], summary.pointer[1]
                ));
                ui.label(format!(
                    "Airplane: ({:.1}, {:.1})",
                    summary.airplane[0], summary.airplane[1]
                ));
                ui.label(format!(
                    "Roll: {:.3}  Pitch: {:.3}",
                    summary.roll, summary.pitch
                ));
                ui.label(format!("Frame: {:.1} ms", self.frame_ms));
                ui.separator();
                ui.small("F1: Toggle HUD | Esc: Quit");
            });
    }
}

/// Window, surface and GPU resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn init(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Aviator")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no suitable GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("aviator_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Draw the scene, then the HUD on top, and present.
    fn draw(&mut self, egui_ctx: &EguiContext, state: &AppState) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            state.world.scene(),
            state.world.camera(),
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_hud(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(world: World) -> Self {
        Self {
            state: AppState::new(world),
            gpu: None,
            egui_ctx: EguiContext::default(),
            init_error: None,
        }
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: Action) {
        match action {
            Action::ToggleHud => self.state.show_hud = !self.state.show_hud,
            Action::Quit => {
                tracing::info!(tick = self.state.world.tick(), "quit requested");
                event_loop.exit();
            }
            other => self.state.world.apply(other),
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::init(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.world.apply(Action::Resized {
                    width: gpu.config.width,
                    height: gpu.config.height,
                });
                self.state.last_frame = Instant::now();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                let (width, height) = (gpu.config.width, gpu.config.height);
                self.handle_action(event_loop, Action::Resized { width, height });
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (width, height) = (gpu.config.width, gpu.config.height);
                let pointer = Pointer::from_cursor(position.x, position.y, width, height);
                self.handle_action(event_loop, Action::PointerMoved(pointer.position()));
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.handle_action(event_loop, key_action(key));
            }
            WindowEvent::RedrawRequested => {
                self.state.update();
                gpu.draw(&self.egui_ctx, &self.state);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("aviator-desktop starting");

    let world = load_world(&cli).inspect_err(|e| tracing::error!("failed to start: {e:#}"))?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(world);
    event_loop.run_app(&mut app)?;

    match app.init_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_keys_map_to_actions() {
        assert_eq!(key_action(KeyCode::F1), Action::ToggleHud);
        assert_eq!(key_action(KeyCode::Escape), Action::Quit);
        assert_eq!(key_action(KeyCode::KeyW), Action::Noop);
    }

    #[test]
    fn cli_parses_seed_and_config() {
        let argv = ["aviator-desktop", "--seed", "9", "--config", "sim.yaml"];
        let cli = Cli::parse_from(argv.into_iter().chain(["-v"]));
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.config, Some(PathBuf::from("sim.yaml")));
        assert!(cli.verbose);
    }

    #[test]
    fn world_loading_applies_seed_and_reports_bad_config() {
        let cli = Cli::parse_from(["aviator-desktop", "--seed", "9"]);
        assert_eq!(load_world(&cli).unwrap().config().seed, 9);

        let cli = Cli::parse_from(["aviator-desktop", "--config", "/nonexistent/sim.yaml"]);
        let err = load_world(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/sim.yaml"));
    }

    #[test]
    fn app_state_uses_configured_step_rate() {
        let world = World::new(SimConfig {
            step_rate_hz: 30.0,
            ..SimConfig::default()
        })
        .unwrap();
        let state = AppState::new(world);
        assert!((state.clock.step_seconds() - 1.0 / 30.0).abs() < 1e-12);
        assert!(state.show_hud);
    }
}
