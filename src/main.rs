use anyhow::{anyhow, Result};
use glam::Vec2;
use log::{info, warn};
use pixel_shader_rust::*;
use std::env;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

/// Démos disponibles
const DEMOS: &[&str] = &["bubbles", "pulsating-radial", "electric-grid", "tunnel-warp", "checkerboard"];

/// Options de ligne de commande
#[derive(Debug, Default)]
struct CliOptions {
    config_path: Option<String>,
    demo: Option<String>,
    fps: Option<u32>,
    list: bool,
}

impl CliOptions {
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = CliOptions::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" if i + 1 < args.len() => {
                    options.config_path = Some(args[i + 1].clone());
                    i += 1;
                }
                "--demo" if i + 1 < args.len() => {
                    options.demo = Some(args[i + 1].clone());
                    i += 1;
                }
                "--fps" if i + 1 < args.len() => {
                    let fps = args[i + 1]
                        .parse()
                        .map_err(|_| anyhow!("--fps attend un entier, reçu '{}'", args[i + 1]))?;
                    options.fps = Some(fps);
                    i += 1;
                }
                "--list" => options.list = true,
                other => warn!("Argument ignoré: {}", other),
            }
            i += 1;
        }
        Ok(options)
    }
}

/// Ticks calés sur les demandes de redessin de la fenêtre
///
/// Les redessins ne sont demandés qu'à l'échéance de la prochaine frame,
/// la boucle d'événements dort entre deux (voir `redraw_schedule`).
struct RedrawTicks {
    window: Arc<Window>,
    running: bool,
}

impl TickSource for RedrawTicks {
    fn start(&mut self, preferred_fps: u32) {
        self.running = true;
        info!("Ticks démarrés (cible {} FPS)", preferred_fps);
        self.window.request_redraw();
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

fn demo_program(name: &str) -> Result<ShaderProgram, HeavyError> {
    let named = ExpressionBuilder::named;
    match name {
        "bubbles" => shader_builder()
            .float(named("disk").circle_at(Vec2::new(0.5, 0.5), 0.3, true))
            .float(named("ripple").wave_along_x(DEFAULT_WAVE_FREQUENCY, DEFAULT_WAVE_SPEED))
            .increment(named("ripple").wave_along_y(14.0, 2.0))
            .float(named("grain").hash_noise(DEFAULT_NOISE_SCALE))
            .float3(named("color").expression("vec3<f32>(0.2, 0.6, 1.0) * disk"))
            .increment(named("color").expression("vec3<f32>(ripple * 0.1)"))
            .decrement(named("color").expression("vec3<f32>(grain * 0.05)"))
            .finalize("color, 1.0"),
        "pulsating-radial" => shader_builder()
            .float2(named("uvc").expression("uv - 0.5"))
            .float(named("dist").expression("length(uvc)"))
            .float(named("pulse").expression("sin(time * 5.0) * 0.5 + 0.5"))
            .float(named("intensity").expression("1.0 - smoothstep(0.0, 0.2 + 0.1 * pulse, dist)"))
            .finalize("intensity, intensity, intensity, 1.0"),
        "electric-grid" => shader_builder()
            .float2(named("scaled").expression("uv * 20.0"))
            .float(named("line_x").expression("step(0.02, fract(scaled.x))"))
            .float(named("line_y").expression("step(0.02, fract(scaled.y))"))
            .float(named("grid").expression("line_x * line_y"))
            .float(named("glow").expression("sin(time * 10.0 + uv.x * 20.0) * 0.5 + 0.5"))
            .float(named("intensity").expression("1.0 - grid * glow"))
            .float3(named("color").expression("vec3<f32>(0.0, 1.0, 1.0) * intensity"))
            .finalize("color, 1.0"),
        "tunnel-warp" => shader_builder()
            .float2(named("uvc").expression("uv - 0.5"))
            .float(named("angle").expression("atan2(uvc.y, uvc.x)"))
            .float(named("radius").expression("length(uvc)"))
            .float(named("warp").expression("sin(10.0 * radius - time * 5.0)"))
            .float(named("shade").expression("0.5 + 0.5 * warp"))
            .float(named("r").expression("0.5 + 0.5 * sin(angle + time)"))
            .float(named("g").expression("0.5 + 0.5 * sin(angle + time + 2.0)"))
            .float(named("b").expression("0.5 + 0.5 * sin(angle + time + 4.0)"))
            .finalize("shade * vec3<f32>(r, g, b), 1.0"),
        "checkerboard" => shader_builder()
            .float2(named("cells").expression("uv * vec2<f32>(5.0, 10.0)"))
            .increment(named("cells").expression("time * 0.5"))
            .float(named("checker").expression("step(0.5, fract(cells.x)) + step(0.5, fract(cells.y))"))
            .assign(named("checker").expression("checker % 2.0"))
            .float(named("cv").expression("select(0.0, 1.0, checker > 0.5)"))
            .finalize("cv, cv, cv, 1.0"),
        other => Err(HeavyError::InvalidConfig(format!("démo inconnue: {}", other))),
    }
}

/// Décide s'il faut redessiner maintenant et jusqu'à quand dormir
///
/// `due` et `now` sont exprimés dans l'horloge du pipeline, `wall_now` sert
/// à convertir l'échéance pour winit.
fn redraw_schedule(due: Option<f64>, now: f64, wall_now: Instant) -> (bool, ControlFlow) {
    match due {
        None => (false, ControlFlow::Wait),
        Some(due) if due <= now => (true, ControlFlow::Wait),
        Some(due) => (
            false,
            ControlFlow::WaitUntil(wall_now + Duration::from_secs_f64(due - now)),
        ),
    }
}

fn run(config: ShaderAppConfig, program: ShaderProgram) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height))
            .build(&event_loop)?,
    );

    let instance = GraphicsContext::create_instance();
    let surface = instance.create_surface(window.clone())?;
    let context = Arc::new(GraphicsContext::new_blocking(instance, Some(&surface))?);

    let size = window.inner_size();
    let target = SurfaceTarget::new(context, surface, size.width, size.height, config.render.vsync)?;

    let clock = Rc::new(MonotonicClock::new());
    let mut pipeline = RenderPipeline::new(target, &program, config.render.target_fps)
        .with_clock(clock.clone())
        .with_tick_source(RedrawTicks {
            window: window.clone(),
            running: false,
        });

    if let Some(err) = pipeline.last_error() {
        warn!("Le pipeline restera inerte: {}", err);
    }

    event_loop.run(move |event, elwt| match event {
        Event::Resumed => pipeline.attach(),
        Event::Suspended => pipeline.detach(),
        Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                pipeline.detach();
                elwt.exit();
            }
            WindowEvent::Resized(new_size) => pipeline.resize(new_size.width, new_size.height),
            WindowEvent::RedrawRequested => {
                pipeline.on_tick(clock.now());
            }
            _ => {}
        },
        Event::AboutToWait => {
            let (redraw, flow) = redraw_schedule(pipeline.next_frame_due(), clock.now(), Instant::now());
            if redraw {
                window.request_redraw();
            }
            elwt.set_control_flow(flow);
        }
        Event::LoopExiting => {
            let stats = pipeline.stats();
            info!(
                "{} frames présentées, {} ticks limités, {:.1} FPS moyen",
                stats.frames_rendered, stats.ticks_throttled, stats.average_fps
            );
        }
        _ => {}
    })?;

    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = CliOptions::parse(&args)?;

    let mut config = match &options.config_path {
        Some(path) => ShaderAppConfig::load_from_file(path)?,
        None => ShaderAppConfig::default(),
    };
    if let Some(fps) = options.fps {
        config.render.target_fps = fps;
    }
    config.validate()?;

    // Initialiser le logging
    env_logger::Builder::new()
        .filter_level(config.logging.level.filter())
        .parse_default_env()
        .init();
    set_log_level(config.logging.level);
    set_error_handler(|err| eprintln!("❌ {}", err));

    if options.list {
        for demo in DEMOS {
            println!("{}", demo);
        }
        return Ok(());
    }

    let demo = options.demo.as_deref().unwrap_or(DEMOS[0]);
    info!("Démarrage de Pixel Shader Rust v{} (démo '{}')", VERSION, demo);
    let program = demo_program(demo)?;

    run(config, program)
}
