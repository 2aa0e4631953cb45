//! folio-fx headless runner
//!
//! The animations are meant for the browser (`mount_particle_field` /
//! `mount_shotball` in the wasm build). Natively this binary drives either
//! one through a manual frame scheduler against a recording surface and
//! logs what happened.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use anyhow::{Context, Result};
    use clap::{Parser, ValueEnum};
    use glam::Vec2;

    use folio_fx::platform::{FpsCounter, FrameLoop, ManualScheduler};
    use folio_fx::renderer::DrawList;
    use folio_fx::sim::{ParticleField, ShotBall, TickInput, tick};
    use folio_fx::{FieldSettings, ShotBallSettings};

    #[derive(Debug, Clone, Copy, ValueEnum)]
    enum Component {
        Field,
        Shotball,
    }

    #[derive(Parser, Debug)]
    #[command(about = "Run a folio-fx animation headless")]
    struct Args {
        #[arg(long, value_enum, default_value = "field")]
        component: Component,
        #[arg(long, default_value_t = 600)]
        frames: u64,
        #[arg(long, default_value_t = 800.0)]
        width: f32,
        #[arg(long, default_value_t = 600.0)]
        height: f32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// JSON settings file for the chosen component
        #[arg(long)]
        settings: Option<PathBuf>,
    }

    fn read_settings(path: &Option<PathBuf>) -> Result<Option<String>> {
        path.as_ref()
            .map(|p| {
                std::fs::read_to_string(p).with_context(|| format!("read settings {}", p.display()))
            })
            .transpose()
    }

    /// Fire `frames` frames at 60 Hz timestamps
    fn drive(scheduler: &ManualScheduler, frame_loop: &FrameLoop, frames: u64) {
        frame_loop.start();
        for i in 0..frames {
            if scheduler.fire(i as f64 * 1000.0 / 60.0) == 0 {
                log::warn!("Loop stopped early at frame {i}");
                break;
            }
        }
        frame_loop.stop();
    }

    fn run_field(args: &Args, json: Option<String>) -> Result<()> {
        let settings = match json {
            Some(json) => serde_json::from_str::<FieldSettings>(&json)
                .context("parse particle field settings")?
                .sanitized(),
            None => FieldSettings::default(),
        };
        let size = Vec2::new(args.width, args.height);

        struct State {
            field: ParticleField,
            surface: DrawList,
            lines: usize,
            fps: FpsCounter,
        }
        let state = Rc::new(RefCell::new(State {
            field: ParticleField::new(settings, size, args.seed),
            surface: DrawList::new(size.x, size.y),
            lines: 0,
            fps: FpsCounter::new(),
        }));
        log::info!(
            "Particle field {}x{}: {} dots",
            size.x,
            size.y,
            state.borrow().field.dots().len()
        );

        let scheduler = ManualScheduler::new();
        let frame_loop = {
            let state = state.clone();
            FrameLoop::new(scheduler.clone(), move |time| {
                let mut guard = state.borrow_mut();
                let s = &mut *guard;
                // Sweep the pointer across the middle of the canvas
                let t = (time / 4000.0).fract() as f32;
                let pointer = Vec2::new(t * size.x, size.y * 0.5);
                s.field.set_pointer(Some(pointer));
                s.field.frame(&mut s.surface);
                s.lines += s.surface.lines().count();
                s.fps.record(time);
            })
        };
        drive(&scheduler, &frame_loop, args.frames);

        let s = state.borrow();
        let frames = frame_loop.frames().max(1);
        log::info!(
            "{} frames, {:.1} lines/frame, {} fps (virtual)",
            frame_loop.frames(),
            s.lines as f64 / frames as f64,
            s.fps.fps()
        );
        Ok(())
    }

    fn run_shotball(args: &Args, json: Option<String>) -> Result<()> {
        let settings = ShotBallSettings::from_json(json.as_deref().unwrap_or(""))
            .context("parse ShotBall settings")?;
        let size = Vec2::new(args.width, args.height);

        struct State {
            world: ShotBall,
            surface: DrawList,
            contacts: usize,
            wall_hits: usize,
        }
        let state = Rc::new(RefCell::new(State {
            world: ShotBall::new(settings, size, args.seed),
            surface: DrawList::new(size.x, size.y),
            contacts: 0,
            wall_hits: 0,
        }));
        log::info!(
            "ShotBall {}x{}: {} bodies",
            size.x,
            size.y,
            state.borrow().world.bodies.len()
        );

        let scheduler = ManualScheduler::new();
        let frame_loop = {
            let state = state.clone();
            FrameLoop::new(scheduler.clone(), move |_| {
                let mut guard = state.borrow_mut();
                let s = &mut *guard;
                // Click the center once a second
                let input = TickInput {
                    click: (s.world.frame % 60 == 0).then_some(size * 0.5),
                    ..Default::default()
                };
                let dt = s.world.settings().time_step;
                tick(&mut s.world, &input, dt);
                s.surface.reset();
                s.world.draw(&mut s.surface);
                s.contacts += s.world.contacts;
                s.wall_hits += s.world.wall_hits;
            })
        };
        drive(&scheduler, &frame_loop, args.frames);

        let s = state.borrow();
        log::info!(
            "{} frames, {} contact visits, {} wall hits, kinetic energy {:.2}",
            s.world.frame,
            s.contacts,
            s.wall_hits,
            s.world.kinetic_energy()
        );
        Ok(())
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();
        let json = read_settings(&args.settings)?;
        match args.component {
            Component::Field => run_field(&args, json),
            Component::Shotball => run_shotball(&args, json),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("folio-fx (native) starting...");
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
