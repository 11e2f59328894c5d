use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ab_glyph::FontVec;
use anyhow::{Context, Result};
use oddex_render::SceneRenderer;
use oddex_schedule::{Scheduler, TickOutcome};
use oddex_timing::{precise_sleep, FrameTimes};
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::context::{ExperimentCtx, FrameInput, KeyEvent};

/// How many refresh intervals to average before trusting the measured
/// frame rate.
const FRAME_RATE_WARMUP: usize = 120;

/// Window shell: owns the surface and the flow scheduler, turns winit
/// events into per-frame input snapshots, and drives one scheduler tick
/// per redraw.
pub struct App {
    font_path: PathBuf,
    windowed: bool,

    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SceneRenderer>,

    flow: Scheduler<ExperimentCtx>,
    ctx: ExperimentCtx,

    frame_times: FrameTimes,
    pending_keys: Vec<KeyEvent>,
    cursor_px: (f32, f32),
    buttons: [bool; 3],
    quit_flag: bool,
    finished: bool,
}

impl App {
    pub fn new(
        flow: Scheduler<ExperimentCtx>,
        ctx: ExperimentCtx,
        font_path: PathBuf,
        windowed: bool,
    ) -> Self {
        Self {
            font_path,
            windowed,
            window: None,
            pixels: None,
            renderer: None,
            flow,
            ctx,
            frame_times: FrameTimes::new(1000),
            pending_keys: Vec::new(),
            cursor_px: (0.0, 0.0),
            buttons: [false; 3],
            quit_flag: false,
            finished: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        log::info!("platform: {} / {}", std::env::consts::OS, std::env::consts::ARCH);
        log::info!("press SPACE to advance, ESC to abort");
        event_loop.run_app(&mut self).map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());

        let mut attributes = Window::default_attributes()
            .with_title("Odd-one-out")
            .with_resizable(false);
        if !self.windowed {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(monitor.clone())));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        if let Some(rate) = monitor.and_then(|m| m.refresh_rate_millihertz()) {
            log::info!("display: {}x{} @ {:.1} Hz", size.width, size.height, rate as f64 / 1000.0);
        } else {
            log::info!("display: {}x{}, refresh rate unknown", size.width, size.height);
        }

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);

        let font_bytes = std::fs::read(&self.font_path)
            .with_context(|| format!("reading font {}", self.font_path.display()))?;
        let font = FontVec::try_from_vec(font_bytes).context("parsing font")?;
        self.renderer = Some(SceneRenderer::new(size.width, size.height, font)?);

        // The mouse is part of the task; keep the cursor visible.
        window.set_cursor_visible(true);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.frame_times.mark_frame();
        if self.ctx.data.info.frame_rate.is_none()
            && self.frame_times.frame_count() >= FRAME_RATE_WARMUP
        {
            let stats = self.frame_times.stats();
            log::info!(
                "measured refresh: {:.1} Hz, jitter {:.3} ms",
                stats.effective_fps,
                stats.jitter_ns / 1e6,
            );
            self.ctx.data.info.frame_rate = Some(stats.effective_fps);
        }

        let renderer = self.renderer.as_mut().context("renderer not ready")?;
        let pixels = self.pixels.as_mut().context("surface not ready")?;

        self.ctx.input = FrameInput {
            keys: std::mem::take(&mut self.pending_keys),
            mouse_pos: renderer.units().from_px(self.cursor_px),
            buttons: self.buttons,
            quit: self.quit_flag,
        };

        match self.flow.tick(&mut self.ctx) {
            TickOutcome::Flip => {
                renderer.render(&self.ctx.scene, pixels.frame_mut())?;
                pixels.render().context("presenting frame")?;
                if self.windowed {
                    // No compositor vsync throttles windowed redraws; cap
                    // the loop at roughly 165 Hz.
                    precise_sleep(Duration::from_millis(6));
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            TickOutcome::Complete => self.finish(event_loop, false),
            TickOutcome::Quit => self.finish(event_loop, true),
        }
        Ok(())
    }

    fn finish(&mut self, event_loop: &ActiveEventLoop, aborted: bool) {
        if self.finished {
            return;
        }
        self.finished = true;
        let saved = if aborted {
            log::warn!("session aborted by escape; saving collected data");
            self.ctx.data.abort_save()
        } else {
            log::info!("experiment completed");
            self.ctx.data.save()
        };
        match saved {
            Ok(path) => log::info!("data file: {}", path.display()),
            Err(err) => log::error!("saving data failed: {err:#}"),
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, key: PhysicalKey) {
        let PhysicalKey::Code(code) = key else { return };
        match code {
            KeyCode::Escape => self.quit_flag = true,
            KeyCode::Space => self.pending_keys.push(KeyEvent {
                name: "space".to_string(),
                t_global: self.ctx.global_clock.seconds(),
            }),
            _ => {}
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        if let Some(pixels) = &mut self.pixels {
            pixels.resize_surface(size.width, size.height)?;
            pixels.resize_buffer(size.width, size.height)?;
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(size.width, size.height)?;
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.create_window_and_surface(event_loop) {
                log::error!("window setup failed: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.finish(event_loop, true),
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop) {
                    log::error!("frame failed: {err:#}");
                    self.finish(event_loop, true);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_key(event.physical_key);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_px = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.buttons[0] = pressed,
                    MouseButton::Middle => self.buttons[1] = pressed,
                    MouseButton::Right => self.buttons[2] = pressed,
                    _ => {}
                }
            }
            WindowEvent::Resized(size) => {
                if let Err(err) = self.handle_resize(size) {
                    log::error!("resize failed: {err:#}");
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.finished {
            event_loop.exit();
        }
    }
}
