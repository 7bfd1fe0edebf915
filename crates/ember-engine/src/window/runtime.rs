use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::{Key, KeyEvent, KeyState};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "ember".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
        }
    }
}

/// Entry point for the runtime.
///
/// Fixed setup sequence: window creation → surface + device acquisition →
/// callbacks wired → loop { poll events, render, present } → teardown.
/// The loop's only exit conditions are an observed close request (window
/// close or Escape), an `AppControl::Exit` from the application, or an
/// unrecoverable setup failure before the loop starts.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        // Surface an initialization failure to the caller; everything past
        // setup exits the loop cleanly instead of erroring.
        if let Some(err) = state.init_error.take() {
            return Err(err);
        }

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
    init_error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            exit_requested: false,
            init_error: None,
        }
    }

    fn create_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()?;

        self.entry = Some(entry);
        Ok(())
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_entry(event_loop) {
            log::error!("pipeline initialization failed: {e:#}");
            self.init_error = Some(e);
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the animated uniform advances every frame.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let mut exit = false;

        {
            // Split borrows to keep `app` usable inside `ouroboros` closures.
            let (app, entry) = (&mut self.app, &mut self.entry);

            let Some(entry) = entry.as_mut() else {
                return;
            };
            if entry.with_window(|w| w.id()) != window_id {
                return;
            }

            match event {
                WindowEvent::CloseRequested => exit = true,

                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    // Resize payloads may be scaled on high-DPI surfaces;
                    // ask the window for the actual framebuffer size
                    // instead of trusting the raw event values. The GPU
                    // layer ignores repeated identical sizes.
                    let size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                    entry.with_window(|w| w.request_redraw());
                }

                WindowEvent::KeyboardInput { event: key_event, .. } => {
                    let ev = KeyEvent {
                        key: map_key(key_event.physical_key),
                        state: map_key_state(key_event.state),
                        repeat: key_event.repeat,
                    };

                    if app.on_key(ev) == AppControl::Exit {
                        exit = true;
                    }

                    // Escape always maps to a close request, regardless of
                    // what the application does with the event.
                    if ev.key == Key::Escape && ev.state == KeyState::Pressed {
                        exit = true;
                    }
                }

                WindowEvent::RedrawRequested => {
                    let mut control = AppControl::Continue;

                    entry.with_mut(|fields| {
                        let time = fields.clock.tick();

                        let mut ctx = FrameCtx {
                            window: WindowCtx {
                                id: window_id,
                                window: fields.window,
                            },
                            gpu: fields.gpu,
                            time,
                        };

                        control = app.on_frame(&mut ctx);
                    });

                    if control == AppControl::Exit {
                        exit = true;
                    }
                }

                _ => {}
            }
        }

        if exit {
            // The loop finishes its current iteration first (we only get
            // here after the event is fully handled), then the entry drops:
            // draw set, pipeline, device and surface are released exactly
            // once before the event loop terminates.
            self.entry = None;
            self.exit_requested = true;
            event_loop.exit();
        }
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(code) => match code {
            KeyCode::Escape => Key::Escape,
            KeyCode::Enter => Key::Enter,
            KeyCode::Space => Key::Space,

            KeyCode::ArrowUp => Key::ArrowUp,
            KeyCode::ArrowDown => Key::ArrowDown,
            KeyCode::ArrowLeft => Key::ArrowLeft,
            KeyCode::ArrowRight => Key::ArrowRight,

            other => Key::Unknown(other as u32),
        },

        // NativeKeyCode is not a u32 in winit 0.30; preserve "unknown"
        // without a stable numeric.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}

fn map_key_state(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Pressed,
        ElementState::Released => KeyState::Released,
    }
}
