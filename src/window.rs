//! Window creation and the idle event loop.
use thiserror::Error;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    error::OsError,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    platform::run_return::EventLoopExtRunReturn,
    window::{Window, WindowBuilder, WindowId},
};

/// Errors that can occur during window creation.
#[derive(Debug, Error)]
pub enum WindowError {
    /// The windowing system refused to create the window.
    #[error("could not create window: {0}")]
    Os(#[from] OsError),
}

/// How the window is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Window title.
    pub title: String,
    /// Inner width in physical pixels.
    pub width: u32,
    /// Inner height in physical pixels.
    pub height: u32,
    /// Center the window on the primary monitor, if there is one.
    pub centered: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "Vulkan Window".to_owned(),
            width: 1280,
            height: 720,
            centered: true,
        }
    }
}

/// Position that centers `window` on a monitor.
pub fn centered_position(
    monitor_position: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    window: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let offset = |monitor: u32, window: u32| (i64::from(monitor) - i64::from(window)) / 2;
    PhysicalPosition::new(
        (i64::from(monitor_position.x) + offset(monitor_size.width, window.width)) as i32,
        (i64::from(monitor_position.y) + offset(monitor_size.height, window.height)) as i32,
    )
}

/// Opens a window as described by `config`.
pub fn create_window(
    event_loop: &EventLoop<()>,
    config: &WindowConfig,
) -> Result<Window, WindowError> {
    let size = PhysicalSize::new(config.width, config.height);
    let mut builder = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(size);

    if config.centered {
        if let Some(monitor) = event_loop.primary_monitor() {
            builder = builder.with_position(centered_position(
                monitor.position(),
                monitor.size(),
                size,
            ));
        }
    }

    let window = builder.build(event_loop)?;
    log::debug!("created window {:?}", window.id());
    Ok(window)
}

/// True for events that end the idle loop: a close request or Escape.
pub fn is_close_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                input: KeyboardInput {
                    state: ElementState::Pressed,
                    virtual_keycode: Some(VirtualKeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

/// Blocks on window events until `window_id` is asked to close, then returns
/// so the caller can tear down.
pub fn run_until_closed(event_loop: &mut EventLoop<()>, window_id: WindowId) {
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        if let Event::WindowEvent {
            event,
            window_id: id,
        } = event
        {
            if id == window_id && is_close_request(&event) {
                log::debug!("close requested for window {id:?}");
                *control_flow = ControlFlow::Exit;
            }
        }
    });
}
