use winit::{
    event::{ElementState, WindowEvent},
    keyboard::Key,
};

/// The only window events the game hears about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Quit,
    KeyDown(Key),
    Resized { width: u32, height: u32 },
}

impl PlatformEvent {
    /// Key repeats count as presses. Anything not listed above maps to `None`.
    pub fn from_window_event(event: &WindowEvent) -> Option<PlatformEvent> {
        match event {
            WindowEvent::CloseRequested => Some(PlatformEvent::Quit),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                Some(PlatformEvent::KeyDown(event.logical_key.clone()))
            }
            WindowEvent::Resized(size) => Some(PlatformEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }
}
