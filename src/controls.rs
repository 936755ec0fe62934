//! Keyboard controls for the lesson scenes.
//!
//! Each scene exposes its tweakable parameters through number keys. The
//! bindings are resolved here so scenes only match on a [`Control`] value and
//! never look at raw winit events.

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
};

/// A finite set of options that a control steps through.
pub trait Cycle: Copy + PartialEq + 'static {
    fn options() -> &'static [Self];

    /// The option after `self`, wrapping around at the end.
    fn next(self) -> Self {
        let options = Self::options();
        let idx = options.iter().position(|o| *o == self).unwrap_or(0);
        options[(idx + 1) % options.len()]
    }

    /// The option before `self`, wrapping around at the start.
    fn prev(self) -> Self {
        let options = Self::options();
        let idx = options.iter().position(|o| *o == self).unwrap_or(0);
        options[(idx + options.len() - 1) % options.len()]
    }
}

/// A control input understood by the scenes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Number keys `0`-`9`. `reverse` is set while shift is held.
    Slot { index: u8, reverse: bool },
    Nudge { dx: i8, dy: i8 },
    Zoom { out: bool },
    NextScene,
    PrevScene,
}

/// Tracks modifier state and turns key presses into [`Control`]s.
#[derive(Debug, Default)]
pub struct ControlMap {
    modifiers: ModifiersState,
}

impl ControlMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) -> Option<Control> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                None
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.map_key(*code),
            _ => None,
        }
    }

    pub fn map_key(&self, code: KeyCode) -> Option<Control> {
        let shift = self.modifiers.shift_key();
        let slot = |index| {
            Some(Control::Slot {
                index,
                reverse: shift,
            })
        };
        match code {
            KeyCode::Tab if shift => Some(Control::PrevScene),
            KeyCode::Tab => Some(Control::NextScene),
            KeyCode::Digit0 => slot(0),
            KeyCode::Digit1 => slot(1),
            KeyCode::Digit2 => slot(2),
            KeyCode::Digit3 => slot(3),
            KeyCode::Digit4 => slot(4),
            KeyCode::Digit5 => slot(5),
            KeyCode::Digit6 => slot(6),
            KeyCode::Digit7 => slot(7),
            KeyCode::Digit8 => slot(8),
            KeyCode::Digit9 => slot(9),
            KeyCode::ArrowLeft => Some(Control::Nudge { dx: -1, dy: 0 }),
            KeyCode::ArrowRight => Some(Control::Nudge { dx: 1, dy: 0 }),
            KeyCode::ArrowUp => Some(Control::Nudge { dx: 0, dy: 1 }),
            KeyCode::ArrowDown => Some(Control::Nudge { dx: 0, dy: -1 }),
            KeyCode::Equal | KeyCode::NumpadAdd => Some(Control::Zoom { out: false }),
            KeyCode::Minus | KeyCode::NumpadSubtract => Some(Control::Zoom { out: true }),
            _ => None,
        }
    }
}

/// Step a [`Cycle`] value forward, or backward when `reverse` is set.
pub fn step<T: Cycle>(value: T, reverse: bool) -> T {
    if reverse { value.prev() } else { value.next() }
}
