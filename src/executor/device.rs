use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use crate::errors::{GhosthandError, GhosthandResult};

/// Raw pointer/keyboard capability seam. Failures here are capability
/// failures: callers propagate them uncaught, there is no automatic retry.
pub trait PointerDevice {
    fn position(&mut self) -> GhosthandResult<(i32, i32)>;
    fn move_to(&mut self, x: i32, y: i32) -> GhosthandResult<()>;
    fn click(&mut self) -> GhosthandResult<()>;
    fn send_key(&mut self, ch: char) -> GhosthandResult<()>;
    fn screen_size(&mut self) -> GhosthandResult<(u32, u32)>;
}

pub struct EnigoDevice {
    enigo: Enigo,
}

impl EnigoDevice {
    pub fn new() -> GhosthandResult<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| GhosthandError::Actuator(format!("input backend: {e}")))?;
        Ok(Self { enigo })
    }
}

impl PointerDevice for EnigoDevice {
    fn position(&mut self) -> GhosthandResult<(i32, i32)> {
        self.enigo
            .location()
            .map_err(|e| GhosthandError::Actuator(format!("pointer position: {e}")))
    }

    fn move_to(&mut self, x: i32, y: i32) -> GhosthandResult<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| GhosthandError::Actuator(format!("pointer move: {e}")))
    }

    fn click(&mut self) -> GhosthandResult<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| GhosthandError::Actuator(format!("click: {e}")))
    }

    fn send_key(&mut self, ch: char) -> GhosthandResult<()> {
        let mut buf = [0u8; 4];
        self.enigo
            .text(ch.encode_utf8(&mut buf))
            .map_err(|e| GhosthandError::Actuator(format!("keystroke: {e}")))
    }

    fn screen_size(&mut self) -> GhosthandResult<(u32, u32)> {
        let (w, h) = self
            .enigo
            .main_display()
            .map_err(|e| GhosthandError::Actuator(format!("display size: {e}")))?;
        Ok((w as u32, h as u32))
    }
}
