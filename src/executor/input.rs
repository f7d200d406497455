use std::time::Duration;

use rand::Rng;

use crate::errors::GhosthandResult;
use crate::executor::device::PointerDevice;
use crate::executor::motion;

const DEFAULT_MOVE_SECS: f64 = 0.5;

/// Physical input with human pacing: a hesitation pause before every click
/// and per-character jitter while typing.
pub struct InputActuator<P: PointerDevice> {
    device: P,
}

impl<P: PointerDevice> InputActuator<P> {
    pub fn new(device: P) -> Self {
        Self { device }
    }

    pub(crate) fn device_ref(&self) -> &P {
        &self.device
    }

    pub fn move_to(&mut self, x: i32, y: i32) -> GhosthandResult<()> {
        motion::glide(&mut self.device, (x, y), DEFAULT_MOVE_SECS)
    }

    pub fn click(&mut self) -> GhosthandResult<()> {
        let pause = rand::thread_rng().gen_range(0.1..=0.3);
        std::thread::sleep(Duration::from_secs_f64(pause));
        self.device.click()
    }

    pub fn type_text(&mut self, text: &str) -> GhosthandResult<()> {
        for ch in text.chars() {
            self.device.send_key(ch)?;
            let pause = rand::thread_rng().gen_range(0.05..=0.15);
            std::thread::sleep(Duration::from_secs_f64(pause));
        }
        Ok(())
    }
}
