pub mod device;
pub mod input;
pub mod motion;
