// Technical indicators module
pub mod rsi;

pub use rsi::{gain_loss, rsi_from_averages, WilderAverages};
