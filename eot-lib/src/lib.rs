#![doc = include_str!("../README.md")]

mod bch;
mod decoder;
mod dispatch;
mod error;
mod packet;
mod report;
mod source;
mod synchronizer;
mod window;

pub use decoder::*;
pub use dispatch::*;
pub use packet::*;
pub use report::*;
pub use source::*;
pub use synchronizer::*;
pub use window::*;

pub use error::{Error, Result};
