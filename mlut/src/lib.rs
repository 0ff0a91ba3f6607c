#![doc = include_str!("../README.md")]

pub mod canon;
pub use canon::{FromCanon, ToCanon};

pub mod conf;
pub use conf::{BuildConf, Method};

mod err;
pub use err::Error;

pub mod extract;
pub mod stats;

mod array;
mod lut;
mod values;
mod word;

pub use lut::Lut;

pub use dyn_size_of::GetSize;
