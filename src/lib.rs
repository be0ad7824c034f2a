#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod coerce;
mod copier;
mod number;
mod resolve;
mod write;

mod directive;
pub use directive::*;

mod error;
pub use error::*;

mod registry;
pub use registry::*;

pub use copier::{Copier, Filler, copy, fill};
