//! bespoke-docs: JSDoc comment scaffolding from the declaration below a
//! `/**` opener.
//!
//! The pipeline reads the logical declaration line, recognizes a function or
//! variable, guesses types, formats tag lines and assembles a snippet with
//! `${N:...}` tab-stops. Editors drive it through [`TextBuffer`].

pub mod buffer;
pub mod command;
pub mod config;
pub mod edit;
pub mod format;
pub mod guess;
pub mod model;
pub mod parser;
pub mod snippet;
pub mod split;

pub use buffer::{MemoryBuffer, TextBuffer};
pub use command::DocBlockCommand;
pub use config::Options;
pub use model::{Declaration, Edit};
