// idlvisit: IDL parser with a visitor dispatch engine behind a C ABI
//
// `idl` parses source text into an owned `Document` and walks it through the
// `Visitor` trait. `ffi` exposes the same walk to C through a table of
// optional callbacks, plus the parse/release lifecycle.

pub mod common;
pub mod error;
pub mod ffi;
pub mod idl;
#[cfg(feature = "logging")]
pub mod logging;

pub use common::Span;
pub use error::{Error, LimitExceeded, Result};
