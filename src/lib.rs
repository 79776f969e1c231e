//! jstrument - source-to-source instrumentation for JavaScript dynamic analysis.
//!
//! The crate rewrites a JavaScript source file into a behaviorally identical
//! one that reports every semantically interesting event (literals, variable
//! reads and writes, operators, conditions, calls, function entry/exit,
//! throws, ...) to a runtime hook table published under the `D$` global.
//! A user-supplied analysis observes the resulting event stream.
//!
//! # Pipeline
//!
//! ```text
//! source text
//!   -> scanner  (tokens with line/column positions)
//!   -> parser   (tagged-variant AST, every node carries a Loc)
//!   -> instrument (scope pre-passes + visitor walk into a SourceWriter)
//!   -> driver   (preamble with the id->location table + instrumented body)
//! ```
//!
//! The walk is single-threaded and synchronous; ids are allocated in visit
//! order and are unique per file. A source containing the `NO_INSTRUMENT`
//! marker is passed through untouched apart from the preamble.

pub mod cli;
pub mod diagnostics;
pub mod driver;
pub mod instrument;
pub mod parser;
pub mod scanner;
pub mod source_writer;

pub use diagnostics::TransformError;
pub use driver::{instrument_source, InstrumentOptions};
