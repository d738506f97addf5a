//! Integration entry point: wires the `acceptance/` test modules in, the
//! same way the library wires `src/` modules from `lib.rs`.

mod common;
mod scenarios;
