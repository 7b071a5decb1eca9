//! CoTools: a chain-of-tools reasoning agent.
//!
//! Wires the reasoning core to the built-in tool capabilities, the SQLite
//! store and the console display, and exposes the command-line entry points.

pub mod cli;
pub mod console;
pub mod runtime;
pub mod scenarios;

pub use console::ConsoleObserver;
pub use runtime::AgentRuntime;
