//! Loanchat is a terminal chat assistant for loan payment questions, backed by
//! Google's Gemini models.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation, the completion gateway, the typing-effect
//!   reveal and the turn orchestrator that ties them together, plus the local
//!   amortization calculator and configuration.
//! - [`ui`] renders the transcript to the terminal and runs the interactive
//!   loop that reads user input.
//! - [`commands`] implements slash-command parsing and execution used by the
//!   chat loop.
//! - [`export`] lays the transcript out on pages and writes it to a file.
//! - [`api`] defines the `generateContent` payloads exchanged with the service.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which initializes [`logging`] and dispatches
//! into [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod export;
pub mod logging;
pub mod ui;
pub mod utils;
