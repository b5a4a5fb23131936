pub mod amortization;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod gateway;
pub mod message;
pub mod orchestrator;
pub mod providers;
pub mod reveal;
pub mod surface;
