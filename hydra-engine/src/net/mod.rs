//! Game-server protocol and transport.

pub mod client;
pub mod protocol;
pub mod util;

pub use client::GameServer;
pub use protocol::{AgentConfiguration, Diff, GameStatus, Reply, Request};
