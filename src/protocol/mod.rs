//! Protocol Module
//!
//! Everything between the engine and the players (non-deterministic).
//!
//! - `codec`: Text frames for turns and the ranking
//! - `gateway`: Turn loop, move deadline, event diagnostics
//! - `stream`: Framed protocol over a reader/writer pair (stdin/stdout)

pub mod codec;
pub mod gateway;
pub mod stream;

pub use gateway::{Gateway, GatewayError, MoveReply, Transport};
pub use stream::StreamTransport;
