//! HTTP Handlers

mod cache;
mod ping;
mod segment;
mod session;
mod speech;
mod voice;

pub use cache::*;
pub use ping::*;
pub use segment::*;
pub use session::*;
pub use speech::*;
pub use voice::*;
