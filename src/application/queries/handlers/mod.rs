//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod cache_handlers;
mod session_handlers;
mod text_handlers;
mod voice_handlers;

pub use cache_handlers::*;
pub use session_handlers::*;
pub use text_handlers::*;
pub use voice_handlers::*;
