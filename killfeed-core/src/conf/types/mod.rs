mod engine;
mod entrypoint;
mod runtime;
mod server;

pub use engine::*;
pub use entrypoint::*;
pub use runtime::*;
pub use server::*;
