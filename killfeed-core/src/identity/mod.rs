mod resolver;
mod table;


pub use resolver::{
    DERIVED_ID_MIN, DERIVED_ID_MODULUS, IdentityHints, Provenance, ServerIdentity, resolve,
};
pub use table::{KnownServers, SharedServerTable, StaticServerTable, builtin_known_servers};
