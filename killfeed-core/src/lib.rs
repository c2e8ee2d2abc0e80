pub mod aggregate;
pub mod cli;
pub mod conf;
pub mod cursor;
pub mod discovery;
pub mod identity;
pub mod ingest;
pub mod logging;
pub mod record;
pub mod remote;
pub mod store;
