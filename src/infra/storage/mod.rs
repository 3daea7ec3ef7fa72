// Storage implementations for the settings and AFK ports.
// - `mysql_store.rs` is what the bot runs on.
// - `in_memory.rs` backs the unit tests.

pub mod mysql_store;

#[cfg(test)]
pub mod in_memory;

pub use mysql_store::MySqlStore;
