// File: crewdeck-auth/src/lib.rs
// Purpose: Identity provider contract and local implementation

pub mod provider;

pub use provider::{IdentityProvider, LocalProvider, Session};
