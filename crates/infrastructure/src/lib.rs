//! Ferrous Hooks Infrastructure Layer
pub mod dns;
pub mod fetch;
pub mod script;
