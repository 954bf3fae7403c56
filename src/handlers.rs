// src/handlers.rs

pub mod auth;
pub mod leads;
pub mod payments;
pub mod properties;
pub mod settings;
pub mod users;
pub mod wallet;
