pub mod auth;
pub mod earning;
pub mod lead;
pub mod payment;
pub mod property;
pub mod settings;
pub mod wallet;
