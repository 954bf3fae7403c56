// src/services.rs

pub mod auth;
pub mod document_service;
pub mod earning;
pub mod lead_service;
pub mod payable_service;
pub mod payment_service;
pub mod property_service;
pub mod settings_service;
pub mod wallet_service;
