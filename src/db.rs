// src/db.rs

pub mod user_repo;
pub use user_repo::{NewUser, UserRepository};
pub mod property_repo;
pub use property_repo::{NewProperty, PropertyChanges, PropertyRepository};
pub mod lead_repo;
pub use lead_repo::{LeadRepository, NewLead};
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod withdrawal_repo;
pub use withdrawal_repo::WithdrawalRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
