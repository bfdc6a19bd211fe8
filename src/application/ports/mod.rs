pub mod crm;
pub mod payment_provider;
