pub mod billing_events;
pub mod checkout;
pub mod contact_sync;
pub mod lead_capture;
