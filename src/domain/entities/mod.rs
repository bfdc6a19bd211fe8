pub mod contact;
pub mod plan;
pub mod subscription_status;
pub mod webhook_event;
