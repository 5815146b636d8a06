pub mod booking_statuses;
pub mod discount_types;
pub mod message_roles;
pub mod transaction_statuses;
pub mod user_roles;
pub mod user_tiers;
