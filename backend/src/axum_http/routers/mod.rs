pub mod admin_users;
pub mod analytics;
pub mod authentication;
pub mod bookings;
pub mod chat;
pub mod chatbot;
pub mod diaries;
pub mod emotions;
pub mod profiles;
pub mod psychologists;
pub mod transactions;
pub mod vouchers;
