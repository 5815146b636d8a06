pub mod analytics;
pub mod bookings;
pub mod chat_messages;
pub mod chatbot;
pub mod diaries;
pub mod emotions;
pub mod enums;
pub mod images;
pub mod psychologists;
pub mod streaks;
pub mod time_slots;
pub mod transactions;
pub mod users;
pub mod vouchers;
