pub mod bookings;
pub mod chat_messages;
pub mod chatbot_usages;
pub mod conversations;
pub mod diary_entries;
pub mod emotion_entries;
pub mod psychologists;
pub mod transactions;
pub mod users;
pub mod vouchers;
