pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod calendar;
pub mod chat_messages;
pub mod chatbot;
pub mod diaries;
pub mod emotions;
pub mod profiles;
pub mod psychologists;
#[cfg(test)]
pub mod test_support;
pub mod tier_resolver;
pub mod transactions;
pub mod vouchers;
