pub mod imgbb_client;
