pub mod database;
pub mod time;
