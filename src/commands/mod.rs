pub mod admin;
pub mod rank;
