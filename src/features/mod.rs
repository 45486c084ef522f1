pub mod api;
pub mod mysql;
pub mod postgres;
