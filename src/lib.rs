pub mod api;
pub mod client_ip;
pub mod config;
pub mod geolocation;
pub mod models;
