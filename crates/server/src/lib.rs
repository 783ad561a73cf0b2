pub mod config;
pub mod error;
pub mod image_proxy;
pub mod routes;
pub mod selector;
pub mod state;
