pub mod builder;
pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod selection;
pub mod session;
pub mod viewport;
