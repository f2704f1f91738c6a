pub mod base;
pub mod manager;
pub mod table;

pub use base::{LayerProperties, LayerTrait, LayerType};
pub use manager::LayerManager;
pub use table::TableLayer;
