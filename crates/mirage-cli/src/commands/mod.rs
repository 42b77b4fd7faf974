pub mod compare;
pub mod config;
pub mod info;
pub mod overlay;
pub mod rank;
