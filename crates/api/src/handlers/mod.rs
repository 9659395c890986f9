pub mod catalog;
pub mod controls;
pub mod navigation;
pub mod settings;
