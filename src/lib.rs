pub mod controller;
pub mod hover;
pub mod keys;
pub mod logging;
pub mod overlay;
pub mod probe;
pub mod settings;
pub mod translate;
