pub mod logging;
pub mod markup;
pub mod settings;
