pub mod bake;
pub mod controller;
pub mod error;
pub mod history;
pub mod input;
pub mod messages;
pub mod model;
pub mod render;
pub mod replay;
pub mod save;
pub mod source;
pub mod surface;
pub mod transform;

pub use controller::MarkupController;
pub use error::{MarkupError, MarkupResult};
pub use input::{Contact, PointerEvent};
pub use messages::{Feedback, MarkupCommand};
pub use surface::DrawingSurface;
