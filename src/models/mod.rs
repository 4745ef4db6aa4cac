pub mod content;
pub mod image;
pub mod layout;
pub mod outcome;
pub mod request;

pub use content::*;
pub use image::*;
pub use layout::*;
pub use outcome::*;
pub use request::*;
