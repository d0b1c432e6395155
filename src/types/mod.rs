pub mod bar;
pub mod indicator;
pub mod seasonal;

pub use bar::*;
pub use indicator::*;
pub use seasonal::*;
