mod clip;
mod convert;
mod export;

pub use clip::*;
pub use convert::*;
pub use export::*;
