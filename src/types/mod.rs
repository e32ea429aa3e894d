mod category;
mod coord;
mod feature;
mod overpass_types;

pub use category::*;
pub use coord::*;
pub use feature::*;
pub use overpass_types::*;
