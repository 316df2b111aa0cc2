mod chunk;
mod clock;
mod environment;
mod growth;
mod narrative;
mod parts;
mod plant;
mod species;
mod suitability;
mod weather;
mod world;

pub use chunk::*;
pub use clock::*;
pub use environment::*;
pub use growth::*;
pub use narrative::*;
pub use parts::*;
pub use plant::*;
pub use species::*;
pub use suitability::*;
pub use weather::*;
pub use world::*;
