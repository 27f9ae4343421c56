//! Various model types used within the conducting engine.

pub mod checkpoint;
pub mod event;
pub mod site;

pub use checkpoint::{Checkpoint, Kind, Phase, PlayerId};
pub use event::Event;
pub use site::Site;
