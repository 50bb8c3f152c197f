//! Mapping layer for the Reloop Mixage control surface.
//!
//! Translates surface events into host engine calls and mirrors engine
//! state back onto the surface LEDs. The host side is abstracted behind
//! the traits in `mixage-core`; nothing in this crate touches hardware.

pub use config::{ConfigError, SurfaceConfig};
pub use deck::{DeckControlState, DeckId, WheelMode};
pub use library::LibraryVisibility;
pub use mapping::{BrowseTarget, Control, MappingProfile, Revision};
pub use press::DoublePress;
pub use session::MixageSession;

mod config;
mod deck;
pub mod led;
mod library;
pub mod mapping;
mod press;
mod session;

/// Engine groups the mapping writes to besides the deck channels.
pub mod groups {
    pub const MASTER: &str = "[Master]";
    pub const PREVIEW_DECK: &str = "[PreviewDeck1]";
    pub const LIBRARY: &str = "[Library]";
    pub const PLAYLIST: &str = "[Playlist]";
}
