mod navigate;
mod profile;

pub use self::navigate::{NavigateOperation, Navigator};
pub use self::profile::{
    ProfileError, ProfileOperation, ProfileOutput, ProfileResult, ProfileStore,
};

// Crux's built-in Render capability covers view updates as is.
pub use crux_core::render::Render;

use crate::event::Event;
use crate::App;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub profile: ProfileStore<Event>,
    pub navigator: Navigator<Event>,
}
