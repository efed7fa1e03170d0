mod arena;
mod camera;
mod core;
mod engine;
mod hud;
mod input;
mod network;
mod sim;

pub use arena::ArenaPlugin;
pub use camera::CameraPlugin;
pub use core::CorePlugin;
pub(crate) use core::UpdateSet;
pub use hud::HudPlugin;
pub use input::InputPlugin;
pub use network::NetworkPlugin;
pub use sim::SimPlugin;
