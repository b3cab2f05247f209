mod input;
mod shaders;
mod state;

pub use input::PointerButton;
pub use state::ViewerState;
