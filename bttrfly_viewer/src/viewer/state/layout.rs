use super::ViewerState;
use winit::dpi::PhysicalSize;

pub(super) fn resize(state: &mut ViewerState, new_size: PhysicalSize<u32>) {
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    state.size = new_size;
    state.config.width = new_size.width;
    state.config.height = new_size.height;
    state.surface.configure(&state.device, &state.config);
    state.rebuild_mesh_depth();
    log::debug!("viewer resized to {}x{}", new_size.width, new_size.height);
}

pub(super) fn aspect_ratio(size: PhysicalSize<u32>) -> f32 {
    size.width.max(1) as f32 / size.height.max(1) as f32
}
