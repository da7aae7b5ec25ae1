//! Surface creation for a window.
use ash::extensions::khr::Surface;
use ash::{vk, Entry, Instance};
use ash::prelude::VkResult;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::ffi::CStr;
use thiserror::Error;

/// Errors that can occur during surface creation.
#[derive(Debug, Error)]
pub enum SurfaceCreationError {
    /// Vulkan Error.
    #[error("failed to create window surface: {0}")]
    Vulkan(#[from] vk::Result),
}

/// Instance extensions the windowing system on `display_handle` needs for
/// Vulkan, such as `VK_KHR_surface` and its platform counterpart.
pub fn required_surface_extensions(
    display_handle: &impl HasRawDisplayHandle,
) -> VkResult<Vec<&'static CStr>> {
    let names = ash_window::enumerate_required_extensions(display_handle.raw_display_handle())?;
    // SAFETY: ash-window hands out static, nul-terminated names.
    Ok(names
        .iter()
        .map(|&name| unsafe { CStr::from_ptr(name) })
        .collect())
}

/// Creates a [`vk::SurfaceKHR`] for `window`, together with the surface
/// extension loader needed to query and destroy it.
///
/// The instance must have been created with the extensions from
/// [`required_surface_extensions`], and `window` must outlive the surface.
pub unsafe fn create_surface(
    entry: &Entry,
    instance: &Instance,
    window: &(impl HasRawDisplayHandle + HasRawWindowHandle),
) -> Result<(Surface, vk::SurfaceKHR), SurfaceCreationError> {
    let surface = ash_window::create_surface(
        entry,
        instance,
        window.raw_display_handle(),
        window.raw_window_handle(),
        None,
    )?;

    Ok((Surface::new(entry, instance), surface))
}
