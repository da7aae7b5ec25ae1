//! The whole bring-up sequence behind one value.
use crate::{
    create_surface, required_surface_extensions, DebugMessenger, DeviceBuilder, DeviceCreationError, DeviceMetadata,
    InstanceBuilder, InstanceCreationError, InstanceDeviceQuery, InstanceMetadata, Queues, Stage,
    SurfaceCreationError, Teardown, ValidationLayers, WindowError,
};
use ash::extensions::khr::Surface;
use ash::{vk, Device, Entry, Instance};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::ffi::{CStr, CString};
use thiserror::Error;

/// Errors that can occur anywhere in the bring-up.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Window creation failed.
    #[error(transparent)]
    Window(#[from] WindowError),
    /// Instance creation failed.
    #[error(transparent)]
    Instance(#[from] InstanceCreationError),
    /// Surface creation failed.
    #[error(transparent)]
    Surface(#[from] SurfaceCreationError),
    /// Device selection or creation failed.
    #[error(transparent)]
    Device(#[from] DeviceCreationError),
}

/// What [`Bootstrap::new`] brings up.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Application name advertised to the driver.
    pub app_name: String,
    /// Validation layers plus the default debug messenger. Defaults to on in
    /// debug builds.
    pub diagnostics: bool,
    /// Create a surface, require a present queue and `VK_KHR_swapchain`. The
    /// window's instance extensions are enabled either way.
    pub present: bool,
    /// Further device extensions to require.
    pub device_extensions: Vec<CString>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        BootstrapConfig {
            app_name: "Hello Triangle".to_owned(),
            diagnostics: cfg!(debug_assertions),
            present: true,
            device_extensions: Vec::new(),
        }
    }
}

impl BootstrapConfig {
    /// Instance builder for this configuration, requiring the
    /// `window_extensions` the windowing system needs.
    pub fn instance_builder(
        &self,
        window_extensions: &[&CStr],
    ) -> Result<InstanceBuilder, InstanceCreationError> {
        let builder = InstanceBuilder::new()
            .app_name(&self.app_name)?
            .require_extensions(window_extensions.iter().copied());
        Ok(if self.diagnostics {
            builder
                .validation_layers(ValidationLayers::Require)
                .request_debug_messenger(DebugMessenger::Default)
        } else {
            builder
        })
    }

    /// Device builder for this configuration.
    pub fn device_builder(&self) -> DeviceBuilder {
        let builder = if self.present {
            DeviceBuilder::new().require_swapchain()
        } else {
            DeviceBuilder::new()
        };

        self.device_extensions
            .iter()
            .fold(builder, |builder, extension| builder.require_extension(extension))
    }
}

/// Every handle created during bring-up. Dropping it destroys them in reverse
/// creation order: device, surface, debug messenger, instance.
pub struct Bootstrap {
    // Must stay the first field so it drops before `entry`.
    teardown: Teardown,
    device: Device,
    queues: Queues,
    device_metadata: DeviceMetadata,
    surface: Option<(Surface, vk::SurfaceKHR)>,
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    instance: Instance,
    instance_metadata: InstanceMetadata,
    entry: Entry,
}

impl Bootstrap {
    /// Loads Vulkan and brings up instance, debug messenger, surface and
    /// device for `window`. On failure everything created so far is
    /// destroyed before the error is returned.
    ///
    /// `window` must outlive the returned value.
    pub unsafe fn new(
        window: &(impl HasRawDisplayHandle + HasRawWindowHandle),
        config: &BootstrapConfig,
    ) -> Result<Bootstrap, BootstrapError> {
        let entry = Entry::load().map_err(InstanceCreationError::from)?;
        let mut teardown = Teardown::new();

        let window_extensions =
            required_surface_extensions(window).map_err(InstanceCreationError::from)?;
        let (instance, debug_messenger, instance_metadata) = config
            .instance_builder(&window_extensions)?
            .build(&entry)?;
        log::debug!("created {instance_metadata:?}");
        teardown.push(Stage::Instance, {
            let instance = instance.clone();
            move || unsafe { instance.destroy_instance(None) }
        });

        let debug_messenger = debug_messenger.map(|(debug_utils, messenger)| {
            teardown.push(Stage::DebugMessenger, move || unsafe {
                debug_utils.destroy_debug_utils_messenger(messenger, None)
            });
            messenger
        });

        let surface = if config.present {
            let (surface_loader, surface) = create_surface(&entry, &instance, window)?;
            log::debug!("created surface {surface:?}");
            teardown.push(Stage::Surface, {
                let surface_loader = surface_loader.clone();
                move || unsafe { surface_loader.destroy_surface(surface, None) }
            });
            Some((surface_loader, surface))
        } else {
            None
        };

        let query = InstanceDeviceQuery::new(
            &instance,
            surface
                .as_ref()
                .map(|(surface_loader, surface)| (surface_loader, *surface)),
        );
        let (device, queues, device_metadata) =
            config
                .device_builder()
                .build(&query, &instance, &instance_metadata)?;
        teardown.push(Stage::Device, {
            let device = device.clone();
            move || unsafe { device.destroy_device(None) }
        });

        Ok(Bootstrap {
            teardown,
            device,
            queues,
            device_metadata,
            surface,
            debug_messenger,
            instance,
            instance_metadata,
            entry,
        })
    }

    /// The loaded Vulkan entry points.
    #[inline]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// The instance.
    #[inline]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// What is enabled on the instance.
    #[inline]
    pub fn instance_metadata(&self) -> &InstanceMetadata {
        &self.instance_metadata
    }

    /// The debug messenger, if diagnostics are enabled.
    #[inline]
    pub fn debug_messenger(&self) -> Option<vk::DebugUtilsMessengerEXT> {
        self.debug_messenger
    }

    /// The surface and its extension loader, if presenting.
    #[inline]
    pub fn surface(&self) -> Option<(&Surface, vk::SurfaceKHR)> {
        self.surface
            .as_ref()
            .map(|(surface_loader, surface)| (surface_loader, *surface))
    }

    /// The logical device.
    #[inline]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Queues retrieved from the device.
    #[inline]
    pub fn queues(&self) -> Queues {
        self.queues
    }

    /// What was selected and enabled for the device.
    #[inline]
    pub fn device_metadata(&self) -> &DeviceMetadata {
        &self.device_metadata
    }

    /// Handles still waiting to be destroyed, in creation order.
    #[inline]
    pub fn pending_teardown(&self) -> impl Iterator<Item = Stage> + '_ {
        self.teardown.stages()
    }
}
