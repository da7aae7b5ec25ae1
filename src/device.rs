//! Physical device selection and logical device creation.
use crate::{
    find_queue_families, raw_name, BootstrapSmallVec, InstanceMetadata, QueueFamilyIndices,
    QueueSetup, ResolvedQueueFamilies,
};
use ash::extensions::khr::Surface;
use ash::prelude::VkResult;
use ash::{vk, Device, Instance};
use std::{
    borrow::Cow,
    collections::HashSet,
    ffi::{CStr, CString},
};
use thiserror::Error;

/// The driver calls device selection depends on.
pub trait DeviceQuery {
    /// All physical devices, in enumeration order.
    fn physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>>;

    /// Queue family properties of `physical_device`, in index order.
    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties>;

    /// Whether queue families have to be able to present.
    fn presentation_required(&self) -> bool;

    /// Whether queue family `queue_family_index` can present. Only called if
    /// [`DeviceQuery::presentation_required`] is true.
    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> VkResult<bool>;

    /// Names of the extensions `physical_device` supports.
    fn extension_names(&self, physical_device: vk::PhysicalDevice) -> VkResult<Vec<CString>>;
}

/// [`DeviceQuery`] backed by an instance and, optionally, a surface.
pub struct InstanceDeviceQuery<'a> {
    instance: &'a Instance,
    surface: Option<(&'a Surface, vk::SurfaceKHR)>,
}

impl<'a> InstanceDeviceQuery<'a> {
    /// `instance` and `surface` must be valid for as long as the query is
    /// used. With a surface, queue families must be able to present to it.
    #[inline]
    pub unsafe fn new(
        instance: &'a Instance,
        surface: Option<(&'a Surface, vk::SurfaceKHR)>,
    ) -> Self {
        InstanceDeviceQuery { instance, surface }
    }

    /// The instance queries go to.
    #[inline]
    pub fn instance(&self) -> &Instance {
        self.instance
    }

    /// The surface presentation is checked against.
    #[inline]
    pub fn surface(&self) -> Option<vk::SurfaceKHR> {
        self.surface.map(|(_, surface)| surface)
    }
}

impl DeviceQuery for InstanceDeviceQuery<'_> {
    fn physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices() }
    }

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        unsafe {
            self.instance
                .get_physical_device_queue_family_properties(physical_device)
        }
    }

    fn presentation_required(&self) -> bool {
        self.surface.is_some()
    }

    fn surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
    ) -> VkResult<bool> {
        match self.surface {
            Some((surface_loader, surface)) => unsafe {
                surface_loader.get_physical_device_surface_support(
                    physical_device,
                    queue_family_index,
                    surface,
                )
            },
            None => Ok(false),
        }
    }

    fn extension_names(&self, physical_device: vk::PhysicalDevice) -> VkResult<Vec<CString>> {
        let properties = unsafe {
            self.instance
                .enumerate_device_extension_properties(physical_device)
        }?;

        Ok(properties
            .iter()
            .map(|extension| raw_name(&extension.extension_name).to_owned())
            .collect())
    }
}

/// Returns the names in `required` that are not in `available`.
pub fn missing_extensions(required: &[CString], available: &[CString]) -> Vec<CString> {
    let available: HashSet<&CStr> = available.iter().map(CString::as_c_str).collect();
    required
        .iter()
        .filter(|name| !available.contains(name.as_c_str()))
        .cloned()
        .collect()
}

/// Suitability of a physical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSuitability {
    /// Every requirement is met.
    Suitable(ResolvedQueueFamilies),
    /// A required queue family is missing.
    MissingQueueFamilies(QueueFamilyIndices),
    /// One or more required extensions are not supported.
    MissingExtensions(Vec<CString>),
    /// The device could not list its extensions.
    ExtensionQueryFailed(vk::Result),
}

impl DeviceSuitability {
    /// Queue families to use if the device is suitable.
    #[inline]
    pub fn queue_families(&self) -> Option<ResolvedQueueFamilies> {
        match self {
            DeviceSuitability::Suitable(queue_families) => Some(*queue_families),
            _ => None,
        }
    }
}

/// Checks `physical_device` against the queue family requirements of `query`
/// and `required_extensions`.
pub fn device_suitability(
    query: &impl DeviceQuery,
    physical_device: vk::PhysicalDevice,
    required_extensions: &[CString],
) -> VkResult<DeviceSuitability> {
    let queue_family_properties = query.queue_family_properties(physical_device);
    let indices = find_queue_families(
        &queue_family_properties,
        query.presentation_required(),
        |i| query.surface_support(physical_device, i),
    )?;

    let queue_families = match indices.complete() {
        Some(queue_families) => queue_families,
        None => return Ok(DeviceSuitability::MissingQueueFamilies(indices)),
    };

    if !required_extensions.is_empty() {
        let available = match query.extension_names(physical_device) {
            Ok(available) => available,
            Err(err) => return Ok(DeviceSuitability::ExtensionQueryFailed(err)),
        };
        let missing = missing_extensions(required_extensions, &available);
        if !missing.is_empty() {
            return Ok(DeviceSuitability::MissingExtensions(missing));
        }
    }

    Ok(DeviceSuitability::Suitable(queue_families))
}

/// A selected physical device and the queue families to use on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PhysicalDeviceSelection {
    /// The selected device.
    pub physical_device: vk::PhysicalDevice,
    /// Its resolved queue families.
    pub queue_families: ResolvedQueueFamilies,
}

/// Picks the first physical device, in enumeration order, that is suitable.
pub fn select_physical_device(
    query: &impl DeviceQuery,
    required_extensions: &[CString],
) -> Result<PhysicalDeviceSelection, DeviceCreationError> {
    let physical_devices = query.physical_devices()?;
    if physical_devices.is_empty() {
        return Err(DeviceCreationError::NoPhysicalDevice);
    }

    for physical_device in physical_devices {
        match device_suitability(query, physical_device, required_extensions)? {
            DeviceSuitability::Suitable(queue_families) => {
                return Ok(PhysicalDeviceSelection {
                    physical_device,
                    queue_families,
                })
            }
            DeviceSuitability::ExtensionQueryFailed(err) => {
                log::warn!("skipping physical device {physical_device:?}: extension query failed: {err}");
            }
            unsuitable => {
                log::debug!("skipping physical device {physical_device:?}: {unsuitable:?}");
            }
        }
    }

    Err(DeviceCreationError::NoSuitableDevice)
}

/// Errors that can occur during device creation.
#[derive(Debug, Error)]
pub enum DeviceCreationError {
    /// Vulkan Error.
    #[error("vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
    /// There are no physical devices with Vulkan support.
    #[error("failed to find GPUs with Vulkan support")]
    NoPhysicalDevice,
    /// No physical device met the requirements.
    #[error("failed to find a suitable GPU")]
    NoSuitableDevice,
}

/// Queues retrieved from a freshly created device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Queues {
    /// Queue 0 of the graphics family.
    pub graphics: vk::Queue,
    /// Queue 0 of the present family, if presenting.
    pub present: Option<vk::Queue>,
}

/// Metadata for after device creation.
#[derive(Debug, Clone)]
pub struct DeviceMetadata {
    device_handle: vk::Device,
    physical_device: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    queue_families: ResolvedQueueFamilies,
    queue_setups: BootstrapSmallVec<QueueSetup>,
    enabled_extensions: BootstrapSmallVec<CString>,
}

impl DeviceMetadata {
    /// The device this metadata belongs to.
    #[inline]
    pub fn device_handle(&self) -> vk::Device {
        self.device_handle
    }

    /// The physical device this device belongs to.
    #[inline]
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Properties of the physical device.
    #[inline]
    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    /// Name of the physical device.
    #[inline]
    pub fn device_name(&self) -> Cow<str> {
        raw_name(&self.properties.device_name).to_string_lossy()
    }

    /// Type of the physical device.
    #[inline]
    pub fn device_type(&self) -> vk::PhysicalDeviceType {
        self.properties.device_type
    }

    /// The queue families queues were taken from.
    #[inline]
    pub fn queue_families(&self) -> ResolvedQueueFamilies {
        self.queue_families
    }

    /// The queue setups which are in use.
    #[inline]
    pub fn queue_setups(&self) -> &[QueueSetup] {
        &self.queue_setups
    }

    /// List of all enabled extensions in the device.
    #[inline]
    pub fn enabled_extensions(&self) -> &[CString] {
        &self.enabled_extensions
    }

    /// Returns true if `extension` is enabled.
    #[inline]
    pub fn is_extension_enabled(&self, extension: &CStr) -> bool {
        self.enabled_extensions.iter().any(|e| e.as_c_str() == extension)
    }
}

/// Selects a physical device and creates a [`Device`] with its queues.
pub struct DeviceBuilder {
    extensions: BootstrapSmallVec<CString>,
}

impl DeviceBuilder {
    /// Create a new device builder. No device extensions are required.
    #[inline]
    pub fn new() -> Self {
        DeviceBuilder {
            extensions: BootstrapSmallVec::new(),
        }
    }

    /// Require a device which supports `extension`.
    /// The extension will be enabled.
    #[inline]
    pub fn require_extension(mut self, extension: &CStr) -> Self {
        if !self.extensions.iter().any(|e| e.as_c_str() == extension) {
            self.extensions.push(extension.to_owned());
        }
        self
    }

    /// Require `VK_KHR_swapchain`.
    #[inline]
    pub fn require_swapchain(self) -> Self {
        self.require_extension(ash::extensions::khr::Swapchain::name())
    }

    /// Device extensions that will be required.
    #[inline]
    pub fn required_extensions(&self) -> &[CString] {
        &self.extensions
    }

    /// Returns the [`Device`], its [`Queues`] and [`DeviceMetadata`].
    ///
    /// The device enables no features, one queue per distinct queue family,
    /// the required extensions and the layers enabled on the instance.
    pub unsafe fn build(
        self,
        query: &impl DeviceQuery,
        instance: &Instance,
        instance_metadata: &InstanceMetadata,
    ) -> Result<(Device, Queues, DeviceMetadata), DeviceCreationError> {
        assert_eq!(instance.handle(), instance_metadata.instance_handle());

        let selection = select_physical_device(query, &self.extensions)?;
        let properties = instance.get_physical_device_properties(selection.physical_device);
        log::info!(
            "selected physical device {:?}",
            raw_name(&properties.device_name)
        );

        let queue_setups = selection.queue_families.queue_setups();
        let queue_create_infos: BootstrapSmallVec<_> = queue_setups
            .iter()
            .map(QueueSetup::as_vulkan)
            .map(|x| x.build())
            .collect();

        let layers: BootstrapSmallVec<_> = instance_metadata
            .enabled_layers()
            .iter()
            .map(|layer| layer.as_ptr())
            .collect();
        let extensions: BootstrapSmallVec<_> =
            self.extensions.iter().map(|extension| extension.as_ptr()).collect();
        let features = vk::PhysicalDeviceFeatures::default();

        let device_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_create_infos)
            .enabled_layer_names(&layers)
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        let device = instance.create_device(selection.physical_device, &device_info, None)?;

        let queue_families = selection.queue_families;
        let queues = Queues {
            graphics: device.get_device_queue(queue_families.graphics(), 0),
            present: queue_families
                .present()
                .map(|present| unsafe { device.get_device_queue(present, 0) }),
        };

        let device_metadata = DeviceMetadata {
            device_handle: device.handle(),
            physical_device: selection.physical_device,
            properties,
            queue_families,
            queue_setups,
            enabled_extensions: self.extensions,
        };

        Ok((device, queues, device_metadata))
    }
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
