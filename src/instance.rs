//! Instance creation utils.
use crate::{raw_name, BootstrapSmallVec};
use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance, LoadingError};
use cstr::cstr;
use std::{
    borrow::Cow,
    ffi::{c_void, CStr, CString, NulError},
    fmt,
};
use thiserror::Error;

/// The Khronos validation layer.
pub const VALIDATION_LAYER: &CStr = cstr!("VK_LAYER_KHRONOS_validation");

/// Require, request or disable validation layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationLayers {
    /// Instance creation will fail if there are no validation layers installed.
    Require,
    /// If there are validation layers installed, enable them.
    Request,
    /// Don't enable validation layers.
    Disable,
}

/// Enable or disable the debug messenger, optionally providing a custom callback.
#[derive(Copy, Clone)]
pub enum DebugMessenger {
    /// Enables the debug messenger with the [`default_debug_callback`]
    /// callback.
    Default,
    /// Enables the debug messenger with a custom, user-provided callback.
    Custom {
        /// The user provided callback function. Feel free to take a look at the
        /// [`default_debug_callback`] when implementing your own.
        callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT,
        /// A user data pointer passed to the debug callback.
        user_data_pointer: *mut c_void,
    },
    /// Disables the debug messenger.
    Disable,
}

/// Log level a debug message of `severity` is reported at.
pub fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

/// The default debug callback used in [`DebugMessenger::Default`]. Reports
/// through [`log`] under the `vulkan` target and never aborts the call that
/// triggered the message.
pub unsafe extern "system" fn default_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut c_void,
) -> vk::Bool32 {
    let message = if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr((*p_callback_data).p_message).to_string_lossy()
    };

    log::log!(
        target: "vulkan",
        severity_level(message_severity),
        "{message_severity:?} | {message_type:?}\n{message}"
    );

    vk::FALSE
}

/// Metadata for after instance creation.
#[derive(Clone)]
pub struct InstanceMetadata {
    instance_handle: vk::Instance,
    api_version: u32,
    enabled_layers: BootstrapSmallVec<CString>,
    enabled_extensions: BootstrapSmallVec<CString>,
}

impl InstanceMetadata {
    /// The instance this metadata belongs to.
    #[inline]
    pub fn instance_handle(&self) -> vk::Instance {
        self.instance_handle
    }

    /// Retrieve the used instance API version.
    #[inline]
    pub fn api_version_raw(&self) -> u32 {
        self.api_version
    }

    /// Retrieve the used instance API major version.
    #[inline]
    pub fn api_version_major(&self) -> u32 {
        vk::api_version_major(self.api_version)
    }

    /// Retrieve the used instance API minor version.
    #[inline]
    pub fn api_version_minor(&self) -> u32 {
        vk::api_version_minor(self.api_version)
    }

    /// List of all enabled layers in the instance.
    #[inline]
    pub fn enabled_layers(&self) -> &[CString] {
        &self.enabled_layers
    }

    /// Returns true if `layer` is enabled.
    #[inline]
    pub fn is_layer_enabled(&self, layer: &CStr) -> bool {
        self.enabled_layers.iter().any(|e| e.as_c_str() == layer)
    }

    /// List of all enabled extensions in the instance.
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

impl fmt::Debug for InstanceMetadata {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("InstanceMetadata")
            .field(
                "api_version",
                &format_args!("{}.{}", self.api_version_major(), self.api_version_minor()),
            )
            .field("enabled_layers", &self.enabled_layers)
            .field("enabled_extensions", &self.enabled_extensions)
            .finish()
    }
}

/// Errors that can occur during instance creation.
#[derive(Debug, Error)]
pub enum InstanceCreationError {
    /// Vulkan Error.
    #[error("vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
    /// One or more required layers are not present.
    #[error("validation layers requested, but not available: {0:?}")]
    LayersNotPresent(BootstrapSmallVec<CString>),
    /// One or more required extensions are not present.
    #[error("extensions ({0:?}) not present")]
    ExtensionsNotPresent(BootstrapSmallVec<CString>),
    /// The Vulkan loader could not be loaded.
    #[error("loader creation error: {0}")]
    Loading(#[from] LoadingError),
    /// An application or engine name contained a nul byte.
    #[error("invalid name: {0}")]
    InvalidName(#[from] NulError),
}

/// Splits `wanted` names into the ones to enable and, as the error, the
/// required ones missing from `available`. Optional missing names are dropped.
fn resolve_names<'a>(
    wanted: &[(CString, bool)],
    available: impl Iterator<Item = &'a CStr> + Clone,
) -> Result<BootstrapSmallVec<CString>, BootstrapSmallVec<CString>> {
    let mut enabled: BootstrapSmallVec<CString> = BootstrapSmallVec::new();
    let mut not_present: BootstrapSmallVec<CString> = BootstrapSmallVec::new();
    for (name, required) in wanted {
        if enabled.contains(name) || not_present.contains(name) {
            continue;
        }

        let present = available.clone().any(|available| available == name.as_c_str());
        match (*required, present) {
            (_, true) => enabled.push(name.clone()),
            (true, false) => not_present.push(name.clone()),
            (false, false) => (),
        }
    }

    if not_present.is_empty() {
        Ok(enabled)
    } else {
        Err(not_present)
    }
}

/// Picks the instance API version: `required`, raised to `requested` as far as
/// `supported` allows.
pub fn negotiate_api_version(required: u32, requested: Option<u32>, supported: u32) -> u32 {
    match requested {
        Some(requested) => {
            let supported = vk::make_api_version(
                0,
                vk::api_version_major(supported),
                vk::api_version_minor(supported),
                0,
            );
            required.max(requested.min(supported))
        }
        None => required,
    }
}

/// Allows to easily create an [`ash::Instance`] and its debug messenger.
pub struct InstanceBuilder {
    app_name: CString,
    app_version: u32,
    engine_name: CString,
    engine_version: u32,
    required_api_version: u32,
    requested_api_version: Option<u32>,
    layers: BootstrapSmallVec<(CString, bool)>,
    extensions: BootstrapSmallVec<(CString, bool)>,
    debug_messenger: DebugMessenger,
    debug_message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    debug_message_type: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl InstanceBuilder {
    /// Create a new instance builder with opinionated defaults.
    #[inline]
    pub fn new() -> Self {
        InstanceBuilder {
            app_name: cstr!("Hello Triangle").to_owned(),
            app_version: vk::make_api_version(0, 1, 0, 0),
            engine_name: cstr!("No Engine").to_owned(),
            engine_version: vk::make_api_version(0, 1, 0, 0),
            required_api_version: vk::API_VERSION_1_0,
            requested_api_version: None,
            layers: BootstrapSmallVec::new(),
            extensions: BootstrapSmallVec::new(),
            debug_messenger: DebugMessenger::Disable,
            debug_message_severity: vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            debug_message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }

    /// Application name to advertise.
    #[inline]
    pub fn app_name(mut self, app_name: &str) -> Result<Self, NulError> {
        self.app_name = CString::new(app_name)?;
        Ok(self)
    }

    /// Application version to advertise.
    #[inline]
    pub fn app_version(mut self, major: u32, minor: u32) -> Self {
        self.app_version = vk::make_api_version(0, major, minor, 0);
        self
    }

    /// Engine name to advertise.
    #[inline]
    pub fn engine_name(mut self, engine_name: &str) -> Result<Self, NulError> {
        self.engine_name = CString::new(engine_name)?;
        Ok(self)
    }

    /// Engine version to advertise.
    #[inline]
    pub fn engine_version(mut self, major: u32, minor: u32) -> Self {
        self.engine_version = vk::make_api_version(0, major, minor, 0);
        self
    }

    /// Instance API version to be used as minimum requirement.
    #[inline]
    pub fn require_api_version(mut self, major: u32, minor: u32) -> Self {
        self.required_api_version = vk::make_api_version(0, major, minor, 0);
        self
    }

    /// Instance API version to request. If it is not supported, fall back to
    /// the highest supported version.
    #[inline]
    pub fn request_api_version(mut self, major: u32, minor: u32) -> Self {
        self.requested_api_version = Some(vk::make_api_version(0, major, minor, 0));
        self
    }

    /// Try to enable this layer, ignore if it's not supported
    #[inline]
    pub fn request_layer(mut self, layer: &CStr) -> Self {
        self.layers.push((layer.to_owned(), false));
        self
    }

    /// Enable this layer, fail if it's not supported.
    #[inline]
    pub fn require_layer(mut self, layer: &CStr) -> Self {
        self.layers.push((layer.to_owned(), true));
        self
    }

    /// Try to enable this extension, ignore if it is not supported.
    #[inline]
    pub fn request_extension(mut self, extension: &CStr) -> Self {
        self.extensions.push((extension.to_owned(), false));
        self
    }

    /// Enable this extension, fail if it's not supported.
    #[inline]
    pub fn require_extension(mut self, extension: &CStr) -> Self {
        self.extensions.push((extension.to_owned(), true));
        self
    }

    /// Enable every extension in `extensions`, fail if one is not supported.
    #[inline]
    pub fn require_extensions<'a>(
        mut self,
        extensions: impl IntoIterator<Item = &'a CStr>,
    ) -> Self {
        self.extensions
            .extend(extensions.into_iter().map(|name| (name.to_owned(), true)));
        self
    }

    /// Add Khronos validation layers.
    #[inline]
    pub fn validation_layers(mut self, validation_layers: ValidationLayers) -> Self {
        match validation_layers {
            ValidationLayers::Require | ValidationLayers::Request => {
                self.layers.push((
                    VALIDATION_LAYER.to_owned(),
                    matches!(validation_layers, ValidationLayers::Require),
                ));
            }
            ValidationLayers::Disable => (),
        }

        self
    }

    /// Create a debug messenger with the config provided by
    /// `debug_messenger`. Requires `VK_EXT_debug_utils`.
    #[inline]
    pub fn request_debug_messenger(mut self, debug_messenger: DebugMessenger) -> Self {
        if !matches!(debug_messenger, DebugMessenger::Disable) {
            self.extensions.push((DebugUtils::name().to_owned(), true));
        }

        self.debug_messenger = debug_messenger;
        self
    }

    /// Filter for the severity of debug messages.
    #[inline]
    pub fn debug_message_severity(
        mut self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    ) -> Self {
        self.debug_message_severity = severity;
        self
    }

    /// Filter for the type of debug messages.
    #[inline]
    pub fn debug_message_type(mut self, ty: vk::DebugUtilsMessageTypeFlagsEXT) -> Self {
        self.debug_message_type = ty;
        self
    }

    /// Layers to enable given the `available` ones. Fails with
    /// [`InstanceCreationError::LayersNotPresent`] if a required layer is
    /// missing.
    pub fn enabled_layers(
        &self,
        available: &[vk::LayerProperties],
    ) -> Result<BootstrapSmallVec<CString>, InstanceCreationError> {
        resolve_names(
            &self.layers,
            available.iter().map(|layer| raw_name(&layer.layer_name)),
        )
        .map_err(InstanceCreationError::LayersNotPresent)
    }

    /// Extensions to enable given the `available` ones. Fails with
    /// [`InstanceCreationError::ExtensionsNotPresent`] if a required extension
    /// is missing.
    pub fn enabled_extensions(
        &self,
        available: &[vk::ExtensionProperties],
    ) -> Result<BootstrapSmallVec<CString>, InstanceCreationError> {
        resolve_names(
            &self.extensions,
            available
                .iter()
                .map(|extension| raw_name(&extension.extension_name)),
        )
        .map_err(InstanceCreationError::ExtensionsNotPresent)
    }

    /// Resolves the layers and extensions to enable without touching the
    /// driver. `available_extensions` must include those provided by layers.
    pub fn plan(
        &self,
        available_layers: &[vk::LayerProperties],
        available_extensions: &[vk::ExtensionProperties],
    ) -> Result<(BootstrapSmallVec<CString>, BootstrapSmallVec<CString>), InstanceCreationError>
    {
        Ok((
            self.enabled_layers(available_layers)?,
            self.enabled_extensions(available_extensions)?,
        ))
    }

    fn messenger_info(&self) -> Option<vk::DebugUtilsMessengerCreateInfoEXT> {
        let messenger_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(self.debug_message_severity)
            .message_type(self.debug_message_type);
        let messenger_info = match self.debug_messenger {
            DebugMessenger::Default => messenger_info.pfn_user_callback(Some(default_debug_callback)),
            DebugMessenger::Custom {
                callback,
                user_data_pointer,
            } => messenger_info
                .pfn_user_callback(callback)
                .user_data(user_data_pointer),
            DebugMessenger::Disable => return None,
        };

        Some(messenger_info.build())
    }

    /// Returns the [`ash::Instance`], the debug messenger if it was
    /// requested, and [`InstanceMetadata`] about what is actually enabled in
    /// the instance.
    ///
    /// Layers and extensions are checked before the instance is created.
    pub unsafe fn build(
        self,
        entry: &Entry,
    ) -> Result<
        (
            Instance,
            Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
            InstanceMetadata,
        ),
        InstanceCreationError,
    > {
        let instance_version = entry
            .try_enumerate_instance_version()?
            .unwrap_or(vk::API_VERSION_1_0);
        let api_version = negotiate_api_version(
            self.required_api_version,
            self.requested_api_version,
            instance_version,
        );

        let layer_properties = entry.enumerate_instance_layer_properties()?;
        // Fails here, before any extension query, if a required layer is missing.
        let candidate_layers = self.enabled_layers(&layer_properties)?;

        let mut extension_properties = entry.enumerate_instance_extension_properties(None)?;
        for layer_name in &candidate_layers {
            extension_properties
                .extend(entry.enumerate_instance_extension_properties(Some(layer_name.as_c_str()))?);
        }
        let (enabled_layers, enabled_extensions) =
            self.plan(&layer_properties, &extension_properties)?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&self.app_name)
            .application_version(self.app_version)
            .engine_name(&self.engine_name)
            .engine_version(self.engine_version)
            .api_version(api_version);

        let layer_names: BootstrapSmallVec<_> =
            enabled_layers.iter().map(|name| name.as_ptr()).collect();
        let extension_names: BootstrapSmallVec<_> =
            enabled_extensions.iter().map(|name| name.as_ptr()).collect();

        let mut instance_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        let messenger_info = self.messenger_info();
        let mut instance_messenger_info;
        if let Some(messenger_info) = messenger_info {
            instance_messenger_info = messenger_info;
            instance_info = instance_info.push_next(&mut instance_messenger_info);
        }

        log::debug!("creating instance with layers {enabled_layers:?} and extensions {enabled_extensions:?}");
        let instance = entry.create_instance(&instance_info, None)?;

        let debug_messenger = match messenger_info {
            Some(messenger_info) => {
                let debug_utils = DebugUtils::new(entry, &instance);
                match debug_utils.create_debug_utils_messenger(&messenger_info, None) {
                    Ok(messenger) => Some((debug_utils, messenger)),
                    Err(err) => {
                        instance.destroy_instance(None);
                        return Err(err.into());
                    }
                }
            }
            None => None,
        };

        let instance_metadata = InstanceMetadata {
            instance_handle: instance.handle(),
            api_version,
            enabled_layers,
            enabled_extensions,
        };

        Ok((instance, debug_messenger, instance_metadata))
    }
}

impl Default for InstanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill_raw_name;

    fn layers(names: &[&str]) -> Vec<vk::LayerProperties> {
        names
            .iter()
            .map(|name| {
                let mut layer = vk::LayerProperties::default();
                fill_raw_name(&mut layer.layer_name, name);
                layer
            })
            .collect()
    }

    fn extensions(names: &[&str]) -> Vec<vk::ExtensionProperties> {
        names
            .iter()
            .map(|name| {
                let mut extension = vk::ExtensionProperties::default();
                fill_raw_name(&mut extension.extension_name, name);
                extension
            })
            .collect()
    }

    #[test]
    fn required_validation_layer_missing() {
        let builder = InstanceBuilder::new().validation_layers(ValidationLayers::Require);
        let available = layers(&["VK_LAYER_MESA_device_select"]);

        match builder.enabled_layers(&available) {
            Err(InstanceCreationError::LayersNotPresent(missing)) => {
                assert_eq!(missing.as_slice(), [VALIDATION_LAYER.to_owned()]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn required_validation_layer_present() {
        let builder = InstanceBuilder::new().validation_layers(ValidationLayers::Require);
        let available = layers(&["VK_LAYER_MESA_device_select", "VK_LAYER_KHRONOS_validation"]);

        let enabled = builder.enabled_layers(&available).unwrap();
        assert_eq!(enabled.as_slice(), [VALIDATION_LAYER.to_owned()]);
    }

    #[test]
    fn requested_validation_layer_missing_is_skipped() {
        let builder = InstanceBuilder::new().validation_layers(ValidationLayers::Request);

        assert!(builder.enabled_layers(&[]).unwrap().is_empty());
    }

    #[test]
    fn disabled_validation_enables_nothing() {
        let builder = InstanceBuilder::new().validation_layers(ValidationLayers::Disable);
        let available = layers(&["VK_LAYER_KHRONOS_validation"]);

        assert!(builder.enabled_layers(&available).unwrap().is_empty());
    }

    #[test]
    fn debug_messenger_requires_debug_utils() {
        let builder = InstanceBuilder::new()
            .require_extension(cstr!("VK_KHR_surface"))
            .request_debug_messenger(DebugMessenger::Default);

        match builder.enabled_extensions(&extensions(&["VK_KHR_surface"])) {
            Err(InstanceCreationError::ExtensionsNotPresent(missing)) => {
                assert_eq!(missing.as_slice(), [DebugUtils::name().to_owned()]);
            }
            other => panic!("unexpected result {other:?}"),
        }

        let enabled = builder
            .enabled_extensions(&extensions(&["VK_EXT_debug_utils", "VK_KHR_surface"]))
            .unwrap();
        assert_eq!(
            enabled.as_slice(),
            [
                cstr!("VK_KHR_surface").to_owned(),
                DebugUtils::name().to_owned()
            ]
        );
    }

    #[test]
    fn duplicate_extensions_enabled_once() {
        let builder = InstanceBuilder::new()
            .request_extension(cstr!("VK_KHR_surface"))
            .require_extension(cstr!("VK_KHR_surface"));

        let enabled = builder
            .enabled_extensions(&extensions(&["VK_KHR_surface"]))
            .unwrap();
        assert_eq!(enabled.len(), 1);
    }

    #[test]
    fn plan_resolves_layers_and_extensions() {
        let builder = InstanceBuilder::new()
            .validation_layers(ValidationLayers::Request)
            .request_debug_messenger(DebugMessenger::Default);

        let (enabled_layers, enabled_extensions) = builder
            .plan(
                &layers(&["VK_LAYER_KHRONOS_validation"]),
                &extensions(&["VK_EXT_debug_utils"]),
            )
            .unwrap();
        assert_eq!(enabled_layers.as_slice(), [VALIDATION_LAYER.to_owned()]);
        assert_eq!(
            enabled_extensions.as_slice(),
            [DebugUtils::name().to_owned()]
        );

        assert!(matches!(
            builder
                .validation_layers(ValidationLayers::Require)
                .plan(&[], &extensions(&["VK_EXT_debug_utils"])),
            Err(InstanceCreationError::LayersNotPresent(_))
        ));
    }

    #[test]
    fn missing_names_reported_once() {
        let builder = InstanceBuilder::new()
            .require_layer(VALIDATION_LAYER)
            .validation_layers(ValidationLayers::Require)
            .require_extension(cstr!("VK_KHR_surface"))
            .require_extension(cstr!("VK_KHR_surface"));

        match builder.enabled_layers(&[]) {
            Err(InstanceCreationError::LayersNotPresent(missing)) => {
                assert_eq!(missing.as_slice(), [VALIDATION_LAYER.to_owned()]);
            }
            other => panic!("unexpected result {other:?}"),
        }

        match builder.enabled_extensions(&[]) {
            Err(InstanceCreationError::ExtensionsNotPresent(missing)) => {
                assert_eq!(missing.as_slice(), [cstr!("VK_KHR_surface").to_owned()]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn disabled_messenger_has_no_info() {
        assert!(InstanceBuilder::new().messenger_info().is_none());
        assert!(InstanceBuilder::new()
            .request_debug_messenger(DebugMessenger::Default)
            .messenger_info()
            .is_some());
    }

    #[test]
    fn api_version_negotiation() {
        let supported = vk::make_api_version(0, 1, 2, 189);

        assert_eq!(
            negotiate_api_version(vk::API_VERSION_1_0, None, supported),
            vk::API_VERSION_1_0
        );
        assert_eq!(
            negotiate_api_version(vk::API_VERSION_1_0, Some(vk::API_VERSION_1_3), supported),
            vk::API_VERSION_1_2
        );
        assert_eq!(
            negotiate_api_version(vk::API_VERSION_1_1, Some(vk::API_VERSION_1_0), supported),
            vk::API_VERSION_1_1
        );
    }

    #[test]
    fn severity_maps_to_log_level() {
        use vk::DebugUtilsMessageSeverityFlagsEXT as Severity;

        assert_eq!(severity_level(Severity::ERROR), log::Level::Error);
        assert_eq!(severity_level(Severity::WARNING), log::Level::Warn);
        assert_eq!(severity_level(Severity::INFO), log::Level::Info);
        assert_eq!(severity_level(Severity::VERBOSE), log::Level::Trace);
    }

    #[test]
    #[ignore = "requires a Vulkan loader"]
    fn basic() {
        let entry = unsafe { Entry::load() }.unwrap();
        let (instance, _debug_messenger, _metadata) =
            unsafe { InstanceBuilder::new().build(&entry).unwrap() };

        unsafe {
            instance.destroy_instance(None);
        }
    }

    #[test]
    #[ignore = "requires a Vulkan loader"]
    fn validation_and_messenger() {
        let entry = unsafe { Entry::load() }.unwrap();
        let (instance, debug_messenger, metadata) = unsafe {
            InstanceBuilder::new()
                .validation_layers(ValidationLayers::Request)
                .request_debug_messenger(DebugMessenger::Default)
                .build(&entry)
                .unwrap()
        };
        assert!(metadata.is_extension_enabled(DebugUtils::name()));

        unsafe {
            if let Some((debug_utils, debug_messenger)) = debug_messenger {
                debug_utils.destroy_debug_utils_messenger(debug_messenger, None);
            }

            instance.destroy_instance(None);
        }
    }
}
