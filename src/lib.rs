#![allow(clippy::missing_safety_doc)]
#![warn(missing_docs)]
/*!
Windowed Vulkan bring-up for Rust, built on [`ash`] and [`ash-window`].

- ✅ Instance creation, with validation layer gating and a debug messenger
- ✅ Surface creation for a [`winit`] window
- ✅ Physical device selection (first suitable device wins)
- ✅ Queue family resolution (graphics and present)
- ✅ Logical device creation and queue retrieval
- ✅ Ordered teardown on every exit path

## Cargo Features

- `surface` (enabled by default): Enables [`raw-window-handle`], [`winit`]
  and everything that needs a window: surface creation, the window helpers
  and [`Bootstrap`].

## Example

```rust,ignore
let mut event_loop = EventLoop::new();
let window = create_window(&event_loop, &WindowConfig::default())?;

let bootstrap = unsafe { Bootstrap::new(&window, &BootstrapConfig::default()) }?;
println!("{}", bootstrap.device_metadata().device_name());

run_until_closed(&mut event_loop, window.id());
drop(bootstrap);
```

Without a window the builders can be used on their own:

```rust,ignore
let entry = unsafe { ash::Entry::load() }?;
let (instance, debug_messenger, instance_metadata) = unsafe {
    InstanceBuilder::new()
        .validation_layers(ValidationLayers::Require)
        .request_debug_messenger(DebugMessenger::Default)
        .build(&entry)
}?;

let query = unsafe { InstanceDeviceQuery::new(&instance, None) };
let (device, queues, device_metadata) =
    unsafe { DeviceBuilder::new().build(&query, &instance, &instance_metadata) }?;
```

## Licensing

This project is licensed under the [zlib License].

[zlib License]: https://opensource.org/licenses/Zlib
[`ash-window`]: https://crates.io/crates/ash-window
[`raw-window-handle`]: https://crates.io/crates/raw-window-handle
[`winit`]: https://crates.io/crates/winit
*/

use std::{ffi::CStr, os::raw::c_char};

#[cfg(feature = "surface")]
pub mod bootstrap;
pub mod device;
pub mod file;
pub mod instance;
pub mod queue;
#[cfg(feature = "surface")]
pub mod surface;
pub mod teardown;
#[cfg(feature = "surface")]
pub mod window;

#[cfg(feature = "surface")]
pub use bootstrap::*;
pub use device::*;
pub use file::*;
pub use instance::*;
pub use queue::*;
#[cfg(feature = "surface")]
pub use surface::*;
pub use teardown::*;
#[cfg(feature = "surface")]
pub use window::*;

type BootstrapSmallVec<T> = smallvec::SmallVec<[T; 8]>;

/// Reads a fixed-size, nul-padded name array as found in
/// [`ash::vk::LayerProperties`] and [`ash::vk::ExtensionProperties`].
/// An array without a terminator yields an empty name.
pub(crate) fn raw_name(raw: &[c_char]) -> &CStr {
    // SAFETY: c_char and u8 have the same size and alignment.
    let bytes = unsafe { std::slice::from_raw_parts(raw.as_ptr().cast::<u8>(), raw.len()) };
    CStr::from_bytes_until_nul(bytes).unwrap_or_default()
}

/// Writes `name` into a fixed-size name array, truncating if necessary.
#[cfg(test)]
pub(crate) fn fill_raw_name(raw: &mut [c_char], name: &str) {
    for (dst, &src) in raw.iter_mut().zip(name.as_bytes()) {
        *dst = src as c_char;
    }
    let end = name.len().min(raw.len() - 1);
    raw[end] = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_name_stops_at_nul() {
        let mut raw = [0 as c_char; 16];
        fill_raw_name(&mut raw, "VK_KHR_surface");
        assert_eq!(raw_name(&raw).to_str().unwrap(), "VK_KHR_surface");
    }

    #[test]
    fn raw_name_without_terminator_is_empty() {
        let raw = [b'a' as c_char; 4];
        assert!(raw_name(&raw).to_bytes().is_empty());
    }
}
