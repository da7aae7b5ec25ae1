//! Queue family resolution.
use crate::BootstrapSmallVec;
use ash::prelude::VkResult;
use ash::vk;
use std::{collections::BTreeSet, os::raw::c_float};

/// Priority given to every requested queue.
pub const QUEUE_PRIORITY: c_float = 1.0;

/// Queue family indices found on a physical device. Either index may be
/// absent; use [`QueueFamilyIndices::complete`] before creating a device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct QueueFamilyIndices {
    /// First queue family with at least one queue and graphics support.
    pub graphics: Option<u32>,
    /// First queue family able to present to the surface.
    pub present: Option<u32>,
    presentation_required: bool,
}

impl QueueFamilyIndices {
    /// Empty indices. When `presentation_required` is false the present
    /// index is not needed for completeness.
    #[inline]
    pub fn new(presentation_required: bool) -> QueueFamilyIndices {
        QueueFamilyIndices {
            graphics: None,
            present: None,
            presentation_required,
        }
    }

    /// Whether a present family is part of the requirements.
    #[inline]
    pub fn presentation_required(&self) -> bool {
        self.presentation_required
    }

    /// True if every required family was found.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && (!self.presentation_required || self.present.is_some())
    }

    /// Converts into [`ResolvedQueueFamilies`] if complete.
    #[inline]
    pub fn complete(&self) -> Option<ResolvedQueueFamilies> {
        if !self.is_complete() {
            return None;
        }

        Some(ResolvedQueueFamilies {
            graphics: self.graphics?,
            present: if self.presentation_required {
                self.present
            } else {
                None
            },
        })
    }
}

/// Queue families of a suitable device. Only obtainable from complete
/// [`QueueFamilyIndices`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResolvedQueueFamilies {
    graphics: u32,
    present: Option<u32>,
}

impl ResolvedQueueFamilies {
    /// Family the graphics queue is taken from.
    #[inline]
    pub fn graphics(&self) -> u32 {
        self.graphics
    }

    /// Family the present queue is taken from, if presenting.
    #[inline]
    pub fn present(&self) -> Option<u32> {
        self.present
    }

    /// Distinct family indices, in ascending order.
    pub fn distinct(&self) -> BootstrapSmallVec<u32> {
        let families: BTreeSet<u32> = std::iter::once(self.graphics).chain(self.present).collect();
        families.into_iter().collect()
    }

    /// One [`QueueSetup`] with a single queue per distinct family.
    pub fn queue_setups(&self) -> BootstrapSmallVec<QueueSetup> {
        self.distinct()
            .into_iter()
            .map(|queue_family_index| QueueSetup::simple(queue_family_index, 1))
            .collect()
    }
}

/// Scans `queue_family_properties` in index order for a graphics family and,
/// if `presentation_required`, a family for which `surface_support` returns
/// true. Each index is the first match; the scan stops once both are found.
///
/// Returns `Err(_)` when a `surface_support` query failed.
pub fn find_queue_families(
    queue_family_properties: &[vk::QueueFamilyProperties],
    presentation_required: bool,
    mut surface_support: impl FnMut(u32) -> VkResult<bool>,
) -> VkResult<QueueFamilyIndices> {
    let mut indices = QueueFamilyIndices::new(presentation_required);
    for (i, properties) in queue_family_properties.iter().enumerate() {
        let i = i as u32;

        if indices.graphics.is_none()
            && properties.queue_count > 0
            && properties.queue_flags.contains(vk::QueueFlags::GRAPHICS)
        {
            indices.graphics = Some(i);
        }

        if presentation_required && indices.present.is_none() && surface_support(i)? {
            indices.present = Some(i);
        }

        if indices.is_complete() {
            break;
        }
    }

    Ok(indices)
}

/// Setup for [`vk::Queue`] creation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSetup {
    /// Flags used to specify usage behavior of the queue.
    pub flags: vk::DeviceQueueCreateFlags,
    /// Index of the queue family in the queue family array.
    pub queue_family_index: u32,
    /// Specifies the amount of queues and the respective priority for each.
    pub queue_priorities: Vec<c_float>,
}

impl QueueSetup {
    /// Queue setup with `queue_count` queues at [`QUEUE_PRIORITY`] and empty
    /// flags.
    #[inline]
    pub fn simple(queue_family_index: u32, queue_count: usize) -> QueueSetup {
        QueueSetup {
            flags: vk::DeviceQueueCreateFlags::empty(),
            queue_family_index,
            queue_priorities: vec![QUEUE_PRIORITY; queue_count],
        }
    }

    #[inline]
    pub(crate) fn as_vulkan(&self) -> vk::DeviceQueueCreateInfoBuilder {
        vk::DeviceQueueCreateInfo::builder()
            .flags(self.flags)
            .queue_family_index(self.queue_family_index)
            .queue_priorities(&self.queue_priorities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(queue_count: u32, queue_flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags,
            queue_count,
            ..Default::default()
        }
    }

    fn no_surface(_: u32) -> VkResult<bool> {
        panic!("surface support queried without a surface")
    }

    #[test]
    fn graphics_is_first_match() {
        let families = [
            family(2, vk::QueueFlags::TRANSFER),
            family(1, vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE),
            family(4, vk::QueueFlags::GRAPHICS),
        ];

        for _ in 0..3 {
            let indices = find_queue_families(&families, false, no_surface).unwrap();
            assert_eq!(indices.graphics, Some(1));
            assert_eq!(indices.present, None);
            assert!(indices.is_complete());
        }
    }

    #[test]
    fn empty_graphics_family_is_skipped() {
        let families = [
            family(0, vk::QueueFlags::GRAPHICS),
            family(1, vk::QueueFlags::GRAPHICS),
        ];

        let indices = find_queue_families(&families, false, no_surface).unwrap();
        assert_eq!(indices.graphics, Some(1));
    }

    #[test]
    fn no_graphics_is_incomplete() {
        let families = [family(3, vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER)];

        let indices = find_queue_families(&families, false, no_surface).unwrap();
        assert!(!indices.is_complete());
        assert_eq!(indices.complete(), None);
    }

    #[test]
    fn present_found_independently() {
        let families = [
            family(1, vk::QueueFlags::GRAPHICS),
            family(1, vk::QueueFlags::TRANSFER),
            family(1, vk::QueueFlags::COMPUTE),
        ];

        let indices = find_queue_families(&families, true, |i| Ok(i == 2)).unwrap();
        assert_eq!(indices.graphics, Some(0));
        assert_eq!(indices.present, Some(2));

        let resolved = indices.complete().unwrap();
        assert_eq!(resolved.graphics(), 0);
        assert_eq!(resolved.present(), Some(2));
    }

    #[test]
    fn scan_stops_once_complete() {
        let families = [
            family(1, vk::QueueFlags::GRAPHICS),
            family(1, vk::QueueFlags::GRAPHICS),
            family(1, vk::QueueFlags::GRAPHICS),
        ];

        let mut queried = Vec::new();
        let indices = find_queue_families(&families, true, |i| {
            queried.push(i);
            Ok(true)
        })
        .unwrap();

        assert_eq!(indices.graphics, Some(0));
        assert_eq!(indices.present, Some(0));
        assert_eq!(queried, [0]);
    }

    #[test]
    fn resolved_families_drop_unneeded_present() {
        let indices = QueueFamilyIndices {
            graphics: Some(1),
            present: Some(4),
            presentation_required: false,
        };

        let resolved = indices.complete().unwrap();
        assert_eq!(resolved.graphics(), 1);
        assert_eq!(resolved.present(), None);
        assert_eq!(resolved.distinct().as_slice(), [1]);
    }

    #[test]
    fn missing_present_is_incomplete() {
        let families = [family(1, vk::QueueFlags::GRAPHICS)];

        let indices = find_queue_families(&families, true, |_| Ok(false)).unwrap();
        assert_eq!(indices.graphics, Some(0));
        assert!(!indices.is_complete());
    }

    #[test]
    fn surface_query_failure_propagates() {
        let families = [family(1, vk::QueueFlags::GRAPHICS)];

        let result = find_queue_families(&families, true, |_| Err(vk::Result::ERROR_SURFACE_LOST_KHR));
        assert_eq!(result, Err(vk::Result::ERROR_SURFACE_LOST_KHR));
    }

    #[test]
    fn coinciding_families_yield_one_setup() {
        let resolved = ResolvedQueueFamilies {
            graphics: 3,
            present: Some(3),
        };

        let setups = resolved.queue_setups();
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].queue_family_index, 3);
        assert_eq!(setups[0].queue_priorities, [QUEUE_PRIORITY]);
    }

    #[test]
    fn separate_families_yield_one_setup_each() {
        let resolved = ResolvedQueueFamilies {
            graphics: 2,
            present: Some(0),
        };

        let indices: Vec<u32> = resolved
            .queue_setups()
            .iter()
            .map(|setup| setup.queue_family_index)
            .collect();
        assert_eq!(indices, [0, 2]);
    }
}
