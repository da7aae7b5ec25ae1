//! Ordered release of Vulkan handles.
use std::fmt;

/// What a release action destroys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The [`ash::Instance`].
    Instance,
    /// The debug utils messenger.
    DebugMessenger,
    /// The presentation surface.
    Surface,
    /// The logical [`ash::Device`].
    Device,
}

/// Stack of release actions. Actions run in reverse push order when the stack
/// is released or dropped, so pushing right after each successful creation
/// keeps teardown the mirror image of bring-up on every exit path.
#[derive(Default)]
pub struct Teardown {
    actions: Vec<(Stage, Box<dyn FnOnce()>)>,
}

impl Teardown {
    /// An empty stack.
    #[inline]
    pub fn new() -> Self {
        Teardown::default()
    }

    /// Registers `release` for a handle of kind `stage` that was just created.
    #[inline]
    pub fn push(&mut self, stage: Stage, release: impl FnOnce() + 'static) {
        log::trace!("registered {stage:?} for teardown");
        self.actions.push((stage, Box::new(release)));
    }

    /// Stages still pending, in creation order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.actions.iter().map(|(stage, _)| *stage)
    }

    /// Number of pending release actions.
    #[inline]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs every pending action, last pushed first.
    pub fn release(&mut self) {
        while let Some((stage, release)) = self.actions.pop() {
            log::debug!("destroying {stage:?}");
            release();
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_list().entries(self.stages()).finish()
    }
}
