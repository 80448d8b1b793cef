/*!
 * Observer Traits
 * Lifecycle hooks a component system drives
 */

use std::sync::Arc;

use crate::clipboard::ClipboardPayload;
use crate::core::errors::ClipboardResult;

/// Hooks a component lifecycle system calls around a component of type `T`
///
/// `inject_props` runs at construction, `did_mount` once the component
/// exists, `will_unmount` before it goes away.
pub trait LifecycleHooks<T> {
    /// Seed component properties: `set_prop(name, value)`
    fn inject_props(
        &self,
        set_prop: &mut dyn FnMut(&str, Option<ClipboardPayload>),
    ) -> ClipboardResult<()>;

    /// Component mounted; `None` means the system has no instance to offer
    fn did_mount(&self, component: Option<&Arc<T>>) -> ClipboardResult<()>;

    /// Component about to unmount
    fn will_unmount(&self);
}
