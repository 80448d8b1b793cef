/*!
 * Copy Observer
 * Routes clipboard changes into a component method, with attach/detach lifecycle
 */

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use super::traits::LifecycleHooks;
use crate::clipboard::{Clipboard, ClipboardListener, ClipboardPayload};
use crate::core::errors::{ClipboardError, ClipboardResult};

/// Component method receiving `(new_payload, old_payload, origin_address)`
pub type CopyMethod<T> =
    fn(&T, Option<&ClipboardPayload>, Option<&ClipboardPayload>, Option<&str>);

/// Listeners registered for the current attachment
struct Attachment {
    remote: ClipboardListener,
    local: Option<ClipboardListener>,
}

/// Observer wiring a [`Clipboard`] to one component
///
/// While attached, clipboard changes from other contexts (and, when enabled,
/// local copies) call `method` on the component. The observer holds only a
/// weak reference to the component. Dropping it detaches.
pub struct OnCopy<T: Send + Sync + 'static> {
    clipboard: Arc<Clipboard>,
    method: CopyMethod<T>,
    prop: String,
    listen_on_local_changes: bool,
    state: Mutex<Option<Attachment>>,
}

/// Build an observer calling `method` on change and seeding `prop` at construction
pub fn on_copy<T: Send + Sync + 'static>(
    clipboard: Arc<Clipboard>,
    method: CopyMethod<T>,
    prop: impl Into<String>,
) -> OnCopy<T> {
    OnCopy {
        clipboard,
        method,
        prop: prop.into(),
        listen_on_local_changes: false,
        state: Mutex::new(None),
    }
}

impl<T: Send + Sync + 'static> OnCopy<T> {
    /// Also deliver copies made in this context (default: off)
    #[must_use]
    pub fn listen_on_local_changes(mut self, enabled: bool) -> Self {
        self.listen_on_local_changes = enabled;
        self
    }

    /// Name of the property seeded by [`inject_props`](LifecycleHooks::inject_props)
    #[must_use]
    pub fn prop(&self) -> &str {
        &self.prop
    }

    /// Whether listeners are currently registered
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Start delivering clipboard changes to `target`
    pub fn attach(&self, target: &Arc<T>) -> ClipboardResult<()> {
        let mut state = self.state.lock();
        if state.is_some() {
            return Err(ClipboardError::AlreadyAttached);
        }

        let remote = self.delegate(Arc::downgrade(target));
        self.clipboard.listen(remote.clone());

        let local = self.listen_on_local_changes.then(|| {
            let local = self.delegate(Arc::downgrade(target));
            self.clipboard.add_local_listener(local.clone());
            local
        });

        debug!(prop = %self.prop, local = local.is_some(), "Copy observer attached");
        *state = Some(Attachment { remote, local });
        Ok(())
    }

    /// Stop delivering changes; returns whether anything was attached
    pub fn detach(&self) -> bool {
        let Some(attachment) = self.state.lock().take() else {
            return false;
        };

        if !self.clipboard.unlisten(&attachment.remote) {
            warn!(prop = %self.prop, "Cross-context listener was already gone");
        }
        if let Some(local) = attachment.local {
            self.clipboard.remove_local_listener(&local);
        }

        debug!(prop = %self.prop, "Copy observer detached");
        true
    }

    fn delegate(&self, target: Weak<T>) -> ClipboardListener {
        let method = self.method;
        ClipboardListener::new(move |new, old, url| {
            if let Some(component) = target.upgrade() {
                method(&component, new, old, url);
            }
        })
    }
}

impl<T: Send + Sync + 'static> LifecycleHooks<T> for OnCopy<T> {
    fn inject_props(
        &self,
        set_prop: &mut dyn FnMut(&str, Option<ClipboardPayload>),
    ) -> ClipboardResult<()> {
        let current = self.clipboard.current()?;
        set_prop(&self.prop, current);
        Ok(())
    }

    fn did_mount(&self, component: Option<&Arc<T>>) -> ClipboardResult<()> {
        let component = component.ok_or_else(|| {
            ClipboardError::InvalidUsage(
                "on_copy must be attached to a stateful component".to_string(),
            )
        })?;
        self.attach(component)
    }

    fn will_unmount(&self) {
        self.detach();
    }
}

impl<T: Send + Sync + 'static> Drop for OnCopy<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for OnCopy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnCopy")
            .field("prop", &self.prop)
            .field("listen_on_local_changes", &self.listen_on_local_changes)
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}
