/*!
 * Listener Handles
 * Reference-counted change callbacks with identity-based equality
 */

use std::fmt;
use std::sync::Arc;

type Callback<T> = dyn Fn(Option<&T>, Option<&T>, Option<&str>) + Send + Sync;

/// Change callback receiving `(new_value, old_value, origin_address)`
///
/// Cloning a listener yields a handle to the same callback. Two handles
/// compare equal only when they point at the same allocation, which is what
/// removal uses to find a previously registered listener.
pub struct Listener<T: ?Sized> {
    callback: Arc<Callback<T>>,
}

impl<T: ?Sized> Listener<T> {
    /// Wrap a closure as a listener
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&T>, Option<&T>, Option<&str>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(f),
        }
    }

    /// Invoke the callback
    #[inline]
    pub fn call(&self, new_value: Option<&T>, old_value: Option<&T>, origin: Option<&str>) {
        (self.callback)(new_value, old_value, origin)
    }

    /// Whether both handles refer to the same callback
    #[inline]
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<T: ?Sized> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T: ?Sized> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<T: ?Sized> Eq for Listener<T> {}

impl<T: ?Sized> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("callback", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Remove the first listener identical to `target`
///
/// Returns whether anything was removed.
pub(crate) fn remove_first<T: ?Sized>(listeners: &mut Vec<Listener<T>>, target: &Listener<T>) -> bool {
    match listeners.iter().position(|l| l.same(target)) {
        Some(index) => {
            listeners.remove(index);
            true
        }
        None => false,
    }
}
