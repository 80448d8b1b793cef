/*!
 * Observer Module
 * Component integration: deliver clipboard changes to a component's method
 */

pub mod on_copy;
pub mod traits;

pub use on_copy::{on_copy, CopyMethod, OnCopy};
pub use traits::LifecycleHooks;
