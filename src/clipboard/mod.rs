/*!
 * Clipboard Module
 * One shared, typed clipboard slot replicated across contexts through the store
 */

pub mod manager;
pub mod types;

pub use manager::Clipboard;
pub use types::{ClipboardListener, ClipboardPayload, ClipboardStats, CopyOptions};
