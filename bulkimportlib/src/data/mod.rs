//! Data model: what a scan produces.
//!
//! - **Items**: immutable folder and file descriptors (`ImportItem`, `ItemPath`)
//! - **Counters**: the per-session progress registry (`CounterRegistry`)

pub mod counters;
pub mod item;

pub use counters::{CounterRegistry, CounterSnapshot};
pub use item::{ImportItem, ItemKind, ItemPath};
