//! Implementation of the freedesktop.org [system tray protocol] for X11.
//!
//! A [`TrayContext`] owns the per-screen `_NET_SYSTEM_TRAY_S<N>` selection, recognizes dock
//! requests sent to its manager window, embeds the requesting icon windows into a container
//! and composites them back into that container on every repaint.
//!
//! [system tray protocol]: https://specifications.freedesktop.org/systemtray-spec/systemtray-spec-latest.html

pub mod atoms;
pub mod backend;
pub mod compositor;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod registry;
pub mod selection;
pub mod xembed;

mod context;
pub use context::*;

pub use backend::{Atom, ClientMessage, SurfaceFormat, Timestamp, TrayBackend, TrayEvent, VisualId, WindowId};
pub use error::{Error, Result};

#[cfg(feature = "x11")]
pub mod x11;

#[cfg(test)]
mod test_backend;
