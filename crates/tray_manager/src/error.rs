use thiserror::Error;

use crate::backend::{VisualId, WindowId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Can't become systray owner: {selection} is already owned by window {owner:#x}. Is another tray running?")]
    SelectionOwned { selection: String, owner: WindowId },
    #[error("Lost ownership of {selection} to another tray")]
    SelectionLost { selection: String },
    #[error("Screen {0} does not exist on this display")]
    NoSuchScreen(usize),
    #[error("X server does not support the {0} extension")]
    MissingExtension(&'static str),
    #[error("Window {0:#x} does not exist")]
    NoSuchWindow(WindowId),
    #[error("No render picture format for visual {0:#x}")]
    NoPictureFormat(VisualId),

    #[cfg(feature = "x11")]
    #[error("Failed to connect to the X server")]
    Connect(#[from] x11rb::errors::ConnectError),
    #[cfg(feature = "x11")]
    #[error("X11 connection error")]
    Connection(#[from] x11rb::errors::ConnectionError),
    #[cfg(feature = "x11")]
    #[error("X11 request failed")]
    Reply(#[from] x11rb::errors::ReplyError),
    #[cfg(feature = "x11")]
    #[error("X11 request failed")]
    ReplyOrId(#[from] x11rb::errors::ReplyOrIdError),
}

pub type Result<T> = std::result::Result<T, Error>;
