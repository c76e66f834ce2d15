use crate::{geometry::Rect, Result};

pub type WindowId = u32;
pub type Atom = u32;
pub type Timestamp = u32;
pub type VisualId = u32;

/// A 32-bit client message, as sent with `SendEvent`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ClientMessage {
    pub window: WindowId,
    pub type_: Atom,
    pub format: u8,
    pub data: [u32; 5],
}

impl ClientMessage {
    pub fn new(window: WindowId, type_: Atom, data: [u32; 5]) -> Self {
        ClientMessage { window, type_, format: 32, data }
    }
}

/// Color and alpha layout of a window's drawing surface.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SurfaceFormat {
    pub depth: u8,
    pub visual: VisualId,
    pub colormap: u32,
}

/// The subset of windowing system events the tray cares about.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TrayEvent {
    ClientMessage(ClientMessage),
    Destroyed { window: WindowId },
    Reparented { window: WindowId, parent: WindowId },
    Exposed { window: WindowId, count: u16 },
    Damaged { drawable: WindowId },
    PropertyChanged { window: WindowId, atom: Atom },
    SelectionCleared { owner: WindowId, selection: Atom },
    /// An asynchronous protocol error, usually caused by a client window vanishing mid-request.
    Error { kind: String, bad_value: u32, major_opcode: u8 },
    Other,
}

/// Everything the tray needs from the windowing system.
///
/// Requests that touch windows owned by other processes may fail asynchronously; such failures
/// are reported through [`TrayEvent::Error`] rather than through the returned `Result`.
pub trait TrayBackend {
    fn root_window(&self, screen: usize) -> Result<WindowId>;
    fn intern_atom(&mut self, name: &str) -> Result<Atom>;
    /// The screen's 32-bit alpha capable visual, or its default visual if it has none.
    fn alpha_visual(&self, screen: usize) -> Result<VisualId>;

    /// Create an unmapped, input-only window on `screen` that receives property and structure
    /// notifications.
    fn create_manager_window(&mut self, screen: usize) -> Result<WindowId>;
    fn destroy_window(&mut self, window: WindowId) -> Result<()>;
    /// Current server time, as observed through a property change on `window`.
    fn server_time(&mut self, window: WindowId) -> Result<Timestamp>;

    fn selection_owner(&mut self, selection: Atom) -> Result<Option<WindowId>>;
    fn set_selection_owner(&mut self, owner: WindowId, selection: Atom, time: Timestamp) -> Result<()>;
    /// The owner window and timestamp of the last claim on `selection` made through this backend,
    /// as long as that window has not been destroyed.
    fn own_claim(&self, selection: Atom) -> Option<(WindowId, Timestamp)>;
    fn set_property32(&mut self, window: WindowId, property: Atom, type_: Atom, values: &[u32]) -> Result<()>;
    /// Send `message` to `destination`, selecting StructureNotify listeners.
    fn send_client_message(&mut self, destination: WindowId, message: &ClientMessage) -> Result<()>;

    fn surface_format(&mut self, window: WindowId) -> Result<SurfaceFormat>;
    /// Create a child window of `container` with the given surface format. The window exists on
    /// the server once this returns.
    fn create_wrapper(&mut self, container: WindowId, format: &SurfaceFormat) -> Result<WindowId>;
    fn show(&mut self, window: WindowId) -> Result<()>;
    /// Stop the server from painting `window` onto its parent and report content changes as
    /// [`TrayEvent::Damaged`].
    fn set_composited(&mut self, window: WindowId) -> Result<()>;
    /// Reparent the foreign `client` window into `wrapper` and start the embedding life cycle.
    fn embed(&mut self, wrapper: WindowId, client: WindowId) -> Result<()>;
    /// Map or unmap an embedded `client` according to the mapped flag of its `_XEMBED_INFO`.
    /// A client without the property is left alone.
    fn sync_mapped(&mut self, client: WindowId) -> Result<()>;
    fn configure(&mut self, window: WindowId, rect: Rect) -> Result<()>;
    /// Current position and size of `window` relative to its parent.
    fn allocation(&mut self, window: WindowId) -> Result<Rect>;
    /// Copy the backing surface of `source` unscaled onto `target` at `at`.
    fn draw_window(&mut self, source: WindowId, target: WindowId, at: Rect) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}
