use std::collections::{BTreeMap, HashMap};

use crate::{
    backend::{Atom, ClientMessage, SurfaceFormat, Timestamp, TrayBackend, VisualId, WindowId},
    geometry::Rect,
    xembed, Error, Result,
};

pub const ALPHA_VISUAL: VisualId = 0x21;
pub const ROOTS: [WindowId; 2] = [0x100, 0x200];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestWindow {
    pub parent: WindowId,
    pub rect: Rect,
    pub mapped: bool,
    pub composited: bool,
    pub format: Option<SurfaceFormat>,
    pub embedded: Option<WindowId>,
}

/// In-memory stand-in for an X server that records everything the tray asks of it.
#[derive(Debug)]
pub struct TestBackend {
    next_id: u32,
    atoms: HashMap<String, Atom>,
    pub windows: BTreeMap<WindowId, TestWindow>,
    pub owners: HashMap<Atom, WindowId>,
    claims: HashMap<Atom, (WindowId, Timestamp)>,
    pub properties: HashMap<(WindowId, Atom), (Atom, Vec<u32>)>,
    pub sent: Vec<(WindowId, ClientMessage)>,
    pub draws: Vec<(WindowId, WindowId, Rect)>,
    pub destroyed: Vec<WindowId>,
    pub time: Timestamp,
    /// Another client that wins every ownership request made through this backend.
    pub race_winner: Option<WindowId>,
    /// Make every configure request fail.
    pub fail_configure: bool,
    /// `_XEMBED_INFO` of client windows, read by `sync_mapped`.
    pub xembed_info: HashMap<WindowId, xembed::Info>,
}

impl TestBackend {
    pub fn new() -> Self {
        let mut windows = BTreeMap::new();
        for root in ROOTS {
            windows.insert(root, TestWindow { mapped: true, rect: Rect::of(0, 0, 1920, 1080), ..TestWindow::default() });
        }
        TestBackend {
            next_id: 0x400000,
            atoms: HashMap::new(),
            windows,
            owners: HashMap::new(),
            claims: HashMap::new(),
            properties: HashMap::new(),
            sent: Vec::new(),
            draws: Vec::new(),
            destroyed: Vec::new(),
            time: 1000,
            race_winner: None,
            fail_configure: false,
            xembed_info: HashMap::new(),
        }
    }

    fn generate_id(&mut self) -> WindowId {
        self.next_id += 1;
        self.next_id
    }

    pub fn atom(&mut self, name: &str) -> Atom {
        self.intern_atom(name).unwrap()
    }

    /// A mapped 32-bit window on the first screen, standing in for the panel.
    pub fn create_container(&mut self) -> WindowId {
        let id = self.generate_id();
        let format = SurfaceFormat { depth: 32, visual: ALPHA_VISUAL, colormap: 0x77 };
        let window = TestWindow { parent: ROOTS[0], rect: Rect::of(0, 0, 200, 24), mapped: true, format: Some(format), ..TestWindow::default() };
        self.windows.insert(id, window);
        id
    }

    /// A top-level window as created by another process.
    pub fn spawn_client(&mut self) -> WindowId {
        let id = self.generate_id() | 0x1000000;
        self.windows.insert(id, TestWindow { parent: ROOTS[0], rect: Rect::of(0, 0, 16, 16), ..TestWindow::default() });
        id
    }

    /// Remove a window without anyone being told, like a crashing client would.
    pub fn vanish(&mut self, window: WindowId) {
        self.windows.remove(&window);
    }

    pub fn children_of(&self, parent: WindowId) -> Vec<WindowId> {
        self.windows.iter().filter(|(_, w)| w.parent == parent).map(|(id, _)| *id).collect()
    }

    fn window_mut(&mut self, window: WindowId) -> Result<&mut TestWindow> {
        self.windows.get_mut(&window).ok_or(Error::NoSuchWindow(window))
    }
}

impl TrayBackend for TestBackend {
    fn root_window(&self, screen: usize) -> Result<WindowId> {
        ROOTS.get(screen).copied().ok_or(Error::NoSuchScreen(screen))
    }

    fn intern_atom(&mut self, name: &str) -> Result<Atom> {
        let next = 100 + self.atoms.len() as Atom;
        Ok(*self.atoms.entry(name.to_string()).or_insert(next))
    }

    fn alpha_visual(&self, screen: usize) -> Result<VisualId> {
        self.root_window(screen)?;
        Ok(ALPHA_VISUAL)
    }

    fn create_manager_window(&mut self, screen: usize) -> Result<WindowId> {
        let root = self.root_window(screen)?;
        let id = self.generate_id();
        self.windows.insert(id, TestWindow { parent: root, rect: Rect::of(-1, -1, 1, 1), ..TestWindow::default() });
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) -> Result<()> {
        self.windows.remove(&window);
        self.windows.retain(|_, w| w.parent != window);
        self.claims.retain(|_, (owner, _)| *owner != window);
        self.destroyed.push(window);
        Ok(())
    }

    fn server_time(&mut self, window: WindowId) -> Result<Timestamp> {
        self.window_mut(window)?;
        self.time += 1;
        Ok(self.time)
    }

    fn selection_owner(&mut self, selection: Atom) -> Result<Option<WindowId>> {
        Ok(self.owners.get(&selection).copied())
    }

    fn set_selection_owner(&mut self, owner: WindowId, selection: Atom, time: Timestamp) -> Result<()> {
        self.claims.insert(selection, (owner, time));
        let owner = self.race_winner.unwrap_or(owner);
        self.owners.insert(selection, owner);
        Ok(())
    }

    fn own_claim(&self, selection: Atom) -> Option<(WindowId, Timestamp)> {
        self.claims.get(&selection).copied()
    }

    fn set_property32(&mut self, window: WindowId, property: Atom, type_: Atom, values: &[u32]) -> Result<()> {
        self.window_mut(window)?;
        self.properties.insert((window, property), (type_, values.to_vec()));
        Ok(())
    }

    fn send_client_message(&mut self, destination: WindowId, message: &ClientMessage) -> Result<()> {
        self.sent.push((destination, *message));
        Ok(())
    }

    fn surface_format(&mut self, window: WindowId) -> Result<SurfaceFormat> {
        let window = self.window_mut(window)?;
        Ok(window.format.unwrap_or(SurfaceFormat { depth: 24, visual: 0x20, colormap: 0x20 }))
    }

    fn create_wrapper(&mut self, container: WindowId, format: &SurfaceFormat) -> Result<WindowId> {
        self.window_mut(container)?;
        let id = self.generate_id();
        self.windows.insert(id, TestWindow { parent: container, rect: Rect::of(0, 0, 1, 1), format: Some(*format), ..TestWindow::default() });
        Ok(id)
    }

    fn show(&mut self, window: WindowId) -> Result<()> {
        self.window_mut(window)?.mapped = true;
        Ok(())
    }

    fn set_composited(&mut self, window: WindowId) -> Result<()> {
        self.window_mut(window)?.composited = true;
        Ok(())
    }

    fn embed(&mut self, wrapper: WindowId, client: WindowId) -> Result<()> {
        self.window_mut(wrapper)?.embedded = Some(client);
        // a vanished client only shows up as an asynchronous error on a real server
        if let Some(client) = self.windows.get_mut(&client) {
            client.parent = wrapper;
            client.mapped = true;
        }
        Ok(())
    }

    fn sync_mapped(&mut self, client: WindowId) -> Result<()> {
        if let Some(info) = self.xembed_info.get(&client).copied() {
            self.window_mut(client)?.mapped = info.is_mapped();
        }
        Ok(())
    }

    fn configure(&mut self, window: WindowId, rect: Rect) -> Result<()> {
        if self.fail_configure {
            return Err(Error::NoSuchWindow(window));
        }
        if let Some(window) = self.windows.get_mut(&window) {
            window.rect = rect;
        }
        Ok(())
    }

    fn allocation(&mut self, window: WindowId) -> Result<Rect> {
        Ok(self.window_mut(window)?.rect)
    }

    fn draw_window(&mut self, source: WindowId, target: WindowId, at: Rect) -> Result<()> {
        self.window_mut(source)?;
        self.draws.push((source, target, at));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
