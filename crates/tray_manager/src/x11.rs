use std::collections::{HashMap, VecDeque};

use x11rb::{
    connection::{Connection, RequestConnection},
    errors::ReplyError,
    protocol::{
        composite::{self, ConnectionExt as _},
        damage::{self, ConnectionExt as _},
        render::{self, ConnectionExt as _},
        xproto::{
            AtomEnum, ChangeWindowAttributesAux, ClientMessageEvent, ConfigureWindowAux, ConnectionExt as _, CreateWindowAux,
            EventMask, PropMode, Rectangle, Screen, SetMode, VisualClass, WindowClass, CLIENT_MESSAGE_EVENT,
        },
        ErrorKind, Event,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT, CURRENT_TIME, NONE,
};

use crate::{
    backend::{Atom, ClientMessage, SurfaceFormat, Timestamp, TrayBackend, TrayEvent, VisualId, WindowId},
    geometry::Rect,
    xembed, Error, Result,
};

x11rb::atom_manager! {
    pub BackendAtoms: BackendAtomsCookie {
        _XEMBED,
        _XEMBED_INFO,
        _XTRAY_TIMESTAMP_PROP,
    }
}

#[derive(Debug, Clone, Copy)]
struct Wrapper {
    format: render::Pictformat,
    damage: Option<damage::Damage>,
}

/// [`TrayBackend`] talking to an X server through x11rb.
///
/// Requires the Composite, Render and Damage extensions.
pub struct X11Backend {
    conn: RustConnection,
    default_screen: usize,
    atoms: BackendAtoms,
    pict_formats: render::QueryPictFormatsReply,
    wrappers: HashMap<WindowId, Wrapper>,
    pictures: HashMap<WindowId, render::Picture>,
    claims: HashMap<Atom, (WindowId, Timestamp)>,
    /// Events read while waiting for a specific one, delivered before anything new.
    pending: VecDeque<Event>,
}

impl X11Backend {
    pub fn new() -> Result<Self> {
        let (conn, default_screen) = RustConnection::connect(None)?;
        for extension in [composite::X11_EXTENSION_NAME, render::X11_EXTENSION_NAME, damage::X11_EXTENSION_NAME] {
            if conn.extension_information(extension)?.is_none() {
                return Err(Error::MissingExtension(extension));
            }
        }
        conn.composite_query_version(0, 4)?.reply()?;
        conn.render_query_version(0, 11)?.reply()?;
        conn.damage_query_version(1, 1)?.reply()?;

        let pict_formats = conn.render_query_pict_formats()?.reply()?;
        let atoms = BackendAtoms::new(&conn)?.reply()?;
        Ok(X11Backend {
            conn,
            default_screen,
            atoms,
            pict_formats,
            wrappers: HashMap::new(),
            pictures: HashMap::new(),
            claims: HashMap::new(),
            pending: VecDeque::new(),
        })
    }

    pub fn connection(&self) -> &RustConnection {
        &self.conn
    }

    pub fn default_screen(&self) -> usize {
        self.default_screen
    }

    pub fn screen(&self, screen: usize) -> Result<&Screen> {
        self.conn.setup().roots.get(screen).ok_or(Error::NoSuchScreen(screen))
    }

    /// Block until the next event arrives.
    pub fn wait_for_event(&mut self) -> Result<TrayEvent> {
        let event = match self.pending.pop_front() {
            Some(event) => event,
            None => self.conn.wait_for_event()?,
        };
        self.translate(event)
    }

    /// Fill all of `window` with a non-premultiplied `0xRRGGBBAA` color.
    pub fn fill(&mut self, window: WindowId, rgba: u32) -> Result<()> {
        let picture = self.picture_for(window)?;
        let geometry = self.conn.get_geometry(window)?.reply()?;
        let area = Rectangle { x: 0, y: 0, width: geometry.width, height: geometry.height };
        self.conn.render_fill_rectangles(render::PictOp::SRC, picture, premultiplied(rgba), &[area])?;
        Ok(())
    }

    fn translate(&mut self, event: Event) -> Result<TrayEvent> {
        Ok(match event {
            Event::ClientMessage(e) => TrayEvent::ClientMessage(ClientMessage {
                window: e.window,
                type_: e.type_,
                format: e.format,
                data: e.data.as_data32(),
            }),
            Event::DestroyNotify(e) => TrayEvent::Destroyed { window: e.window },
            Event::ReparentNotify(e) => TrayEvent::Reparented { window: e.window, parent: e.parent },
            Event::Expose(e) => TrayEvent::Exposed { window: e.window, count: e.count },
            Event::DamageNotify(e) => {
                self.conn.damage_subtract(e.damage, NONE, NONE)?;
                TrayEvent::Damaged { drawable: e.drawable }
            }
            Event::PropertyNotify(e) => TrayEvent::PropertyChanged { window: e.window, atom: e.atom },
            Event::SelectionClear(e) => TrayEvent::SelectionCleared { owner: e.owner, selection: e.selection },
            Event::Error(e) => {
                TrayEvent::Error { kind: format!("{:?}", e.error_kind), bad_value: e.bad_value, major_opcode: e.major_opcode }
            }
            _ => TrayEvent::Other,
        })
    }

    fn picture_format(&self, visual: VisualId) -> Result<render::Pictformat> {
        self.pict_formats
            .screens
            .iter()
            .flat_map(|screen| screen.depths.iter())
            .flat_map(|depth| depth.visuals.iter())
            .find(|candidate| candidate.visual == visual)
            .map(|candidate| candidate.format)
            .ok_or(Error::NoPictureFormat(visual))
    }

    fn picture_for(&mut self, window: WindowId) -> Result<render::Picture> {
        if let Some(picture) = self.pictures.get(&window) {
            return Ok(*picture);
        }
        let visual = self.conn.get_window_attributes(window)?.reply()?.visual;
        let format = self.picture_format(visual)?;
        let picture = self.conn.generate_id()?;
        self.conn.render_create_picture(picture, window, format, &render::CreatePictureAux::new())?.check()?;
        self.pictures.insert(window, picture);
        Ok(picture)
    }

    fn xembed_info(&self, client: WindowId) -> Option<xembed::Info> {
        let reply = self
            .conn
            .get_property(false, client, self.atoms._XEMBED_INFO, self.atoms._XEMBED_INFO, 0, 2)
            .ok()?
            .reply();
        match reply {
            Ok(reply) => xembed::Info::parse(&reply.value32()?.collect::<Vec<_>>()),
            Err(err) => {
                log::debug!("Could not read _XEMBED_INFO of {:#x}: {}", client, err);
                None
            }
        }
    }

    fn send_xembed(&self, client: WindowId, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: client,
            type_: self.atoms._XEMBED,
            data: data.into(),
        };
        self.conn.send_event(false, client, EventMask::NO_EVENT, event)?;
        Ok(())
    }
}

impl TrayBackend for X11Backend {
    fn root_window(&self, screen: usize) -> Result<WindowId> {
        Ok(self.screen(screen)?.root)
    }

    fn intern_atom(&mut self, name: &str) -> Result<Atom> {
        Ok(self.conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
    }

    fn alpha_visual(&self, screen: usize) -> Result<VisualId> {
        let screen = self.screen(screen)?;
        let visual = screen
            .allowed_depths
            .iter()
            .filter(|depth| depth.depth == 32)
            .flat_map(|depth| depth.visuals.iter())
            .find(|visual| visual.class == VisualClass::TRUE_COLOR)
            .map(|visual| visual.visual_id);
        Ok(visual.unwrap_or_else(|| {
            log::warn!("Screen has no 32-bit visual, tray icons won't be transparent");
            screen.root_visual
        }))
    }

    fn create_manager_window(&mut self, screen: usize) -> Result<WindowId> {
        let root = self.root_window(screen)?;
        let window = self.conn.generate_id()?;
        let aux =
            CreateWindowAux::new().override_redirect(1u32).event_mask(EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY);
        self.conn
            .create_window(COPY_DEPTH_FROM_PARENT, window, root, -1, -1, 1, 1, 0, WindowClass::INPUT_ONLY, COPY_FROM_PARENT, &aux)?
            .check()?;
        Ok(window)
    }

    fn destroy_window(&mut self, window: WindowId) -> Result<()> {
        if let Some(Wrapper { damage: Some(damage), .. }) = self.wrappers.remove(&window) {
            self.conn.damage_destroy(damage)?;
        }
        if let Some(picture) = self.pictures.remove(&window) {
            self.conn.render_free_picture(picture)?;
        }
        self.claims.retain(|_, (owner, _)| *owner != window);
        self.conn.destroy_window(window)?;
        Ok(())
    }

    fn server_time(&mut self, window: WindowId) -> Result<Timestamp> {
        // appending nothing still generates a PropertyNotify, which carries the server time
        let property = self.atoms._XTRAY_TIMESTAMP_PROP;
        self.conn.change_property8(PropMode::APPEND, window, property, AtomEnum::STRING, &[])?;
        self.conn.flush()?;
        loop {
            match self.conn.wait_for_event()? {
                Event::PropertyNotify(e) if e.window == window && e.atom == property => return Ok(e.time),
                event => self.pending.push_back(event),
            }
        }
    }

    fn selection_owner(&mut self, selection: Atom) -> Result<Option<WindowId>> {
        let owner = self.conn.get_selection_owner(selection)?.reply()?.owner;
        Ok((owner != NONE).then_some(owner))
    }

    fn set_selection_owner(&mut self, owner: WindowId, selection: Atom, time: Timestamp) -> Result<()> {
        self.conn.set_selection_owner(owner, selection, time)?.check()?;
        self.claims.insert(selection, (owner, time));
        Ok(())
    }

    fn own_claim(&self, selection: Atom) -> Option<(WindowId, Timestamp)> {
        self.claims.get(&selection).copied()
    }

    fn set_property32(&mut self, window: WindowId, property: Atom, type_: Atom, values: &[u32]) -> Result<()> {
        self.conn.change_property32(PropMode::REPLACE, window, property, type_, values)?.check()?;
        Ok(())
    }

    fn send_client_message(&mut self, destination: WindowId, message: &ClientMessage) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: message.format,
            sequence: 0,
            window: message.window,
            type_: message.type_,
            data: message.data.into(),
        };
        self.conn.send_event(false, destination, EventMask::STRUCTURE_NOTIFY, event)?.check()?;
        Ok(())
    }

    fn surface_format(&mut self, window: WindowId) -> Result<SurfaceFormat> {
        let attributes = self.conn.get_window_attributes(window)?.reply()?;
        let geometry = self.conn.get_geometry(window)?.reply()?;
        Ok(SurfaceFormat { depth: geometry.depth, visual: attributes.visual, colormap: attributes.colormap })
    }

    fn create_wrapper(&mut self, container: WindowId, format: &SurfaceFormat) -> Result<WindowId> {
        let pict_format = self.picture_format(format.visual)?;
        let wrapper = self.conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .background_pixel(0u32)
            .border_pixel(0u32)
            .colormap(format.colormap)
            .event_mask(EventMask::STRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_NOTIFY);
        self.conn
            .create_window(format.depth, wrapper, container, 0, 0, 1, 1, 0, WindowClass::INPUT_OUTPUT, format.visual, &aux)?
            .check()?;
        self.wrappers.insert(wrapper, Wrapper { format: pict_format, damage: None });
        Ok(wrapper)
    }

    fn show(&mut self, window: WindowId) -> Result<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn set_composited(&mut self, window: WindowId) -> Result<()> {
        self.conn.composite_redirect_window(window, composite::Redirect::MANUAL)?;
        let damage = self.conn.generate_id()?;
        self.conn.damage_create(damage, window, damage::ReportLevel::NON_EMPTY)?;
        if let Some(wrapper) = self.wrappers.get_mut(&window) {
            wrapper.damage = Some(damage);
        }
        Ok(())
    }

    fn embed(&mut self, wrapper: WindowId, client: WindowId) -> Result<()> {
        // none of these are checked: the client may be gone already, which shows up as an error event
        let aux = ChangeWindowAttributesAux::new().event_mask(EventMask::STRUCTURE_NOTIFY | EventMask::PROPERTY_CHANGE);
        self.conn.change_window_attributes(client, &aux)?;
        self.conn.change_save_set(SetMode::INSERT, client)?;
        self.conn.reparent_window(client, wrapper, 0, 0)?;

        let info = self.xembed_info(client);
        let version = info.map_or(xembed::PROTOCOL_VERSION, |info| info.negotiated_version());
        self.send_xembed(client, xembed::message_data(CURRENT_TIME, xembed::Message::EmbeddedNotify, 0, wrapper, version))?;

        if info.map_or(true, |info| info.is_mapped()) {
            self.conn.map_window(client)?;
        }
        Ok(())
    }

    fn sync_mapped(&mut self, client: WindowId) -> Result<()> {
        let Some(info) = self.xembed_info(client) else {
            return Ok(());
        };
        if info.is_mapped() {
            self.conn.map_window(client)?;
        } else {
            self.conn.unmap_window(client)?;
        }
        Ok(())
    }

    fn configure(&mut self, window: WindowId, rect: Rect) -> Result<()> {
        let (x, y, width, height) = rect.to_wire();
        let aux = ConfigureWindowAux::new().x(i32::from(x)).y(i32::from(y)).width(u32::from(width)).height(u32::from(height));
        self.conn.configure_window(window, &aux)?;
        Ok(())
    }

    fn allocation(&mut self, window: WindowId) -> Result<Rect> {
        match self.conn.get_geometry(window)?.reply() {
            Ok(geometry) => {
                Ok(Rect::of(geometry.x.into(), geometry.y.into(), geometry.width.into(), geometry.height.into()))
            }
            Err(ReplyError::X11Error(e)) if matches!(e.error_kind, ErrorKind::Drawable | ErrorKind::Window) => {
                Err(Error::NoSuchWindow(window))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn draw_window(&mut self, source: WindowId, target: WindowId, at: Rect) -> Result<()> {
        let format = self.wrappers.get(&source).map(|wrapper| wrapper.format).ok_or(Error::NoSuchWindow(source))?;
        let target_picture = self.picture_for(target)?;
        let (x, y, width, height) = at.to_wire();

        let pixmap = self.conn.generate_id()?;
        self.conn.composite_name_window_pixmap(source, pixmap)?;
        let picture = self.conn.generate_id()?;
        self.conn.render_create_picture(picture, pixmap, format, &render::CreatePictureAux::new())?;
        self.conn.render_composite(
            render::PictOp::OVER,
            picture,
            NONE,
            target_picture,
            0,
            0,
            0,
            0,
            x,
            y,
            width,
            height,
        )?;
        self.conn.render_free_picture(picture)?;
        self.conn.free_pixmap(pixmap)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}

/// Render colors are 16 bits per channel with premultiplied alpha.
fn premultiplied(rgba: u32) -> render::Color {
    let [red, green, blue, alpha] = rgba.to_be_bytes();
    let scale = |channel: u8| (channel as u32 * alpha as u32 / 255) as u16 * 257;
    render::Color { red: scale(red), green: scale(green), blue: scale(blue), alpha: alpha as u16 * 257 }
}
