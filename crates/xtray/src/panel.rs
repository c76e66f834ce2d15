use anyhow::{Context, Result};
use tray_manager::{compositor, geometry::Rect, layout::BoxLayout, x11::X11Backend, TrayBackend, TrayContext, WindowId};
use x11rb::{
    connection::Connection,
    protocol::xproto::{ColormapAlloc, ConnectionExt as _, CreateWindowAux, EventMask, PropMode, WindowClass},
    wrapper::ConnectionExt as _,
};

x11rb::atom_manager! {
    pub PanelAtoms: PanelAtomsCookie {
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_STATE,
        _NET_WM_STATE_STICKY,
        _NET_WM_STRUT,
        _NET_WM_STRUT_PARTIAL,
        CARDINAL,
        ATOM,
        WM_CLASS,
        STRING,
    }
}

/// The dock window icons are embedded into, anchored to the top right corner of its screen.
pub struct Panel {
    window: WindowId,
    atoms: PanelAtoms,
    root_width: u32,
    layout: BoxLayout,
    background: u32,
    /// Icon count the window is currently sized for.
    fitted: Option<usize>,
}

impl Panel {
    /// Create the (still unmapped) panel window, using a 32 bit visual where the screen has one.
    pub fn create(backend: &mut X11Backend, screen: usize, layout: BoxLayout, background: u32) -> Result<Self> {
        let visual = backend.alpha_visual(screen)?;
        let screen = backend.screen(screen)?.clone();
        let depth = screen
            .allowed_depths
            .iter()
            .find(|depth| depth.visuals.iter().any(|candidate| candidate.visual_id == visual))
            .map(|depth| depth.depth)
            .unwrap_or(screen.root_depth);
        log::debug!("Creating panel with visual {:#x} at depth {}", visual, depth);

        let conn = backend.connection();
        let colormap = conn.generate_id()?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, screen.root, visual)?.check()?;

        let window = conn.generate_id()?;
        let root_width = u32::from(screen.width_in_pixels);
        let (width, height) = layout.extent(0);
        let (x, y, width, height) = Rect::of(root_width.saturating_sub(width) as i32, 0, width, height).to_wire();
        let aux = CreateWindowAux::new()
            .background_pixel(0u32)
            .border_pixel(0u32)
            .colormap(colormap)
            .event_mask(EventMask::EXPOSURE | EventMask::STRUCTURE_NOTIFY);
        conn.create_window(
            depth,
            window,
            screen.root,
            x,
            y,
            width,
            height,
            0,
            WindowClass::INPUT_OUTPUT,
            visual,
            &aux,
        )?
        .check()
        .context("Failed to create panel window")?;

        let atoms = PanelAtoms::new(conn)?.reply()?;
        conn.change_property32(PropMode::REPLACE, window, atoms._NET_WM_WINDOW_TYPE, atoms.ATOM, &[atoms._NET_WM_WINDOW_TYPE_DOCK])?;
        conn.change_property32(PropMode::REPLACE, window, atoms._NET_WM_STATE, atoms.ATOM, &[atoms._NET_WM_STATE_STICKY])?;
        conn.change_property8(PropMode::REPLACE, window, atoms.WM_CLASS, atoms.STRING, b"xtray\0Xtray\0")?;

        Ok(Panel { window, atoms, root_width, layout, background, fitted: None })
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn show(&self, backend: &X11Backend) -> Result<()> {
        backend.connection().map_window(self.window)?;
        Ok(())
    }

    /// Resize the panel to hold `count` icons, keeping it in the top right corner.
    pub fn fit(&mut self, backend: &mut X11Backend, count: usize) -> Result<()> {
        if self.fitted == Some(count) {
            return Ok(());
        }
        let (width, height) = self.layout.extent(count);
        let x = self.root_width.saturating_sub(width);
        let rect = Rect::of(x as i32, 0, width, height);
        backend.configure(self.window, rect)?;
        self.reserve_space(backend, x, width, height)?;
        log::debug!("Panel resized to {} for {} icons", rect, count);
        self.fitted = Some(count);
        Ok(())
    }

    /// Ask the window manager to keep other windows clear of the panel's area.
    fn reserve_space(&self, backend: &X11Backend, x: u32, width: u32, height: u32) -> Result<()> {
        let end_x = x.saturating_add(width).saturating_sub(1);
        #[rustfmt::skip]
        let strut = [
            0, 0, height, 0,
            0, 0, 0, 0,
            x, end_x, 0, 0,
        ];
        let conn = backend.connection();
        conn.change_property32(PropMode::REPLACE, self.window, self.atoms._NET_WM_STRUT, self.atoms.CARDINAL, &strut[0..4])?;
        conn.change_property32(PropMode::REPLACE, self.window, self.atoms._NET_WM_STRUT_PARTIAL, self.atoms.CARDINAL, &strut)?;
        Ok(())
    }

    /// Clear the panel to its background, then draw every icon over it.
    pub fn repaint(&self, backend: &mut X11Backend, tray: &TrayContext) -> Result<()> {
        backend.fill(self.window, self.background)?;
        let drawn = compositor::paint(backend, tray.registry());
        log::trace!("Repainted panel with {} icons", drawn);
        backend.flush()?;
        Ok(())
    }
}
