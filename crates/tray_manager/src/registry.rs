use crate::{
    backend::{TrayBackend, WindowId},
    layout::BoxLayout,
    Result,
};

/// A foreign icon window embedded into the tray.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EmbeddedIcon {
    /// The icon window, owned by the client that sent the dock request.
    pub client: WindowId,
    /// Our window the client is reparented into. Always a child of the container.
    pub wrapper: WindowId,
}

/// All embedded icons, in container child order.
#[derive(Debug)]
pub struct Registry {
    container: WindowId,
    layout: BoxLayout,
    icons: Vec<EmbeddedIcon>,
}

impl Registry {
    pub fn new(container: WindowId, layout: BoxLayout) -> Self {
        Registry { container, layout, icons: Vec::new() }
    }

    pub fn container(&self) -> WindowId {
        self.container
    }

    pub fn layout(&self) -> &BoxLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmbeddedIcon> {
        self.icons.iter()
    }

    pub fn get(&self, client: WindowId) -> Option<&EmbeddedIcon> {
        self.icons.iter().find(|icon| icon.client == client)
    }

    pub fn by_wrapper(&self, wrapper: WindowId) -> Option<&EmbeddedIcon> {
        self.icons.iter().find(|icon| icon.wrapper == wrapper)
    }

    /// Embed `client` into a new wrapper inside the container.
    ///
    /// Embedding an already embedded client returns the existing icon. An invalid or already
    /// destroyed client window is not detected here; the server reports it asynchronously and
    /// the icon is evicted once its destruction is observed.
    pub fn embed(&mut self, backend: &mut dyn TrayBackend, client: WindowId) -> Result<&EmbeddedIcon> {
        if let Some(index) = self.icons.iter().position(|icon| icon.client == client) {
            log::debug!("Ignoring duplicate dock request for {:#x}", client);
            return Ok(&self.icons[index]);
        }

        // the wrapper shares the container's visual so composited icons blend with the panel
        let format = backend.surface_format(self.container)?;
        let wrapper = backend.create_wrapper(self.container, &format)?;
        if let Err(err) = attach(backend, wrapper, client) {
            if let Err(destroy_err) = backend.destroy_window(wrapper) {
                log::warn!("Failed to destroy wrapper {:#x}: {}", wrapper, destroy_err);
            }
            return Err(err);
        }

        self.icons.push(EmbeddedIcon { client, wrapper });
        if let Err(err) = self.relayout(backend) {
            log::warn!("Failed to lay out tray icons after docking {:#x}: {}", client, err);
        }
        log::info!("Docked tray icon {:#x} (wrapper {:#x})", client, wrapper);
        Ok(&self.icons[self.icons.len() - 1])
    }

    /// Forget `client` and destroy its wrapper. The client window itself may already be gone.
    pub fn evict(&mut self, backend: &mut dyn TrayBackend, client: WindowId) -> Result<Option<EmbeddedIcon>> {
        let Some(index) = self.icons.iter().position(|icon| icon.client == client) else {
            return Ok(None);
        };
        let icon = self.icons.remove(index);
        if let Err(err) = backend.destroy_window(icon.wrapper) {
            log::warn!("Failed to destroy wrapper {:#x} of {:#x}: {}", icon.wrapper, client, err);
        }
        self.relayout(backend)?;
        log::info!("Removed tray icon {:#x}", client);
        Ok(Some(icon))
    }

    /// Place every wrapper at its layout slot and size each client to fill its wrapper.
    pub fn relayout(&self, backend: &mut dyn TrayBackend) -> Result<()> {
        for (index, icon) in self.icons.iter().enumerate() {
            let rect = self.layout.allocation(index);
            backend.configure(icon.wrapper, rect)?;
            backend.configure(icon.client, rect.at_origin())?;
        }
        Ok(())
    }
}

fn attach(backend: &mut dyn TrayBackend, wrapper: WindowId, client: WindowId) -> Result<()> {
    backend.show(wrapper)?;
    backend.set_composited(wrapper)?;
    backend.embed(wrapper, client)
}
