use crate::{
    backend::{TrayBackend, TrayEvent, WindowId},
    dispatch::{Dispatcher, Filter, TrayRequest},
    layout::BoxLayout,
    registry::Registry,
    selection::{self, Selection},
    Error, Result,
};

/// What the caller should do after [`TrayContext::process`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Processed {
    /// Not meant for the tray.
    Ignored,
    /// Consumed, nothing visible changed.
    Handled,
    /// Icons were added, removed or changed; the container needs to be repainted.
    Repaint,
}

/// State of a running system tray: the owned selection, the message dispatcher and the
/// embedded icons. Created once at startup and kept until the process exits.
#[derive(Debug)]
pub struct TrayContext {
    selection: Selection,
    dispatcher: Dispatcher,
    registry: Registry,
}

impl TrayContext {
    /// Take over the tray selection of `screen`, embedding icons into `container`.
    pub fn acquire(backend: &mut dyn TrayBackend, screen: usize, container: WindowId, layout: BoxLayout) -> Result<Self> {
        let selection = selection::acquire(backend, screen)?;
        let dispatcher = Dispatcher::new(&selection.atoms);
        Ok(TrayContext { selection, dispatcher, registry: Registry::new(container, layout) })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn manager_window(&self) -> WindowId {
        self.selection.manager_window
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// See [`Selection::reassert`].
    pub fn reassert(&self, backend: &mut dyn TrayBackend) -> Result<()> {
        self.selection.reassert(backend)
    }

    /// Handle a single event. Events must be passed in the order they were received.
    ///
    /// Only the loss of the selection is reported as an error; problems with individual icons
    /// are logged and handled here.
    pub fn process(&mut self, backend: &mut dyn TrayBackend, event: &TrayEvent) -> Result<Processed> {
        if let Filter::Remove(request) = self.dispatcher.filter(event) {
            return Ok(self.handle_request(backend, request));
        }

        match *event {
            TrayEvent::Destroyed { window } => Ok(self.forget(backend, window)),
            TrayEvent::Reparented { window, parent } => match self.registry.get(window) {
                Some(icon) if icon.wrapper != parent => {
                    log::debug!("Tray icon {:#x} left its wrapper for {:#x}", window, parent);
                    Ok(self.forget(backend, window))
                }
                _ => Ok(Processed::Ignored),
            },
            TrayEvent::Damaged { drawable } if self.registry.by_wrapper(drawable).is_some() => Ok(Processed::Repaint),
            TrayEvent::SelectionCleared { owner, selection }
                if owner == self.selection.manager_window && selection == self.selection.atoms.selection =>
            {
                Err(Error::SelectionLost { selection: self.selection.name.clone() })
            }
            TrayEvent::PropertyChanged { window, atom }
                if atom == self.selection.atoms.xembed_info && self.registry.get(window).is_some() =>
            {
                match backend.sync_mapped(window) {
                    Ok(()) => Ok(Processed::Repaint),
                    Err(err) => {
                        log::warn!("Failed to follow mapped state of tray icon {:#x}: {}", window, err);
                        Ok(Processed::Handled)
                    }
                }
            }
            // a dock request for a window that is already gone never produces a DestroyNotify
            TrayEvent::Error { ref kind, bad_value, major_opcode }
                if matches!(kind.as_str(), "Window" | "Drawable") && self.registry.get(bad_value).is_some() =>
            {
                log::debug!("Tray icon {:#x} is no longer a valid window (request {})", bad_value, major_opcode);
                Ok(self.forget(backend, bad_value))
            }
            TrayEvent::Error { ref kind, bad_value, major_opcode } => {
                log::debug!("Ignoring X error {} for resource {:#x} (request {})", kind, bad_value, major_opcode);
                Ok(Processed::Handled)
            }
            _ => Ok(Processed::Ignored),
        }
    }

    fn handle_request(&mut self, backend: &mut dyn TrayBackend, request: TrayRequest) -> Processed {
        match request {
            TrayRequest::Dock { window, .. } => {
                let already_docked = self.registry.get(window).is_some();
                match self.registry.embed(backend, window) {
                    Ok(_) if already_docked => Processed::Handled,
                    Ok(_) => Processed::Repaint,
                    Err(err) => {
                        log::warn!("Failed to dock tray icon {:#x}: {}", window, err);
                        Processed::Handled
                    }
                }
            }
            TrayRequest::BeginMessage { window, id, .. } => {
                log::debug!("Ignoring balloon message {} from {:#x}", id, window);
                Processed::Handled
            }
            TrayRequest::CancelMessage { window, id } => {
                log::debug!("Ignoring cancellation of balloon message {} from {:#x}", id, window);
                Processed::Handled
            }
            TrayRequest::Unknown { opcode } => {
                log::debug!("Ignoring unknown tray opcode {}", opcode);
                Processed::Handled
            }
            TrayRequest::Malformed { format } => {
                log::warn!("Ignoring tray message with format {}", format);
                Processed::Handled
            }
        }
    }

    fn forget(&mut self, backend: &mut dyn TrayBackend, client: WindowId) -> Processed {
        match self.registry.evict(backend, client) {
            Ok(Some(_)) => Processed::Repaint,
            Ok(None) => Processed::Ignored,
            Err(err) => {
                log::warn!("Failed to re-layout tray after removing {:#x}: {}", client, err);
                Processed::Repaint
            }
        }
    }
}
