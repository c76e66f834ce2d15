use crate::{
    atoms::{self, TrayAtoms},
    backend::{ClientMessage, Timestamp, TrayBackend, WindowId},
    Error, Result,
};

/// `_NET_SYSTEM_TRAY_ORIENTATION_HORZ`
const ORIENTATION_HORIZONTAL: u32 = 0;

/// Ownership of the tray selection of one screen, held for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub screen: usize,
    pub name: String,
    pub atoms: TrayAtoms,
    /// Window owning the selection. All tray protocol messages are addressed to it.
    pub manager_window: WindowId,
    pub timestamp: Timestamp,
}

/// Become the system tray of `screen` and announce it to waiting clients.
///
/// Acquiring a selection this backend already holds returns the existing claim without announcing
/// it again. Fails with [`Error::SelectionOwned`] when another tray holds the selection. There is
/// no waiting or retrying: a tray is a singleton, so a competing owner is a misconfiguration.
/// A failed attempt leaves nothing behind: the manager window is destroyed again and no
/// announcement is sent.
pub fn acquire(backend: &mut dyn TrayBackend, screen: usize) -> Result<Selection> {
    let root = backend.root_window(screen)?;
    let name = atoms::selection_name(screen);
    let atoms = TrayAtoms::resolve(backend, screen)?;
    log::debug!("Acquiring {} (atom {})", name, atoms.selection);

    if let Some(owner) = backend.selection_owner(atoms.selection)? {
        return match backend.own_claim(atoms.selection) {
            Some((manager_window, timestamp)) if manager_window == owner => {
                log::debug!("Already own {} through manager window {:#x}", name, manager_window);
                Ok(Selection { screen, name, atoms, manager_window, timestamp })
            }
            _ => Err(Error::SelectionOwned { selection: name, owner }),
        };
    }

    let manager_window = backend.create_manager_window(screen)?;
    let timestamp = match claim(backend, manager_window, &atoms, &name) {
        Ok(timestamp) => timestamp,
        Err(err) => {
            if let Err(destroy_err) = backend.destroy_window(manager_window) {
                log::warn!("Failed to destroy manager window {:#x}: {}", manager_window, destroy_err);
            }
            return Err(err);
        }
    };

    let selection = Selection { screen, name, atoms, manager_window, timestamp };
    selection.publish_visual(backend)?;
    selection.announce(backend, root)?;
    backend.flush()?;

    log::info!("Became system tray for screen {} (manager window {:#x})", screen, manager_window);
    Ok(selection)
}

fn claim(backend: &mut dyn TrayBackend, window: WindowId, atoms: &TrayAtoms, name: &str) -> Result<Timestamp> {
    let timestamp = backend.server_time(window)?;
    backend.set_selection_owner(window, atoms.selection, timestamp)?;

    // someone may have claimed it between our check and our request
    match backend.selection_owner(atoms.selection)? {
        Some(owner) if owner == window => Ok(timestamp),
        owner => Err(Error::SelectionOwned { selection: name.to_string(), owner: owner.unwrap_or(0) }),
    }
}

impl Selection {
    /// Check that this process still owns the selection. Repeating the claim is only valid as
    /// long as no other process has taken it over.
    pub fn reassert(&self, backend: &mut dyn TrayBackend) -> Result<()> {
        match backend.selection_owner(self.atoms.selection)? {
            Some(owner) if owner == self.manager_window => Ok(()),
            Some(owner) => Err(Error::SelectionOwned { selection: self.name.clone(), owner }),
            None => Err(Error::SelectionLost { selection: self.name.clone() }),
        }
    }

    fn publish_visual(&self, backend: &mut dyn TrayBackend) -> Result<()> {
        let visual = backend.alpha_visual(self.screen)?;
        backend.set_property32(self.manager_window, self.atoms.visual, atoms::VISUALID, &[visual])?;
        backend.set_property32(self.manager_window, self.atoms.orientation, atoms::CARDINAL, &[ORIENTATION_HORIZONTAL])
    }

    fn announce(&self, backend: &mut dyn TrayBackend, root: WindowId) -> Result<()> {
        let message =
            ClientMessage::new(root, self.atoms.manager, [self.timestamp, self.atoms.selection, self.manager_window, 0, 0]);
        backend.send_client_message(root, &message)
    }
}
