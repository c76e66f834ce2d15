use crate::{backend::TrayBackend, xembed, Atom, Result};

pub const MANAGER: &str = "MANAGER";
pub const SYSTEM_TRAY_OPCODE: &str = "_NET_SYSTEM_TRAY_OPCODE";
pub const SYSTEM_TRAY_VISUAL: &str = "_NET_SYSTEM_TRAY_VISUAL";
pub const SYSTEM_TRAY_ORIENTATION: &str = "_NET_SYSTEM_TRAY_ORIENTATION";

// predefined atoms from the core protocol
pub const CARDINAL: Atom = 6;
pub const VISUALID: Atom = 4;

/// Name of the tray selection for the given zero-based screen number.
pub fn selection_name(screen: usize) -> String {
    format!("_NET_SYSTEM_TRAY_S{}", screen)
}

/// Every atom the tray protocol uses, resolved once for a display connection.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TrayAtoms {
    pub selection: Atom,
    pub opcode: Atom,
    pub visual: Atom,
    pub orientation: Atom,
    pub manager: Atom,
    pub xembed_info: Atom,
}

impl TrayAtoms {
    pub fn resolve(backend: &mut dyn TrayBackend, screen: usize) -> Result<Self> {
        Ok(TrayAtoms {
            selection: backend.intern_atom(&selection_name(screen))?,
            opcode: backend.intern_atom(SYSTEM_TRAY_OPCODE)?,
            visual: backend.intern_atom(SYSTEM_TRAY_VISUAL)?,
            orientation: backend.intern_atom(SYSTEM_TRAY_ORIENTATION)?,
            manager: backend.intern_atom(MANAGER)?,
            xembed_info: backend.intern_atom(xembed::XEMBED_INFO)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_backend::TestBackend;

    #[test]
    fn test_selection_name_appends_screen_number() {
        for screen in [0, 1, 9, 10, 123] {
            assert_eq!(selection_name(screen), format!("_NET_SYSTEM_TRAY_S{}", screen));
        }
        assert_eq!(selection_name(0), "_NET_SYSTEM_TRAY_S0");
    }

    #[test]
    fn test_resolve_interns_names_per_screen() {
        let mut backend = TestBackend::new();
        let on_first = TrayAtoms::resolve(&mut backend, 0).unwrap();
        let on_second = TrayAtoms::resolve(&mut backend, 1).unwrap();

        assert_eq!(on_first.selection, backend.atom("_NET_SYSTEM_TRAY_S0"));
        assert_eq!(on_second.selection, backend.atom("_NET_SYSTEM_TRAY_S1"));
        assert_ne!(on_first.selection, on_second.selection);
        assert_eq!(on_first.opcode, on_second.opcode);
        assert_eq!(on_first.manager, backend.atom("MANAGER"));
    }
}
