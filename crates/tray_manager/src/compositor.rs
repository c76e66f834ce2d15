use crate::{backend::TrayBackend, registry::Registry};

/// Draw every embedded icon onto the container, in child order.
///
/// Wrappers are redirected away from the container, so without this the icons show up as
/// blank rectangles. A child whose window has vanished is skipped; it never prevents the
/// remaining icons from being drawn. Returns the number of icons drawn.
pub fn paint(backend: &mut dyn TrayBackend, registry: &Registry) -> usize {
    let container = registry.container();
    let mut drawn = 0;
    for icon in registry.iter() {
        let result = backend.allocation(icon.wrapper).and_then(|at| backend.draw_window(icon.wrapper, container, at));
        match result {
            Ok(()) => drawn += 1,
            Err(err) => log::debug!("Skipping tray icon {:#x} while painting: {}", icon.client, err),
        }
    }
    log::debug!("Painted {}/{} tray icons", drawn, registry.len());
    drawn
}
