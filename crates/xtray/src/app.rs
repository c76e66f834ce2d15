use anyhow::{Context, Result};
use tray_manager::{x11::X11Backend, Processed, TrayBackend, TrayContext, TrayEvent};

use crate::panel::Panel;

/// Owns everything the running tray needs and drives it from X events.
pub struct App {
    pub backend: X11Backend,
    pub tray: TrayContext,
    pub panel: Panel,
}

impl App {
    /// Show the panel and process events until the selection is lost or the connection fails.
    pub fn run(mut self) -> Result<()> {
        self.panel.fit(&mut self.backend, 0)?;
        self.panel.show(&self.backend)?;
        self.backend.flush()?;
        // another tray may have claimed the selection while the panel was being set up
        self.tray.reassert(&mut self.backend).context("Another tray took over during startup")?;

        loop {
            let event = self.backend.wait_for_event().context("Lost connection to the X server")?;
            if self.handle(&event)? {
                self.panel.repaint(&mut self.backend, &self.tray)?;
            }
            self.backend.flush()?;
        }
    }

    /// Returns whether the panel has to be repainted.
    fn handle(&mut self, event: &TrayEvent) -> Result<bool> {
        match *event {
            TrayEvent::Exposed { window, count } if window == self.panel.window() => Ok(count == 0),
            _ => match self.tray.process(&mut self.backend, event)? {
                Processed::Repaint => {
                    self.panel.fit(&mut self.backend, self.tray.registry().len())?;
                    Ok(true)
                }
                Processed::Handled | Processed::Ignored => Ok(false),
            },
        }
    }
}
