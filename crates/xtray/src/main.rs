use anyhow::{Context, Result};
use tray_manager::{x11::X11Backend, TrayContext};

mod app;
mod opts;
mod panel;

fn main() {
    let opts: opts::Opt = opts::Opt::from_env();

    let log_level_filter = if opts.log_debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    if std::env::var("RUST_LOG").is_ok() {
        pretty_env_logger::init_timed();
    } else {
        pretty_env_logger::formatted_timed_builder()
            .filter(Some("xtray"), log_level_filter)
            .filter(Some("tray_manager"), log_level_filter)
            .init();
    }

    simple_signal::set_handler(&[simple_signal::Signal::Int, simple_signal::Signal::Term], |_| {
        log::info!("Shutting down system tray...");
        std::process::exit(0);
    });

    if let Err(err) = run(opts) {
        log::error!("{:?}", err);
        std::process::exit(1);
    }
}

fn run(opts: opts::Opt) -> Result<()> {
    let mut backend = X11Backend::new().context("Failed to connect to the X server")?;
    let screen = opts.screen.unwrap_or_else(|| backend.default_screen());
    log::debug!("Starting system tray on screen {} with {:?}", screen, opts.layout);

    let panel = panel::Panel::create(&mut backend, screen, opts.layout, opts.background)?;
    let tray = TrayContext::acquire(&mut backend, screen, panel.window(), opts.layout)
        .with_context(|| format!("Failed to become the system tray of screen {}", screen))?;

    app::App { backend, tray, panel }.run()
}
