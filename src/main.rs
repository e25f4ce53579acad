use eframe::egui;
use minipaint::app::MiniPaintApp;
use minipaint::{cli, i18n, logger};

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        // Scripts name documents through t!(), so the tables must be loaded
        i18n::init();
        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();
    i18n::init();
    minipaint::log_info!("starting MiniPaint {}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1040.0, 720.0])
            .with_title("MiniPaint"),
        ..Default::default()
    };

    eframe::run_native(
        "MiniPaint",
        options,
        Box::new(|cc| Box::new(MiniPaintApp::new(cc))),
    )
}
