mod app;

use clap::Parser;
use eframe::egui;

use dotstory::config::StoryConfig;
use dotstory::net::fetch::DataSource;

use crate::app::StoryApp;

/// Scroll-driven dot chart of the Nobel laureates dataset.
#[derive(Parser, Debug)]
#[command(name = "dotstory", version, about)]
struct Cli {
    /// CSV file path or http(s) URL
    #[arg(short, long, default_value = "assets/nobel-laureates.csv")]
    data: String,

    /// Canvas width
    #[arg(long, default_value_t = 700.0)]
    width: f64,

    /// Canvas height
    #[arg(long, default_value_t = 700.0)]
    height: f64,

    /// Gap between packed circles
    #[arg(long, default_value_t = 10.0)]
    padding: f64,

    /// Dot radius
    #[arg(long, default_value_t = 6.0)]
    radius: f64,

    /// Transition duration in milliseconds
    #[arg(long, default_value_t = 750)]
    transition_ms: u64,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let config = StoryConfig::default()
        .with_canvas(cli.width, cli.height)
        .with_padding(cli.padding)
        .with_radius(cli.radius)
        .with_transition_ms(cli.transition_ms);
    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        eprintln!("dotstory: {}", e);
        std::process::exit(2);
    }
    let source = DataSource::parse(&cli.data);
    log::info!("Starting with dataset {}", source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1120.0, 780.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nobel laureates",
        options,
        Box::new(move |cc| Ok(Box::new(StoryApp::new(source, config, &cc.egui_ctx)))),
    )
}
