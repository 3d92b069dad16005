use app::CharboardApp;

mod app;

const APP_NAME: &str = "Charboard";
const DEFAULT_WS_URL: &str = "ws://localhost:3030/ws";

fn main() -> eframe::Result {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let url =
        std::env::var("CHARBOARD_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 560.0])
            .with_title(APP_NAME)
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |_cc| Ok(Box::new(CharboardApp::new(&url)))),
    )
}
