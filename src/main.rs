use plover::app::PloverApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1000.0, 650.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Plover",
        options,
        Box::new(|cc| Ok(Box::new(PloverApp::new(cc)))),
    )
}
