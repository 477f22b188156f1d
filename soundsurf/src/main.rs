mod app;
mod audio;
mod viz;

use app::SoundSurfApp;
use eframe::NativeOptions;

fn main() -> eframe::Result<()> {
    let initial_file = std::env::args().nth(1).map(std::path::PathBuf::from);

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 520.0])
            .with_title("soundsurf"),
        ..Default::default()
    };
    eframe::run_native(
        "soundsurf",
        options,
        Box::new(move |cc| {
            let mut app = SoundSurfApp::new(cc);
            if let Some(path) = initial_file {
                if path.exists() {
                    app.play_file(path);
                }
            }
            Box::new(app)
        }),
    )
}
