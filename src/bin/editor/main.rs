mod console;
mod editor;
mod inspector;
mod log_capture;
mod toolbar;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mechanics_demo::{App, SceneDescription, WindowArgs};

/// Scene editor for the mechanics demo.
#[derive(Parser, Debug)]
#[command(name = "editor", about = "Edit, simulate and save mechanics scenes", version)]
struct EditorArgs {
    /// Scene file to open; starts from the built-in arena if omitted.
    scene: Option<PathBuf>,

    #[command(flatten)]
    window: WindowArgs,
}

fn main() -> ExitCode {
    let logs = log_capture::install();
    let args = EditorArgs::parse();

    let mut config = match args.window.load_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    config.window.title = format!("{} Editor", config.window.title);

    let description = match &args.scene {
        Some(path) => match SceneDescription::load(path) {
            Ok(description) => description,
            Err(err) => {
                log::error!("Failed to open {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => SceneDescription::arena(),
    };

    let editor = editor::Editor::new(args.scene, description, config.clone(), logs);
    match App::run(editor, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
