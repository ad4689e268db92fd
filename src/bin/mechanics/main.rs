mod demo;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use mechanics_demo::{App, AppError, DemoArgs, SceneDescription};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = DemoArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &DemoArgs) -> Result<(), AppError> {
    let config = args.window.load_config()?;

    let description = match &args.scene {
        Some(path) => SceneDescription::load(path)?,
        None => SceneDescription::arena(),
    };
    if let Some(path) = &args.write_scene {
        description.save(path)?;
        log::info!("Wrote scene '{}' to {}", description.name, path.display());
    }

    if let Some(frames) = args.headless {
        return Ok(demo::run_headless(&description, &config, frames)?);
    }

    log::info!("Starting Mechanics with scene '{}'", description.name);
    let demo = demo::Demo::new(description, config.clone(), args.debug_physics);
    App::run(demo, &config)
}
