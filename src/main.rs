use std::process::ExitCode;

use anyhow::Result;
use log::{error, info};

use region_shot::app::AppError;
use region_shot::config::Config;

fn main() -> ExitCode {
    env_logger::init();
    let config = Config::from_env();
    info!("starting region_shot, output {}", config.output.display());

    match launch(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            error!("{e:#}");
            let code = e
                .downcast_ref::<AppError>()
                .map(AppError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

#[cfg(target_os = "windows")]
fn launch(config: &Config) -> Result<()> {
    let mut platform = region_shot::platform::win32::GdiPlatform::new(config);
    let mut out = std::io::stdout().lock();
    region_shot::app::run(&mut platform, config, &mut out)?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn launch(_config: &Config) -> Result<()> {
    Err(AppError::Unsupported(std::env::consts::OS).into())
}
