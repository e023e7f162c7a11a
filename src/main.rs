use std::path::PathBuf;

use anyhow::Context;
use rmdraw::script::{load_script, replay};
use rmdraw::{init_logging, Config, BUILD_DATE, VERSION};

const USAGE: &str = "usage: rmdraw <script.json> [config.toml|config.json]";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args = std::env::args().skip(1);
    let Some(script_path) = args.next().map(PathBuf::from) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    if script_path.as_os_str() == "--version" {
        println!("rmdraw {VERSION} ({BUILD_DATE})");
        return Ok(());
    }

    let config = match args.next().map(PathBuf::from) {
        Some(path) => Config::load_from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_or_default(),
    };
    tracing::info!(version = VERSION, script = %script_path.display(), "Starting RMDraw");

    let script = load_script(&script_path)?;
    let report = replay(&script, config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
