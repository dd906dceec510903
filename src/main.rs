use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, io};

use clap::Parser;

use babelog::config::{read_config, Config};
use babelog::engine::build_engine;
use babelog::logger::configure_logger;
use babelog::plugin::PluginRegistry;
use babelog::server::server_run;

const CFG_FILE_NAME: &str = "babelog.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the configuration file. If empty, the exe dir, the current dir
    /// and the user config dir are searched in that order
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn find_config_path() -> Option<PathBuf> {
    let exe_path = env::current_exe().unwrap();
    let exe_dir = exe_path.parent().unwrap();
    let cur_dir = env::current_dir().unwrap();

    if exe_dir.join(CFG_FILE_NAME).exists() {
        return Some(exe_dir.join(CFG_FILE_NAME));
    }

    if cur_dir.join(CFG_FILE_NAME).exists() {
        return Some(cur_dir.join(CFG_FILE_NAME));
    }

    let cfg_dir = dirs::config_dir().expect("Could not find user config dir");
    if cfg_dir.join(CFG_FILE_NAME).exists() {
        return Some(cfg_dir.join(CFG_FILE_NAME));
    }

    None
}

fn open_config(cfg_path: Option<PathBuf>) -> io::Result<Config> {
    let config_path = match cfg_path.or_else(find_config_path) {
        Some(path) => path,
        None => return Err(io::Error::new(ErrorKind::NotFound, "Could not find babelog configuration")),
    };
    println!("Reading config from {}", config_path.to_str().unwrap());
    read_config(&config_path)
}

#[ntex::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = open_config(args.config)?;

    if let Err(e) = configure_logger(&config) {
        return Err(io::Error::new(ErrorKind::Other, format!("Error configuring logger: {}", e)));
    }

    // The host process registers its plugins here before the engine builds
    let registry = PluginRegistry::new();

    let engine = match build_engine(config, registry) {
        Ok(engine) => engine,
        Err(e) => return Err(io::Error::new(ErrorKind::InvalidData, format!("Error building content engine: {}", e))),
    };

    println!("Listening on {}:{}", engine.config.server.address, engine.config.server.port);
    server_run(engine).await
}
