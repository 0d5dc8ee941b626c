use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cellgc::config::{self, CONFIG_FILE_NAME, ConfigFile, ReportFormat};
use cellgc::demo;

// Wrapper type for clap ValueEnum support
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ReportFormatArg {
    #[default]
    Human,
    Json,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Human => ReportFormat::Human,
            ReportFormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(name = "cellgc")]
#[command(about = "A mark-and-sweep garbage collector simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, print and drop linked lists on a simulated heap
    Demo {
        /// Heap size in cells (even, at least 4); overrides the config file
        #[arg(long)]
        heap_size: Option<usize>,

        /// Config file (defaults to cellgc.toml in the current directory, if present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format (human, json)
        #[arg(long, value_enum, default_value = "human")]
        format: ReportFormatArg,

        /// Print GC statistics
        #[arg(long)]
        gc_stats: bool,
    },
    /// Write a default cellgc.toml
    Init {
        /// Target directory (defaults to the current directory)
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            heap_size,
            config,
            format,
            gc_stats,
        } => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            let mut file = match load_config(config.as_deref(), &cwd) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if let Some(size) = heap_size {
                file.collector.heap_size = size;
            }
            if file.demo.lists.is_empty() {
                file.demo.lists = demo::default_lists();
            }

            let output = demo::run_demo(&file.collector, &file.demo.lists)
                .and_then(|report| demo::render(&report, format.into(), gc_stats));
            match output {
                Ok(text) => print!("{}", text),
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        Commands::Init { dir } => {
            let dir = dir.unwrap_or_else(|| {
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
            });
            match config::init_config(&dir) {
                Ok(path) => println!("Created {}", path.display()),
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

/// An explicit path must exist; otherwise fall back to defaults when the
/// working directory has no config file.
fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<ConfigFile, config::ConfigError> {
    match explicit {
        Some(path) => ConfigFile::load_path(path),
        None if cwd.join(CONFIG_FILE_NAME).exists() => ConfigFile::load(cwd),
        None => Ok(ConfigFile::default()),
    }
}
