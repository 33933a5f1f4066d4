// Command-line entry point for the binding patcher.

use binding_patcher::{patch_file, PatchOptions};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Generated binding file to patch
    source: PathBuf,

    /// Rule set (JSON) naming the classes to rewrite
    #[arg(short, long)]
    rules: PathBuf,

    /// Write the result here instead of overwriting SOURCE
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the patched code to stdout and write nothing
    #[arg(long)]
    dry_run: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("binding_patcher={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = PatchOptions {
        source: cli.source,
        rules: cli.rules,
        output: cli.out,
        dry_run: cli.dry_run,
    };

    match patch_file(&options) {
        Ok(report) => {
            if options.dry_run {
                print!("{}", report.code);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error[{}]: {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}
