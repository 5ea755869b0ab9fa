// ============================================================================
// hitclip-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: hitclip command-line application
//
// Parses the command line, dispatches to the selected command and turns an
// error into a non-zero exit code.

use clap::Parser;
use hitclip_cli::{Cli, Commands, run_clip};
use owo_colors::OwoColorize;

use std::process;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Clip(args) => run_clip(args, cli.verbose),
    };

    if let Err(e) = result {
        if hitclip_cli::terminal::should_use_color() {
            eprintln!("{} {e}", "Error:".red().bold());
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}
