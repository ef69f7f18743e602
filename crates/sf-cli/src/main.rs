//! `sigform`: check form templates, preview fill layouts and export filled
//! PDFs from the command line.

mod check_cmd;
mod cli;
mod export_cmd;
mod layout_cmd;
mod shared;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Export {
            template,
            values,
            prefill,
            catalog,
            base,
            config,
            out,
            allow_incomplete,
        } => {
            export_cmd::run(export_cmd::ExportArgs {
                template,
                values,
                prefill,
                catalog,
                base,
                config,
                out,
                allow_incomplete,
            })
            .await
        }
        Commands::Layout {
            ref template,
            viewport_width,
        } => layout_cmd::run(template, viewport_width),
        Commands::Check { ref template } => check_cmd::run(template),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}
