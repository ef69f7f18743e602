use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Check form templates, preview fill layouts and export filled PDFs.
#[derive(Debug, Parser)]
#[command(name = "sigform", about, version)]
pub struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Flatten a template and its values into a PDF
    Export {
        /// Template JSON
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        /// Signer values as a JSON object keyed by field id
        #[arg(long, value_name = "FILE")]
        values: Option<PathBuf>,

        /// Sender data for pre-defined fields
        #[arg(long, value_name = "FILE")]
        prefill: Option<PathBuf>,

        /// Predefined option catalog, keyed by field type
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Background PDF whose pages sit under the template pages
        #[arg(long, value_name = "FILE")]
        base: Option<PathBuf>,

        /// Export settings JSON (font size, padding, placeholder)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output PDF path
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        /// Export even when required fields are empty
        #[arg(long)]
        allow_incomplete: bool,
    },

    /// Print where every field lands for a viewport width
    Layout {
        /// Template JSON
        #[arg(long, value_name = "FILE")]
        template: PathBuf,

        /// Viewport width in CSS pixels
        #[arg(long, default_value_t = 1280.0)]
        viewport_width: f64,
    },

    /// Report fields that break the template's geometry rules
    Check {
        /// Template JSON
        #[arg(long, value_name = "FILE")]
        template: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_arguments() {
        let cli = Cli::try_parse_from([
            "sigform",
            "export",
            "--template",
            "t.json",
            "--values",
            "v.json",
            "-o",
            "out.pdf",
        ])
        .unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Export {
                template,
                values,
                base,
                out,
                allow_incomplete,
                ..
            } => {
                assert_eq!(template, PathBuf::from("t.json"));
                assert_eq!(values, Some(PathBuf::from("v.json")));
                assert_eq!(base, None);
                assert_eq!(out, PathBuf::from("out.pdf"));
                assert!(!allow_incomplete);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn layout_defaults_to_desktop_width() {
        let cli =
            Cli::try_parse_from(["sigform", "-v", "layout", "--template", "t.json"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Layout { viewport_width, .. } => assert_eq!(viewport_width, 1280.0),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_requires_output() {
        assert!(Cli::try_parse_from(["sigform", "export", "--template", "t.json"]).is_err());
    }
}
