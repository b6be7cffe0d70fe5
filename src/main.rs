//! dombind command-line entry point.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dombind::bindgen::{CapiOptions, build_binding_manifest, manifest_to_json};
use dombind::generate::{self, GenerateConfig};
use dombind::metadata::MetadataDocument;
use dombind::registry::DataRegistry;

#[derive(Parser)]
#[command(name = "dombind")]
#[command(about = "Generate C API bindings from display-object metadata", version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write per-module headers, sources, the runtime header and the manifest
    Generate {
        /// Metadata document (JSON)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Directory for headers and the binding manifest
        #[arg(long)]
        header_dir: PathBuf,

        /// Directory for generated sources
        #[arg(long)]
        source_dir: PathBuf,

        /// Source file extension
        #[arg(long, value_enum, default_value_t = SourceExt::C)]
        source_ext: SourceExt,

        /// Manifest indent width; 0 writes compact JSON
        #[arg(long, default_value_t = 2)]
        manifest_indent: usize,

        /// Also write the single legacy header into this directory
        #[arg(long)]
        legacy_header: Option<PathBuf>,

        /// Exit non-zero when any function was skipped
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Print the binding manifest for a metadata document
    Manifest {
        /// Metadata document (JSON)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Indent width; 0 prints compact JSON
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceExt {
    C,
    Cpp,
}

impl SourceExt {
    fn as_str(self) -> &'static str {
        match self {
            SourceExt::C => "c",
            SourceExt::Cpp => "cpp",
        }
    }
}

/// Install the stderr subscriber. Returns false if one was already installed.
fn init_logging(verbose: bool) -> bool {
    use tracing_subscriber::{EnvFilter, fmt};

    let directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let subscriber = fmt::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "subscriber already installed");
            false
        }
    }
}

fn load(metadata: &Path) -> anyhow::Result<(MetadataDocument, DataRegistry)> {
    let document = MetadataDocument::load(metadata)
        .with_context(|| format!("loading {}", metadata.display()))?;
    let registry = DataRegistry::new();
    document.register_into(&registry)?;
    Ok((document, registry))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            metadata,
            header_dir,
            source_dir,
            source_ext,
            manifest_indent,
            legacy_header,
            deny_warnings,
        } => {
            let (document, registry) = load(&metadata)?;

            let mut config = GenerateConfig::new(header_dir, source_dir);
            config.legacy_dir = legacy_header;
            config.capi = CapiOptions {
                source_extension: source_ext.as_str().to_string(),
                manifest_indent,
                ..CapiOptions::default()
            };

            let generator = generate::capi_generator(&config, Some(&document))?;
            let summary = generate::run(&registry, generator, &config);

            for (name, err) in summary.failures() {
                eprintln!("error: {name}: {err}");
            }
            let skipped = summary.binding_errors().count();
            for err in summary.binding_errors() {
                eprintln!("warning: {err}");
            }

            if !summary.succeeded() || (deny_warnings && skipped > 0) {
                process::exit(1);
            }
        }

        Commands::Manifest { metadata, indent } => {
            let (document, registry) = load(&metadata)?;
            let generator = generate::capi_generator(
                &GenerateConfig::new(PathBuf::new(), PathBuf::new()),
                Some(&document),
            )?;

            let snapshot = registry.snapshot();
            let result = build_binding_manifest(snapshot.types(), generator.catalog());
            for err in &result.errors {
                eprintln!("warning: {err}");
            }
            println!("{}", manifest_to_json(&result.manifest, indent)?);
        }
    }

    Ok(())
}
