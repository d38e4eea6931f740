use clap::{Parser, Subcommand};
use site_manifest::config::{self, INCLUDED_ROOTS_ENV};
use site_manifest::manifest;
use site_manifest::output;
use site_manifest::tree::TreeBuilder;
use site_manifest::vpath::VirtualPath;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "site-manifest")]
#[command(about = "Build a JSON manifest of a site's files from overlaid directory trees")]
#[command(long_about = "\
Build a JSON manifest of a site's files from overlaid directory trees

The virtual root mirrors one directory; overlay rules graft other
directories into it. The manifest lists every visible file with its
virtual path, physical source and download URL.

Layout (defaults, relative to --root):

  repo/
  ├── api/
  │   ├── manifest.toml            # Config (optional)
  │   └── manifest.json            # Output
  ├── .manifestignore              # Extra exclude globs, one per line (optional)
  ├── 1_architecture/              # Numbered top-level dirs are auto-detected
  └── sd_engine/                   # Overlay source, mapped by a rule

Environment:
  INCLUDED_ROOTS   Comma-separated top-level names, replaces include_top
  RUST_LOG         Log filter for diagnostics on stderr (default: warn)

Run 'site-manifest gen-config' to print a documented manifest.toml.")]
#[command(version)]
struct Cli {
    /// Process root; config paths and source paths are relative to it
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file [default: <root>/api/manifest.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ignore file with extra exclude globs [default: <root>/.manifestignore]
    #[arg(long, global = true)]
    ignore_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the manifest and write it to disk
    Generate {
        /// Output file [default: <root>/api/manifest.json]
        #[arg(long)]
        output: Option<PathBuf>,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Build the manifest and print the tree without writing anything
    Check,
    /// Show which source backs a virtual path
    Resolve {
        /// Virtual path, e.g. "1_architecture/1-2 UID-E (Minilab Explore)"
        #[arg(default_value = "")]
        path: String,
    },
    /// Print a stock manifest.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate { output: out, pretty } => {
            let config = load_config(&cli.root, cli.config, cli.ignore_file);
            let out_path = out.unwrap_or_else(|| cli.root.join("api").join("manifest.json"));
            let manifest = manifest::build_manifest(&cli.root, &config)?;
            manifest::write_manifest(&manifest, &out_path, pretty)?;
            output::print_generate_output(&manifest, &out_path);
        }
        Command::Check => {
            let config = load_config(&cli.root, cli.config, cli.ignore_file);
            println!("==> Checking {}", cli.root.display());
            let tree = manifest::build_tree(&cli.root, &config)?;
            output::print_tree(&tree);
        }
        Command::Resolve { path } => {
            let config = load_config(&cli.root, cli.config, cli.ignore_file);
            let builder = TreeBuilder::new(&cli.root, &config);
            let path = VirtualPath::parse(&path);
            let (physical, resolved) = builder.physical_path(&path);
            let synthetic = builder.rules().synthetic_children(&path);
            output::print_resolution(&path, &resolved, &physical, &synthetic);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so stdout stays clean for command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Fold config file, environment and ignore file into one config value.
fn load_config(
    root: &Path,
    config_file: Option<PathBuf>,
    ignore_file: Option<PathBuf>,
) -> config::ManifestConfig {
    let config_file = config_file.unwrap_or_else(|| root.join("api").join("manifest.toml"));
    let ignore_file = ignore_file.unwrap_or_else(|| root.join(".manifestignore"));
    let included_roots = std::env::var(INCLUDED_ROOTS_ENV).ok();
    config::build_config(&config_file, included_roots.as_deref(), &ignore_file)
}
