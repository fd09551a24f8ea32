use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use uxml_bindgen::{
    generate_batch, generate_script_stub, write_if_changed, GeneratorConfig, OwnerSource,
    ProjectScanner, WriteStatus,
};

#[derive(Parser, Debug)]
#[command(name = "uxml-bindgen", about = "Generate typed C# bindings for UXML documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate bindings for every owner class under a project root
    Generate {
        root: PathBuf,
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Marker interface owners implement
        #[arg(long)]
        marker: Option<String>,
        #[arg(long)]
        root_property: Option<String>,
        #[arg(long)]
        initialize_method: Option<String>,
        /// Generate without writing any files
        #[arg(long)]
        dry_run: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an empty partial class script next to a markup file
    Stub {
        markup_file: PathBuf,
        /// Script file name, defaults to `<Document>.cs`
        #[arg(long)]
        output: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_generate(
    root: &Path,
    config_path: Option<&Path>,
    marker: Option<String>,
    root_property: Option<String>,
    initialize_method: Option<String>,
    dry_run: bool,
    json: bool,
) -> Result<bool> {
    let mut config = match config_path {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(marker) = marker {
        config.marker_interface = marker;
    }
    if root_property.is_some() {
        config.root_property_name = root_property;
    }
    if initialize_method.is_some() {
        config.initialize_method_name = initialize_method;
    }

    let scanner = ProjectScanner::new(root, config.clone());
    if let Some((root_name, init_name)) = scanner.marker_naming() {
        config.merge_naming(root_name, init_name);
    }

    let owners = scanner
        .owners()
        .with_context(|| format!("failed to discover owners under {}", root.display()))?;
    let report = generate_batch(&owners, &config)?;

    if !dry_run {
        let written = report.write_outputs().context("failed to write generated sources")?;
        for (path, status) in &written {
            if *status == WriteStatus::Written {
                info!(path = %path.display(), "wrote bindings");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    } else {
        for summary in report.summary() {
            println!("{:?} {} ({})", summary.status, summary.owner, summary.source_path);
            for d in &summary.diagnostics {
                println!("  [{}] {}", d.code, d.message);
                for hint in &d.hints {
                    println!("    hint: {}", hint);
                }
            }
        }
    }

    Ok(!report.has_errors())
}

fn run_stub(markup_file: &Path, output: Option<String>) -> Result<()> {
    let document_name = markup_file
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{} has no file name", markup_file.display()))?;
    let output_dir = markup_file.parent().unwrap_or_else(|| Path::new(""));
    let output_name = output.unwrap_or_else(|| format!("{}.cs", document_name));

    let result = generate_script_stub(document_name, output_dir, &output_name)?;
    let Some(path) = result.output_path else {
        bail!("no output path for {}", document_name);
    };
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    write_if_changed(&path, &result.source_text)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "created script stub");
    Ok(())
}

fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            root,
            config,
            marker,
            root_property,
            initialize_method,
            dry_run,
            json,
        } => {
            let ok = run_generate(
                &root,
                config.as_deref(),
                marker,
                root_property,
                initialize_method,
                dry_run,
                json,
            )?;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Stub { markup_file, output } => {
            run_stub(&markup_file, output)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
