use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use kin::layout::DEFAULT_MAX_DEPTH;
use kin::{LayoutOptions, OutputFormat, RenderOptions, Spacing};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kin", about = "Lay out relationship graphs (family trees) and render them")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Maximum output width in columns (ascii only)
    #[arg(long, short = 'w')]
    width: Option<usize>,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,

    /// Person to start from (defaults to the first person declared)
    #[arg(long, short = 'r')]
    root: Option<String>,

    /// How children are counted when spreading them horizontally
    #[arg(long, value_enum, default_value_t = Spacing::Unvisited)]
    spacing: Spacing,

    /// Deepest level allowed below the root
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Write the output to this file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Log filter such as `debug` or `kin=trace` (defaults to RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let input = match cli.file {
        Some(path) => std::fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("ERROR: failed to read {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("ERROR: failed to read stdin: {e}");
                std::process::exit(1);
            });
            buf
        }
    };

    let options = RenderOptions {
        format: cli.format,
        max_width: cli.width,
        layout: LayoutOptions {
            root: cli.root,
            spacing: cli.spacing,
            max_depth: cli.max_depth,
        },
    };
    debug!(?options, "rendering");

    let result = kin::render_with_options(&input, &options).and_then(|output| match &cli.output {
        Some(path) => kin::save(path, &output),
        None => {
            if options.format == OutputFormat::Ascii {
                println!("{output}");
            } else {
                print!("{output}");
            }
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
