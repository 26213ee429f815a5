use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gstdoc_pdf::{BlobStore, DocumentRenderRequest, FsBlobStore, RenderOptions, Watermark};

#[derive(Parser)]
#[command(version, about = "Render a GST quotation, proforma or invoice request to PDF")]
struct Cli {
    /// JSON render request
    input: PathBuf,

    /// Output PDF (defaults to the input path with a .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Watermark image stamped on every page (overrides GSTDOC_WATERMARK)
    #[arg(long)]
    watermark: Option<PathBuf>,

    /// TrueType font for body text (overrides GSTDOC_FONT_REGULAR)
    #[arg(long)]
    font_regular: Option<PathBuf>,

    /// TrueType font for bold text (overrides GSTDOC_FONT_BOLD)
    #[arg(long)]
    font_bold: Option<PathBuf>,

    /// Store the PDF in this blob directory instead of writing OUTPUT
    #[arg(long, conflicts_with = "output")]
    store: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn options(cli: &Cli) -> Result<RenderOptions, gstdoc_pdf::Error> {
    let mut opts = RenderOptions::from_env()?;
    if let Some(path) = &cli.watermark {
        opts.watermark = Some(Watermark::from_path(path)?);
    }
    if cli.font_regular.is_some() {
        opts.regular_font = cli.font_regular.clone();
    }
    if cli.font_bold.is_some() {
        opts.bold_font = cli.font_bold.clone();
    }
    Ok(opts)
}

fn run(cli: &Cli) -> Result<(), gstdoc_pdf::Error> {
    let opts = options(cli)?;

    if let Some(dir) = &cli.store {
        let data = std::fs::read(&cli.input)?;
        let request = DocumentRenderRequest::from_json(&data)?;
        let store = FsBlobStore::open(dir)?;
        let blob = gstdoc_pdf::generate_and_store(&request, &opts, &store as &dyn BlobStore)?;
        println!("{} {} ({} bytes)", blob.id, blob.name, blob.size);
        return Ok(());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("pdf"));
    let summary = gstdoc_pdf::render_json_file(&cli.input, &output, &opts)?;
    println!("{} ({} pages)", output.display(), summary.page_count);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
