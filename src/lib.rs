pub mod columns;
mod error;
mod fonts;
pub mod model;
pub mod numbering;
mod options;
mod pdf;
pub mod store;

pub use columns::{ColumnPlan, MIN_PARTICULARS_WIDTH, TaxKind};
pub use error::Error;
pub use model::{
    BankDetails, CompanyDetails, CustomerDetails, DispatchDetails, DocumentRenderRequest, DocumentType, LineItem,
    PoDetails, Totals,
};
pub use numbering::{InMemoryCounter, NumberAllocator};
pub use options::{DEFAULT_TERMS, RenderOptions, Watermark};
pub use pdf::{
    LayoutCursor, PageGeometry, RenderSummary, SIGNATURE_BLOCK_HEIGHT, TotalsRow, row_height, signature_needs_break,
    totals_rows,
};
pub use store::{BlobStore, FsBlobStore, StoredBlob};

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where a rendered document goes.
#[derive(Clone, Debug)]
pub enum OutputSink {
    File(PathBuf),
    Buffer,
}

#[derive(Clone, Debug)]
pub enum RenderOutput {
    File(PathBuf),
    Buffer(Vec<u8>),
}

/// Render a document and deliver it to `sink`.
pub fn render(request: &DocumentRenderRequest, sink: OutputSink, options: &RenderOptions) -> Result<RenderOutput, Error> {
    let (bytes, _) = render_with_summary(request, options)?;
    match sink {
        OutputSink::Buffer => Ok(RenderOutput::Buffer(bytes)),
        OutputSink::File(path) => {
            write_atomically(&path, &bytes)?;
            Ok(RenderOutput::File(path))
        }
    }
}

/// Render to bytes, also reporting where every block landed.
pub fn render_with_summary(
    request: &DocumentRenderRequest,
    options: &RenderOptions,
) -> Result<(Vec<u8>, RenderSummary), Error> {
    pdf::render(request, options)
}

pub fn render_to_writer<W: Write>(
    request: &DocumentRenderRequest,
    options: &RenderOptions,
    mut writer: W,
) -> Result<(), Error> {
    let (bytes, _) = pdf::render(request, options)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Parse a JSON render request from `input` and write the PDF to `output`.
pub fn render_json_file(input: &Path, output: &Path, options: &RenderOptions) -> Result<RenderSummary, Error> {
    let t0 = Instant::now();

    let data = std::fs::read(input).map_err(Error::Io)?;
    let request = DocumentRenderRequest::from_json(&data)?;
    let t_parse = t0.elapsed();

    let (bytes, summary) = pdf::render(&request, options)?;
    let t_render = t0.elapsed();

    write_atomically(output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes, {} pages)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
        summary.page_count,
    );

    Ok(summary)
}

/// Stored file name for a document: `invoice_INV_2024-2025_001.pdf`.
pub fn storage_file_name(request: &DocumentRenderRequest) -> String {
    format!(
        "{}_{}.pdf",
        request.document_type.as_str(),
        request.document_number.replace('/', "_")
    )
}

/// Render to memory and hand the bytes to `store`.
pub fn generate_and_store(
    request: &DocumentRenderRequest,
    options: &RenderOptions,
    store: &dyn BlobStore,
) -> Result<StoredBlob, Error> {
    let (bytes, _) = pdf::render(request, options)?;
    let metadata = serde_json::json!({
        "documentType": request.document_type.as_str(),
        "documentNumber": request.document_number,
    });
    store.store(&bytes, &storage_file_name(request), metadata)
}

/// Write into a sibling temporary file, then rename it over `path`. The
/// temporary file is deleted when dropped, so `path` never holds a partial PDF.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let with_path = |e: std::io::Error| Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)));
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".gstdoc-")
        .suffix(".pdf.tmp")
        .tempfile_in(dir)
        .map_err(with_path)?;
    tmp.write_all(bytes).map_err(with_path)?;
    tmp.as_file().sync_all().map_err(with_path)?;
    tmp.persist(path).map_err(|e| with_path(e.error))?;
    Ok(())
}
