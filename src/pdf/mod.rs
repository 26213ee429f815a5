mod canvas;
mod footer;
mod header;
mod layout;
mod table;
mod totals;

use pdf_writer::{Filter, Finish, Name, Pdf, Rect, Ref, TextStr};

use crate::columns::ColumnPlan;
use crate::error::Error;
use crate::fonts::{FontSet, write_font};
use crate::model::{DocumentRenderRequest, Totals};
use crate::options::{RenderOptions, Watermark};

pub use canvas::{LayoutCursor, PageGeometry};
pub use footer::{SIGNATURE_BLOCK_HEIGHT, signature_needs_break};
pub use totals::{TotalsRow, totals_rows};

use canvas::{Canvas, DrawStyle, PageHook};

const WATERMARK_WIDTH: f32 = 450.0;
const WATERMARK_OPACITY: f32 = 0.1;
const WATERMARK_NAME: &str = "Im1";
const TOTALS_TOLERANCE: f64 = 0.01;

/// Where everything ended up on the page, for callers and tests that need to
/// reason about layout without parsing the PDF.
#[derive(Clone, Debug)]
pub struct RenderSummary {
    pub page_count: usize,
    pub columns: ColumnPlan,
    pub item_row_heights: Vec<f32>,
    /// Page index of every drawn copy of the table header.
    pub table_header_pages: Vec<usize>,
    pub totals_rows: Vec<TotalsRow>,
    pub bank_panel: bool,
    pub dispatch_panel: bool,
    /// Top of the signature block.
    pub signature: LayoutCursor,
    /// Whether the look-ahead guard started a new page for the signature block.
    pub signature_forced_break: bool,
    pub thank_you_page: usize,
    /// Number of watermark images drawn on each page.
    pub watermark_stamps: Vec<usize>,
}

/// Height of an item row whose particulars wrap inside `column_width`, measured
/// with the built-in body font.
pub fn row_height(particulars: &str, column_width: f32) -> f32 {
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };
    let fonts = FontSet::builtin(&mut alloc);
    table::row_height(particulars, column_width, &fonts.regular)
}

/// Decoded watermark ready for embedding: RGB samples plus an optional alpha mask.
struct WatermarkImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl WatermarkImage {
    fn decode(watermark: &Watermark) -> Result<Self, Error> {
        let decoded = image::load_from_memory(&watermark.data)?;
        let rgba = decoded.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        if width == 0 || height == 0 {
            return Err(Error::Image("watermark has zero size".into()));
        }
        let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
        let rgb = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
        let alpha = has_alpha.then(|| rgba.pixels().map(|p| p.0[3]).collect());
        Ok(Self {
            width,
            height,
            rgb,
            alpha,
        })
    }

    /// Drawn size on the page: fixed width, height from the aspect ratio.
    fn page_size(&self) -> (f32, f32) {
        let h = WATERMARK_WIDTH * self.height as f32 / self.width as f32;
        (WATERMARK_WIDTH, h)
    }

    fn write(&self, pdf: &mut Pdf, alloc: &mut impl FnMut() -> Ref) -> Ref {
        let smask_ref = self.alpha.as_ref().map(|alpha| {
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(alpha, 6);
            let mask_ref = alloc();
            let mut mask = pdf.image_xobject(mask_ref, &compressed);
            mask.filter(Filter::FlateDecode);
            mask.width(self.width as i32);
            mask.height(self.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask_ref
        });

        let xobj_ref = alloc();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&self.rgb, 6);
        let mut xobj = pdf.image_xobject(xobj_ref, &compressed);
        xobj.filter(Filter::FlateDecode);
        xobj.width(self.width as i32);
        xobj.height(self.height as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        if let Some(mask_ref) = smask_ref {
            xobj.s_mask(mask_ref);
        }
        xobj_ref
    }
}

/// Page hook that stamps the watermark centered on the page before any content.
fn watermark_hook<'a>(size: (f32, f32)) -> PageHook<'a> {
    Box::new(move |canvas: &mut Canvas<'a>| {
        let g = canvas.geometry();
        let (w, h) = size;
        let x = (g.width - w) / 2.0;
        let y = (g.height - h) / 2.0;
        canvas.image(
            WATERMARK_NAME,
            x,
            y,
            w,
            h,
            &DrawStyle::default().with_opacity(WATERMARK_OPACITY),
        );
    })
}

fn check_totals(req: &DocumentRenderRequest) {
    let computed = Totals::from_items(&req.items);
    let diff = computed.mismatches(&req.totals, TOTALS_TOLERANCE);
    if !diff.is_empty() {
        log::warn!(
            "{} {}: supplied totals differ from item sums in {}; rendering supplied values",
            req.document_type.title(),
            req.document_number,
            diff.join(", ")
        );
    }
}

/// Lay out and assemble the whole document.
pub fn render(req: &DocumentRenderRequest, opts: &RenderOptions) -> Result<(Vec<u8>, RenderSummary), Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    // Phase 1: fonts and watermark
    let fonts = FontSet::load(opts, &mut alloc)?;
    let watermark = opts.watermark.as_ref().map(WatermarkImage::decode).transpose()?;
    let watermark_ref = watermark.as_ref().map(|img| img.write(&mut pdf, &mut alloc));
    let t_resources = t0.elapsed();

    // Phase 2: layout
    check_totals(req);
    let geometry = PageGeometry::A4;
    let plan = ColumnPlan::plan(&req.items, geometry.available_width());
    log::debug!(
        "COLUMNS {:?} total={:.2}",
        plan.columns().iter().map(|c| (c.header, c.width)).collect::<Vec<_>>(),
        plan.total_width()
    );

    let hook = watermark.as_ref().map(|img| watermark_hook(img.page_size()));
    let mut canvas = Canvas::new(geometry, &fonts, hook);
    header::draw_header(&mut canvas, req);
    let table = table::draw_table(&mut canvas, req, &plan);
    let totals_rows = totals::draw_totals(&mut canvas, &req.totals, &plan);
    let panels = totals::draw_panels(&mut canvas, req);
    let footer = footer::draw_footer(&mut canvas, &req.company_details, &opts.terms);
    let output = canvas.finish();
    let t_layout = t0.elapsed();

    // Phase 3: assembly
    for entry in fonts.entries() {
        write_font(&mut pdf, entry, &mut alloc)?;
    }

    let gs_refs: Vec<(String, Ref)> = output
        .opacity_states
        .iter()
        .map(|(name, alpha)| {
            let gs_ref = alloc();
            pdf.ext_graphics(gs_ref)
                .non_stroking_alpha(*alpha)
                .stroking_alpha(*alpha);
            (name.clone(), gs_ref)
        })
        .collect();

    let n = output.pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in output.pages.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut font_dict = resources.fonts();
            for entry in fonts.entries() {
                font_dict.pair(Name(entry.pdf_name.as_bytes()), entry.font_ref);
            }
        }
        if let Some(xobj_ref) = watermark_ref {
            resources
                .x_objects()
                .pair(Name(WATERMARK_NAME.as_bytes()), xobj_ref);
        }
        if !gs_refs.is_empty() {
            let mut states = resources.ext_g_states();
            for (name, gs_ref) in &gs_refs {
                states.pair(Name(name.as_bytes()), *gs_ref);
            }
            states.finish();
        }
    }

    let title = format!("{} {}", req.document_type.title(), req.document_number);
    pdf.document_info(info_id)
        .title(TextStr(&title))
        .producer(TextStr(concat!("gstdoc-pdf ", env!("CARGO_PKG_VERSION"))));
    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: resources={:.1}ms, layout={:.1}ms, assembly={:.1}ms, pages={}",
        t_resources.as_secs_f64() * 1000.0,
        (t_layout - t_resources).as_secs_f64() * 1000.0,
        (t_assembly - t_layout).as_secs_f64() * 1000.0,
        n,
    );

    let summary = RenderSummary {
        page_count: n,
        columns: plan,
        item_row_heights: table.row_heights,
        table_header_pages: table.header_pages,
        totals_rows,
        bank_panel: panels.bank,
        dispatch_panel: panels.dispatch,
        signature: footer.signature,
        signature_forced_break: footer.forced_break,
        thank_you_page: footer.thank_you_page,
        watermark_stamps: output.images_per_page,
    };
    Ok((pdf.finish(), summary))
}
