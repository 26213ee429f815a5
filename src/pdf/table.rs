use crate::columns::{Align, ColumnKind, ColumnPlan};
use crate::fonts::FontEntry;
use crate::model::{DocumentRenderRequest, LineItem};

use super::canvas::{Canvas, DrawStyle, TextStyle};
use super::layout::text_height;

const HEADER_BAND_1: f32 = 15.0;
const HEADER_BAND_2: f32 = 12.0;
pub(super) const HEADER_FILL: [u8; 3] = [0xDC, 0xEC, 0xFF];
pub(super) const GRID: [u8; 3] = [0, 0, 0];
pub(super) const GRID_WIDTH: f32 = 0.5;

pub(crate) const MIN_ROW_HEIGHT: f32 = 20.0;
const ROW_PADDING: f32 = 10.0;
const CELL_INSET_X: f32 = 3.0;
const CELL_INSET_Y: f32 = 5.0;
const BODY_FONT_SIZE: f32 = 8.0;
const HEADER_FONT_SIZE: f32 = 8.0;
const SUBHEADER_FONT_SIZE: f32 = 7.0;

/// Row height for an item whose particulars wrap inside `column_width`.
pub(crate) fn row_height(particulars: &str, column_width: f32, font: &FontEntry) -> f32 {
    let text_w = (column_width - 2.0 * CELL_INSET_X).max(0.0);
    (text_height(particulars, font, BODY_FONT_SIZE, text_w) + ROW_PADDING).max(MIN_ROW_HEIGHT)
}

pub(super) struct TableLayout {
    pub(super) row_heights: Vec<f32>,
    /// Pages the two-band header was drawn on.
    pub(super) header_pages: Vec<usize>,
}

fn format_number(n: f64) -> String {
    format!("{n}")
}

fn money(n: f64) -> String {
    format!("{n:.2}")
}

fn header_height() -> f32 {
    HEADER_BAND_1 + HEADER_BAND_2
}

fn draw_header(canvas: &mut Canvas, plan: &ColumnPlan, start_x: f32) {
    let y = canvas.cursor().y;
    let full_h = header_height();
    let grid = DrawStyle::stroked(GRID, GRID_WIDTH);
    let label = TextStyle::bold(HEADER_FONT_SIZE);
    let sub_label = TextStyle::bold(SUBHEADER_FONT_SIZE);

    canvas.rect(start_x, y, plan.total_width(), full_h, &grid.with_fill(HEADER_FILL));

    for (col, x) in plan.columns().iter().zip(plan.x_positions(start_x)) {
        if col.is_tax_group() {
            canvas.rect(x, y, col.width, HEADER_BAND_1, &grid);
            canvas.text_line(col.header, x, y + 4.0, col.width, Align::Center, &label);

            let sub_y = y + HEADER_BAND_1;
            canvas.rect(x, sub_y, col.rate_width, HEADER_BAND_2, &grid);
            canvas.text_line("Rate%", x, sub_y + 3.0, col.rate_width, Align::Center, &sub_label);
            let amt_x = x + col.rate_width;
            canvas.rect(amt_x, sub_y, col.amount_width(), HEADER_BAND_2, &grid);
            canvas.text_line("Amt", amt_x, sub_y + 3.0, col.amount_width(), Align::Center, &sub_label);
        } else {
            canvas.rect(x, y, col.width, full_h, &grid);
            canvas.text_box(col.header, x, y + 8.0, col.width, Align::Center, &label);
        }
    }

    canvas.advance(full_h);
}

/// Independent bordered cell; shared edges are stroked once per neighbour.
fn draw_cell(canvas: &mut Canvas, text: &str, x: f32, y: f32, w: f32, h: f32, align: Align, wrap: bool) {
    let style = TextStyle::regular(BODY_FONT_SIZE);
    let text_x = x + CELL_INSET_X;
    let text_w = (w - 2.0 * CELL_INSET_X).max(0.0);
    if wrap {
        canvas.text_box(text, text_x, y + CELL_INSET_Y, text_w, align, &style);
    } else {
        canvas.text_line(text, text_x, y + CELL_INSET_Y, text_w, align, &style);
    }
    canvas.rect(x, y, w, h, &DrawStyle::stroked(GRID, GRID_WIDTH));
}

fn draw_row(canvas: &mut Canvas, plan: &ColumnPlan, start_x: f32, index: usize, item: &LineItem, row_h: f32) {
    let y = canvas.cursor().y;
    let serial = if item.s_no > 0 { item.s_no as usize } else { index + 1 };

    for (col, x) in plan.columns().iter().zip(plan.x_positions(start_x)) {
        let (width, align) = (col.width, col.align);
        match col.kind {
            ColumnKind::SerialNo => draw_cell(canvas, &serial.to_string(), x, y, width, row_h, align, true),
            ColumnKind::Particulars => draw_cell(canvas, &item.particulars, x, y, width, row_h, align, true),
            ColumnKind::HsnCode => draw_cell(canvas, &item.hsn_code, x, y, width, row_h, align, true),
            ColumnKind::Quantity => {
                draw_cell(canvas, &format_number(item.quantity), x, y, width, row_h, align, true)
            }
            ColumnKind::Unit => draw_cell(canvas, &item.unit, x, y, width, row_h, align, true),
            ColumnKind::Rate => draw_cell(canvas, &money(item.rate), x, y, width, row_h, align, false),
            ColumnKind::TaxableAmount => draw_cell(canvas, &money(item.amount), x, y, width, row_h, align, false),
            ColumnKind::Tax(tax) => {
                let rate = tax.rate(item);
                draw_cell(canvas, &format_number(rate), x, y, col.rate_width, row_h, Align::Center, false);
                draw_cell(
                    canvas,
                    &money(item.tax_amount(rate)),
                    x + col.rate_width,
                    y,
                    col.amount_width(),
                    row_h,
                    Align::Right,
                    false,
                );
            }
            ColumnKind::Amount => draw_cell(canvas, &money(item.total_with_tax()), x, y, width, row_h, align, false),
        }
    }
}

/// Two-band header followed by one measured row per item. A row that does not
/// fit moves to a new page, where the header is drawn again first.
pub(super) fn draw_table(canvas: &mut Canvas, req: &DocumentRenderRequest, plan: &ColumnPlan) -> TableLayout {
    let start_x = canvas.geometry().body_left;
    let font = &canvas.fonts().regular;
    let particulars_w = plan.particulars_width();

    let row_heights: Vec<f32> = req
        .items
        .iter()
        .map(|item| row_height(&item.particulars, particulars_w, font))
        .collect();

    let mut header_pages = Vec::new();
    let first_row = row_heights.first().copied().unwrap_or(0.0);
    canvas.ensure_space(header_height() + first_row);
    draw_header(canvas, plan, start_x);
    header_pages.push(canvas.cursor().page);

    for (i, (item, &row_h)) in req.items.iter().zip(row_heights.iter()).enumerate() {
        if canvas.ensure_space(row_h) {
            draw_header(canvas, plan, start_x);
            header_pages.push(canvas.cursor().page);
        }
        log::debug!(
            "TABLE row={} row_h={:.2} page={} y={:.2}",
            i,
            row_h,
            canvas.cursor().page,
            canvas.cursor().y
        );
        draw_row(canvas, plan, start_x, i, item, row_h);
        canvas.advance(row_h);
    }

    TableLayout {
        row_heights,
        header_pages,
    }
}
