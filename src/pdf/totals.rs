use crate::columns::{Align, ColumnPlan, TaxKind};
use crate::model::{BankDetails, DispatchDetails, DocumentRenderRequest, Totals, display_date};

use super::canvas::{Canvas, DrawStyle, TextStyle};
use super::header::BRAND_BLUE;
use super::table::{GRID, GRID_WIDTH, HEADER_FILL};

const TOTALS_ROW_HEIGHT: f32 = 20.0;
const PANEL_TITLE_GAP: f32 = 20.0;
const PANEL_LINE_HEIGHT: f32 = 15.0;
const DISPATCH_PANEL_X: f32 = 310.0;

/// One line of the totals block as rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct TotalsRow {
    pub label: &'static str,
    pub value: f64,
    pub highlighted: bool,
}

fn tax_row_label(kind: TaxKind) -> &'static str {
    match kind {
        TaxKind::Cgst => "CGST Amount",
        TaxKind::Sgst => "SGST Amount",
        TaxKind::Igst => "IGST Amount",
    }
}

/// Taxable amount and grand total always; a tax row only when its total is nonzero.
pub fn totals_rows(totals: &Totals) -> Vec<TotalsRow> {
    let mut rows = vec![TotalsRow {
        label: "Taxable Amount",
        value: totals.taxable_amount,
        highlighted: false,
    }];
    for kind in TaxKind::ALL {
        let value = kind.total(totals);
        if value > 0.0 {
            rows.push(TotalsRow {
                label: tax_row_label(kind),
                value,
                highlighted: false,
            });
        }
    }
    rows.push(TotalsRow {
        label: "Grand Total",
        value: totals.grand_total,
        highlighted: true,
    });
    rows
}

pub(super) fn draw_totals(canvas: &mut Canvas, totals: &Totals, plan: &ColumnPlan) -> Vec<TotalsRow> {
    let start_x = canvas.geometry().body_left;
    let table_w = plan.total_width();
    let value_w = plan.amount_width();
    let label_w = table_w - value_w;
    let grid = DrawStyle::stroked(GRID, GRID_WIDTH);
    let style = TextStyle::bold(9.0);

    let rows = totals_rows(totals);
    for row in &rows {
        canvas.ensure_space(TOTALS_ROW_HEIGHT);
        let y = canvas.cursor().y;
        if row.highlighted {
            canvas.rect(start_x, y, table_w, TOTALS_ROW_HEIGHT, &DrawStyle::filled(HEADER_FILL));
        }
        canvas.rect(start_x, y, label_w, TOTALS_ROW_HEIGHT, &grid);
        canvas.text_line(row.label, start_x, y + 6.0, label_w - 10.0, Align::Right, &style);
        canvas.rect(start_x + label_w, y, value_w, TOTALS_ROW_HEIGHT, &grid);
        canvas.text_line(
            &format!("{:.2}", row.value),
            start_x + label_w + 3.0,
            y + 6.0,
            value_w - 6.0,
            Align::Right,
            &style,
        );
        canvas.advance(TOTALS_ROW_HEIGHT);
    }
    rows
}

fn bank_lines(bank: &BankDetails) -> Vec<String> {
    let mut lines = Vec::new();
    if !bank.beneficiary_name.is_empty() {
        lines.push(format!("Beneficiary Name: {}", bank.beneficiary_name));
    }
    lines.push(format!("Bank Name: {}", bank.bank_name));
    lines.push(format!("Account Number: {}", bank.account_number));
    lines.push(format!("IFSC Code: {}", bank.ifsc_code));
    if !bank.branch.is_empty() {
        lines.push(format!("Branch: {}", bank.branch));
    }
    lines
}

fn dispatch_lines(dispatch: &DispatchDetails) -> Vec<String> {
    let mut lines = Vec::new();
    if !dispatch.delivery_type.is_empty() {
        lines.push(format!("Delivery Type: {}", dispatch.delivery_type));
    }
    if let Some(date) = dispatch.dispatch_date {
        lines.push(format!("Dispatch Date: {}", display_date(date)));
    }
    if !dispatch.courier_name.is_empty() {
        lines.push(format!("Courier: {}", dispatch.courier_name));
    }
    lines
}

fn panel_height(lines: &[String]) -> f32 {
    PANEL_TITLE_GAP + PANEL_LINE_HEIGHT * lines.len() as f32
}

fn draw_panel(canvas: &mut Canvas, title: &str, lines: &[String], x: f32, y: f32) {
    canvas.text_line(title, x, y, 250.0, Align::Left, &TextStyle::bold(11.0).colored(BRAND_BLUE));
    let body = TextStyle::regular(9.0);
    for (i, line) in lines.iter().enumerate() {
        let line_y = y + PANEL_TITLE_GAP + PANEL_LINE_HEIGHT * i as f32;
        canvas.text_line(line, x, line_y, 250.0, Align::Left, &body);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(super) struct PanelLayout {
    pub(super) bank: bool,
    pub(super) dispatch: bool,
}

/// Bank details on the left, dispatch details on the right, from one shared top.
/// The cursor ends below the taller of the two.
pub(super) fn draw_panels(canvas: &mut Canvas, req: &DocumentRenderRequest) -> PanelLayout {
    let bank = req
        .bank_details
        .as_ref()
        .filter(|_| req.shows_bank_panel())
        .map(bank_lines);
    let dispatch = req
        .dispatch_details
        .as_ref()
        .filter(|_| req.shows_dispatch_panel())
        .map(dispatch_lines);

    let layout = PanelLayout {
        bank: bank.is_some(),
        dispatch: dispatch.is_some(),
    };
    if bank.is_none() && dispatch.is_none() {
        return layout;
    }

    canvas.move_down(1.5);
    let bank_h = bank.as_deref().map_or(0.0, panel_height);
    let dispatch_h = dispatch.as_deref().map_or(0.0, panel_height);
    let height = bank_h.max(dispatch_h);
    canvas.ensure_space(height);

    let y = canvas.cursor().y;
    let left_x = canvas.geometry().body_left;
    if let Some(lines) = &bank {
        draw_panel(canvas, "Bank Details:", lines, left_x, y);
    }
    if let Some(lines) = &dispatch {
        draw_panel(canvas, "Dispatch Details:", lines, DISPATCH_PANEL_X, y);
    }
    canvas.set_y(y + height);
    canvas.set_font_size(9.0);
    layout
}
