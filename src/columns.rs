//! Item-table column planning.
//!
//! The table always carries seven fixed columns and a final tax-inclusive
//! `Amount` column. A CGST, SGST or IGST group (rate + amount sub-columns under
//! one merged header) is inserted only when at least one item uses that tax, so
//! a document mixing intra-state and inter-state lines shows all three.
//!
//! The planned widths always add up to the available width: slack widens the
//! Particulars column, overflow narrows it down to [`MIN_PARTICULARS_WIDTH`] and
//! whatever overflow is left is taken from the other columns proportionally.
//! The floor only holds while the available width is at least
//! [`MIN_PARTICULARS_WIDTH`]; below that every other column collapses to zero
//! and Particulars takes the whole width.

use crate::model::{LineItem, Totals};

/// Narrowest the Particulars column is allowed to get before other columns give way.
pub const MIN_PARTICULARS_WIDTH: f32 = 60.0;

const TAX_RATE_WIDTH: f32 = 25.0;
const TAX_AMOUNT_WIDTH: f32 = 35.0;

/// Scaled widths are floored to 1/64 pt. Sums of such values stay exact in f32
/// for any realistic page width.
const WIDTH_GRID: f32 = 64.0;

fn snap(width: f32) -> f32 {
    (width * WIDTH_GRID).floor() / WIDTH_GRID
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaxKind {
    Cgst,
    Sgst,
    Igst,
}

impl TaxKind {
    /// Fixed column order.
    pub const ALL: [TaxKind; 3] = [TaxKind::Cgst, TaxKind::Sgst, TaxKind::Igst];

    pub fn label(self) -> &'static str {
        match self {
            TaxKind::Cgst => "CGST",
            TaxKind::Sgst => "SGST",
            TaxKind::Igst => "IGST",
        }
    }

    pub fn rate(self, item: &LineItem) -> f64 {
        match self {
            TaxKind::Cgst => item.cgst,
            TaxKind::Sgst => item.sgst,
            TaxKind::Igst => item.igst,
        }
    }

    pub fn total(self, totals: &Totals) -> f64 {
        match self {
            TaxKind::Cgst => totals.total_cgst,
            TaxKind::Sgst => totals.total_sgst,
            TaxKind::Igst => totals.total_igst,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnKind {
    SerialNo,
    Particulars,
    HsnCode,
    Quantity,
    Unit,
    Rate,
    TaxableAmount,
    Tax(TaxKind),
    Amount,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub kind: ColumnKind,
    pub header: &'static str,
    pub width: f32,
    pub align: Align,
    /// Width of the `Rate%` sub-column of a tax group; zero for other columns.
    pub rate_width: f32,
}

impl Column {
    fn fixed(kind: ColumnKind, header: &'static str, width: f32, align: Align) -> Self {
        Self {
            kind,
            header,
            width,
            align,
            rate_width: 0.0,
        }
    }

    fn tax(kind: TaxKind) -> Self {
        Self {
            kind: ColumnKind::Tax(kind),
            header: kind.label(),
            width: TAX_RATE_WIDTH + TAX_AMOUNT_WIDTH,
            align: Align::Center,
            rate_width: TAX_RATE_WIDTH,
        }
    }

    pub fn is_tax_group(&self) -> bool {
        matches!(self.kind, ColumnKind::Tax(_))
    }

    /// Width of the `Amt` sub-column of a tax group.
    pub fn amount_width(&self) -> f32 {
        self.width - self.rate_width
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnPlan {
    columns: Vec<Column>,
}

impl ColumnPlan {
    pub fn plan(items: &[LineItem], available_width: f32) -> Self {
        let mut columns = vec![
            Column::fixed(ColumnKind::SerialNo, "S.No", 30.0, Align::Center),
            Column::fixed(ColumnKind::Particulars, "PARTICULARS", 130.0, Align::Left),
            Column::fixed(ColumnKind::HsnCode, "HSN Code", 45.0, Align::Center),
            Column::fixed(ColumnKind::Quantity, "Qty", 30.0, Align::Center),
            Column::fixed(ColumnKind::Unit, "Unit", 30.0, Align::Center),
            Column::fixed(ColumnKind::Rate, "Rate", 50.0, Align::Right),
            Column::fixed(ColumnKind::TaxableAmount, "Taxable Amt", 65.0, Align::Right),
        ];
        for kind in TaxKind::ALL {
            if items.iter().any(|item| kind.rate(item) != 0.0) {
                columns.push(Column::tax(kind));
            }
        }
        columns.push(Column::fixed(ColumnKind::Amount, "Amount", 65.0, Align::Right));

        let mut plan = Self { columns };
        plan.fit(available_width);
        plan
    }

    fn particulars_index(&self) -> usize {
        // Always present: pushed second in `plan`.
        1
    }

    /// Particulars takes whatever the other columns leave. When that would be
    /// under the floor, the other columns are scaled down until Particulars sits
    /// at [`MIN_PARTICULARS_WIDTH`]. Scaled widths are snapped to `WIDTH_GRID`, so
    /// their sum is exact and `others + particulars` reproduces the available
    /// width bit for bit.
    fn fit(&mut self, available_width: f32) {
        let p = self.particulars_index();
        let others = self.others_width();

        if others + MIN_PARTICULARS_WIDTH > available_width {
            let room = (available_width - MIN_PARTICULARS_WIDTH).max(0.0);
            let factor = room / others;
            if available_width < MIN_PARTICULARS_WIDTH {
                log::warn!(
                    "Item table width {available_width:.1}pt is below the {MIN_PARTICULARS_WIDTH}pt Particulars floor; other columns collapsed"
                );
            } else {
                log::warn!(
                    "Item table overflows by {:.1}pt; Particulars held at {MIN_PARTICULARS_WIDTH}pt, other columns scaled by {factor:.3}",
                    others + self.columns[p].width - available_width
                );
            }
            for (i, col) in self.columns.iter_mut().enumerate() {
                if i != p {
                    col.width = snap(col.width * factor);
                    col.rate_width = snap(col.rate_width * factor).min(col.width);
                }
            }
        }

        self.columns[p].width = available_width - self.others_width();
    }

    /// Sum of every column but Particulars. Exact: all terms lie on `WIDTH_GRID`.
    fn others_width(&self) -> f32 {
        let p = self.particulars_index();
        self.columns
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != p)
            .map(|(_, c)| c.width)
            .sum()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn total_width(&self) -> f32 {
        self.others_width() + self.particulars_width()
    }

    pub fn particulars_width(&self) -> f32 {
        self.columns[self.particulars_index()].width
    }

    pub fn has_tax(&self, kind: TaxKind) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Tax(kind))
    }

    pub fn tax_kinds(&self) -> Vec<TaxKind> {
        self.columns
            .iter()
            .filter_map(|c| match c.kind {
                ColumnKind::Tax(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    /// Left edge of every column when the table starts at `start_x`.
    pub fn x_positions(&self, start_x: f32) -> Vec<f32> {
        self.columns
            .iter()
            .scan(start_x, |x, col| {
                let left = *x;
                *x += col.width;
                Some(left)
            })
            .collect()
    }

    /// Width of the final `Amount` column, which also holds totals values.
    pub fn amount_width(&self) -> f32 {
        self.columns.last().map_or(0.0, |c| c.width)
    }
}
