mod common;

use gstdoc_pdf::{
    DocumentType, PageGeometry, RenderOptions, SIGNATURE_BLOCK_HEIGHT, TaxKind, Totals, row_height,
    render_with_summary, signature_needs_break, totals_rows,
};

use common::{dispatch, intra_state_items, item, request};

#[test]
fn row_height_grows_with_particulars() {
    let width = 130.0;
    let mut prev = 0.0;
    for n in 0..40 {
        let text = "Galvanised binding wire 18 gauge ".repeat(n);
        let h = row_height(&text, width);
        assert!(h >= 20.0);
        assert!(h >= prev, "n={n}: {h} < {prev}");
        prev = h;
    }
    assert!(prev > 20.0);
}

#[test]
fn row_height_has_a_minimum() {
    assert_eq!(row_height("", 130.0), 20.0);
    assert_eq!(row_height("Sand", 130.0), 20.0);
}

#[test]
fn explicit_newlines_add_lines() {
    let one = row_height("Line one", 200.0);
    let three = row_height("Line one\nLine two\nLine three", 200.0);
    assert!(three > one);
}

#[test]
fn totals_rows_skip_zero_taxes() {
    let totals = Totals {
        taxable_amount: 900000.0,
        total_cgst: 81000.0,
        total_sgst: 81000.0,
        total_igst: 0.0,
        grand_total: 1062000.0,
    };
    let rows = totals_rows(&totals);
    let labels: Vec<&str> = rows.iter().map(|r| r.label).collect();
    assert_eq!(labels, ["Taxable Amount", "CGST Amount", "SGST Amount", "Grand Total"]);
    assert!(rows.last().unwrap().highlighted);
    assert!(rows[..rows.len() - 1].iter().all(|r| !r.highlighted));
    assert_eq!(rows.last().unwrap().value, 1062000.0);
}

#[test]
fn signature_guard_threshold() {
    let g = PageGeometry::A4;
    let limit = g.content_bottom() - SIGNATURE_BLOCK_HEIGHT;
    assert!(!signature_needs_break(limit - 1.0, &g));
    assert!(signature_needs_break(limit + 1.0, &g));
}

#[test]
fn signature_block_is_never_split() {
    common::init_logging();
    let g = PageGeometry::A4;
    let opts = RenderOptions::default();
    let mut forced = Vec::new();

    println!();
    println!("| {:>5} | {:>5} | {:>9} | {:>6} | {:>6} |", "items", "pages", "sig y", "sig pg", "forced");
    for n in 1..=60 {
        let mut req = request(DocumentType::Invoice, intra_state_items(n));
        req.dispatch_details = Some(dispatch());
        let (_, summary) = render_with_summary(&req, &opts).unwrap();
        println!(
            "| {:>5} | {:>5} | {:>9.2} | {:>6} | {:>6} |",
            n, summary.page_count, summary.signature.y, summary.signature.page, summary.signature_forced_break
        );

        assert!(
            summary.signature.y + SIGNATURE_BLOCK_HEIGHT <= g.content_bottom() + 0.01,
            "n={n}: signature block at y={} crosses the bottom margin",
            summary.signature.y
        );
        assert_eq!(summary.thank_you_page, summary.signature.page, "n={n}");
        assert_eq!(summary.signature.page + 1, summary.page_count, "n={n}");
        if summary.signature_forced_break {
            assert!((summary.signature.y - g.margin).abs() < 0.01, "n={n}");
            forced.push(n);
        }
    }
    assert!(!forced.is_empty(), "no item count pushed the signature block to a new page");
}

#[test]
fn invoice_with_dispatch_and_no_bank() {
    let items = vec![
        item(1, "TMT Bar Fe500D 12mm", 5.0, 52000.0, 9.0, 9.0, 0.0),
        item(2, "TMT Bar Fe500D 16mm", 4.0, 51500.0, 9.0, 9.0, 0.0),
        item(3, "Binding wire", 2.0, 6500.0, 9.0, 9.0, 0.0),
    ];
    let mut req = request(DocumentType::Invoice, items);
    req.dispatch_details = Some(dispatch());

    let (_, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();

    assert_eq!(summary.columns.tax_kinds(), vec![TaxKind::Cgst, TaxKind::Sgst]);
    assert!(!summary.columns.has_tax(TaxKind::Igst));
    assert!(summary.dispatch_panel);
    assert!(!summary.bank_panel);

    let nonzero_taxes = [req.totals.total_cgst, req.totals.total_sgst, req.totals.total_igst]
        .iter()
        .filter(|&&t| t != 0.0)
        .count();
    let drawn_rows = summary.item_row_heights.len() + summary.totals_rows.len();
    assert_eq!(drawn_rows, req.items.len() + 2 + nonzero_taxes);
    assert_eq!(drawn_rows, 7);
}

#[test]
fn quotation_never_shows_panels() {
    let mut req = request(DocumentType::Quotation, intra_state_items(2));
    req.bank_details = Some(common::bank());
    req.dispatch_details = Some(dispatch());
    let (_, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();
    assert!(!summary.bank_panel);
    assert!(!summary.dispatch_panel);
}

#[test]
fn proforma_shows_bank_panel_only() {
    let mut req = request(DocumentType::Proforma, intra_state_items(2));
    req.bank_details = Some(common::bank());
    req.dispatch_details = Some(dispatch());
    let (_, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();
    assert!(summary.bank_panel);
    assert!(!summary.dispatch_panel);
}

#[test]
fn blank_bank_name_hides_bank_panel() {
    let mut req = request(DocumentType::Invoice, intra_state_items(2));
    let mut bank = common::bank();
    bank.bank_name = "  ".into();
    req.bank_details = Some(bank);
    let (_, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();
    assert!(!summary.bank_panel);
}

#[test]
fn long_tables_repeat_the_header() {
    let req = request(DocumentType::Quotation, intra_state_items(80));
    let (_, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();
    assert!(summary.page_count >= 3);
    assert_eq!(summary.table_header_pages[0], 0);
    assert!(summary.table_header_pages.len() >= 2);
    // One header per page the table touches, in page order.
    for pair in summary.table_header_pages.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
fn wrapped_particulars_make_taller_rows() {
    let long = "Structural steel fabrication including cutting, drilling, welding and two coats of red oxide primer, delivered to site";
    let items = vec![
        item(1, "Sand", 1.0, 100.0, 9.0, 9.0, 0.0),
        item(2, long, 1.0, 100.0, 9.0, 9.0, 0.0),
    ];
    let req = request(DocumentType::Quotation, items);
    let (_, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();
    assert_eq!(summary.item_row_heights[0], 20.0);
    assert!(summary.item_row_heights[1] > 20.0);
    assert_eq!(
        summary.item_row_heights[1],
        row_height(long, summary.columns.particulars_width())
    );
}
