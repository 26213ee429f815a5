mod common;

use gstdoc_pdf::{
    DocumentRenderRequest, DocumentType, Error, OutputSink, RenderOptions, RenderOutput, render, render_json_file,
    render_to_writer, render_with_summary,
};

use common::{count_pages, contains, dispatch, intra_state_items, request, watermark_png};

#[test]
fn buffer_sink_returns_pdf_bytes() {
    common::init_logging();
    let req = request(DocumentType::Quotation, intra_state_items(3));
    let out = render(&req, OutputSink::Buffer, &RenderOptions::default()).unwrap();
    let RenderOutput::Buffer(bytes) = out else {
        panic!("expected buffer output");
    };
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(count_pages(&bytes), 1);
    assert!(contains(&bytes, b"/Helvetica-Bold"));
    assert!(contains(&bytes, b"/FlateDecode"));
}

#[test]
fn file_sink_writes_the_same_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotation.pdf");
    let req = request(DocumentType::Quotation, intra_state_items(3));

    let out = render(&req, OutputSink::File(path.clone()), &RenderOptions::default()).unwrap();
    assert!(matches!(out, RenderOutput::File(ref p) if p == &path));

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(count_pages(&bytes), 1);

    // Only the target remains; the temporary file was renamed away.
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn file_sink_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proforma.pdf");
    std::fs::write(&path, b"stale partial output").unwrap();

    let req = request(DocumentType::Proforma, intra_state_items(2));
    render(&req, OutputSink::File(path.clone()), &RenderOptions::default()).unwrap();
    render(&req, OutputSink::File(path.clone()), &RenderOptions::default()).unwrap();

    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["proforma.pdf".to_string()]);
}

#[test]
fn failed_file_render_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    // A directory at the target path makes the final rename fail.
    let target = dir.path().join("invoice.pdf");
    std::fs::create_dir(&target).unwrap();

    let req = request(DocumentType::Invoice, intra_state_items(2));
    let err = render(&req, OutputSink::File(target.clone()), &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["invoice.pdf".to_string()]);
    assert!(target.is_dir());
}

#[test]
fn missing_output_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing").join("out.pdf");
    let req = request(DocumentType::Quotation, intra_state_items(1));
    let err = render(&req, OutputSink::File(target.clone()), &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(!target.exists());
}

#[test]
fn page_count_matches_summary() {
    for n in [1, 30, 90] {
        let req = request(DocumentType::Quotation, intra_state_items(n));
        let (bytes, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();
        assert_eq!(count_pages(&bytes), summary.page_count, "n={n}");
    }
}

#[test]
fn watermark_is_stamped_on_every_page() {
    common::init_logging();
    let opts = RenderOptions {
        watermark: Some(watermark_png()),
        ..RenderOptions::default()
    };
    let mut req = request(DocumentType::Invoice, intra_state_items(70));
    req.dispatch_details = Some(dispatch());

    let (bytes, summary) = render_with_summary(&req, &opts).unwrap();
    assert!(summary.page_count >= 2);
    assert_eq!(summary.watermark_stamps, vec![1; summary.page_count]);
    assert!(contains(&bytes, b"/SMask"));
    assert!(contains(&bytes, b"/ExtGState"));
    assert!(contains(&bytes, b"/Im1"));
}

const PAINT_OPERATORS: [&str; 15] = ["BT", "Tj", "TJ", "'", "\"", "S", "s", "f", "F", "f*", "B", "B*", "b", "b*", "sh"];

#[test]
fn watermark_opacity_is_scoped_to_the_image() {
    let opts = RenderOptions {
        watermark: Some(watermark_png()),
        ..RenderOptions::default()
    };
    let req = request(DocumentType::Quotation, intra_state_items(60));
    let (bytes, summary) = render_with_summary(&req, &opts).unwrap();

    let pages = common::page_contents(&bytes);
    assert!(summary.page_count >= 2);
    assert_eq!(pages.len(), summary.page_count);

    for (page, content) in pages.iter().enumerate() {
        let ops = common::operators(content);
        let gs: Vec<usize> = ops.iter().enumerate().filter(|&(_, &op)| op == "gs").map(|(i, _)| i).collect();
        assert_eq!(gs.len(), 1, "page {page}: expected one opacity state");
        let set = gs[0];
        assert!(content.contains("/GS100 gs"), "page {page}");
        assert!(set > 0 && ops[set - 1] == "q", "page {page}: opacity set outside a saved state");

        let mut depth = 1;
        let mut restore = None;
        for (i, &op) in ops.iter().enumerate().skip(set + 1) {
            match op {
                "q" => depth += 1,
                "Q" => {
                    depth -= 1;
                    if depth == 0 {
                        restore = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let restore = restore.unwrap_or_else(|| panic!("page {page}: opacity state never restored"));

        let scoped = &ops[set + 1..restore];
        assert!(scoped.contains(&"Do"), "page {page}: watermark not drawn under its opacity");
        for op in scoped {
            assert!(!PAINT_OPERATORS.contains(op), "page {page}: `{op}` drawn at watermark opacity");
        }

        let first_text = ops.iter().position(|&op| op == "BT").unwrap();
        assert!(restore < first_text, "page {page}: text drawn before opacity was restored");
    }
}

#[test]
fn no_watermark_means_no_images() {
    let req = request(DocumentType::Quotation, intra_state_items(2));
    let (bytes, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();
    assert!(summary.watermark_stamps.iter().all(|&n| n == 0));
    assert!(!contains(&bytes, b"/XObject"));
}

#[test]
fn undecodable_watermark_is_an_image_error() {
    let opts = RenderOptions {
        watermark: Some(gstdoc_pdf::Watermark {
            data: b"not an image".to_vec(),
        }),
        ..RenderOptions::default()
    };
    let req = request(DocumentType::Quotation, intra_state_items(1));
    let err = render(&req, OutputSink::Buffer, &opts).unwrap_err();
    assert!(matches!(err, Error::Image(_)), "{err}");
}

#[test]
fn missing_font_file_is_a_font_error() {
    let opts = RenderOptions {
        regular_font: Some("/nonexistent/font.ttf".into()),
        ..RenderOptions::default()
    };
    let req = request(DocumentType::Quotation, intra_state_items(1));
    let err = render(&req, OutputSink::Buffer, &opts).unwrap_err();
    assert!(matches!(err, Error::Font(_)), "{err}");
}

#[test]
fn mismatched_totals_still_render() {
    let mut req = request(DocumentType::Proforma, intra_state_items(2));
    req.totals.grand_total += 500.0;
    let (_, summary) = render_with_summary(&req, &RenderOptions::default()).unwrap();
    assert_eq!(summary.totals_rows.last().unwrap().value, req.totals.grand_total);
}

#[test]
fn writer_receives_whole_document() {
    let req = request(DocumentType::Invoice, intra_state_items(4));
    let mut buf = Vec::new();
    render_to_writer(&req, &RenderOptions::default(), &mut buf).unwrap();
    assert!(buf.starts_with(b"%PDF-"));
    assert!(buf.ends_with(b"%%EOF") || buf.ends_with(b"%%EOF\n"));
}

const REQUEST_JSON: &str = r#"{
  "documentType": "invoice",
  "documentNumber": "INV/2024-2025/042",
  "date": "2024-12-03T10:15:00.000Z",
  "companyDetails": {
    "companyName": "Shree Ganesh Steel Traders",
    "addressLine": "Plot 14, MIDC Industrial Area",
    "city": "Pune",
    "state": "Maharashtra",
    "pincode": "411019",
    "contactNumber": "+91 98220 12345",
    "email": "sales@ganeshsteel.example"
  },
  "customerDetails": {
    "customerName": "Ms. Priya Deshmukh",
    "customerCompanyName": "Deshmukh Infra LLP",
    "addressLine": "5 Ring Road",
    "city": "Indore",
    "state": "Madhya Pradesh",
    "contactNumber": "+91 73100 00000"
  },
  "items": [
    { "sNo": 1, "particulars": "MS Channel 100x50", "hsnCode": "7216", "quantity": 1.5,
      "unit": "MT", "rate": 58000, "igst": 18, "amount": 87000 }
  ],
  "totals": {
    "taxableAmount": 87000,
    "totalCGST": 0,
    "totalSGST": 0,
    "totalIGST": 15660,
    "grandTotal": 102660
  },
  "poDetails": { "poNumber": "PO-7781", "poDate": "2024-11-28" },
  "dispatchDetails": { "deliveryType": "", "dispatchDate": "", "courierName": "" }
}"#;

#[test]
fn json_request_parses() {
    let req = DocumentRenderRequest::from_json(REQUEST_JSON.as_bytes()).unwrap();
    assert_eq!(req.document_type, DocumentType::Invoice);
    assert_eq!(req.date, common::date(2024, 12, 3));
    assert_eq!(req.items[0].igst, 18.0);
    assert_eq!(req.items[0].cgst, 0.0);
    assert_eq!(req.totals.total_igst, 15660.0);
    assert_eq!(req.customer_details.pincode, "");
    assert!(req.dispatch_details.as_ref().unwrap().is_empty());
    assert!(!req.shows_dispatch_panel());
    assert_eq!(req.po_details.as_ref().unwrap().po_date, Some(common::date(2024, 11, 28)));
}

#[test]
fn malformed_json_is_invalid_request() {
    let err = DocumentRenderRequest::from_json(b"{ \"documentType\": \"receipt\" }").unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)), "{err}");
}

#[test]
fn json_file_round_trip_to_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("request.json");
    let output = dir.path().join("request.pdf");
    std::fs::write(&input, REQUEST_JSON).unwrap();

    let summary = render_json_file(&input, &output, &RenderOptions::default()).unwrap();
    assert_eq!(summary.page_count, 1);
    assert!(summary.columns.has_tax(gstdoc_pdf::TaxKind::Igst));
    assert!(!summary.columns.has_tax(gstdoc_pdf::TaxKind::Cgst));
    assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF-"));
}
