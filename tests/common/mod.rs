#![allow(dead_code)]

use std::io::Cursor;

use chrono::NaiveDate;
use gstdoc_pdf::{
    BankDetails, CompanyDetails, CustomerDetails, DispatchDetails, DocumentRenderRequest, DocumentType, LineItem,
    Totals, Watermark,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn company() -> CompanyDetails {
    CompanyDetails {
        company_name: "Shree Ganesh Steel Traders".into(),
        address_line: "Plot 14, MIDC Industrial Area".into(),
        city: "Pune".into(),
        state: "Maharashtra".into(),
        pincode: "411019".into(),
        contact_number: "+91 98220 12345".into(),
        email: "sales@ganeshsteel.example".into(),
    }
}

pub fn customer() -> CustomerDetails {
    CustomerDetails {
        customer_name: "Mr. Anil Kulkarni".into(),
        customer_company_name: "Kulkarni Constructions Pvt. Ltd.".into(),
        address_line: "22 Station Road".into(),
        city: "Nashik".into(),
        state: "Maharashtra".into(),
        pincode: "422001".into(),
        contact_number: "+91 94220 54321".into(),
        email: String::new(),
    }
}

pub fn item(s_no: u32, particulars: &str, quantity: f64, rate: f64, cgst: f64, sgst: f64, igst: f64) -> LineItem {
    LineItem {
        s_no,
        particulars: particulars.into(),
        hsn_code: "7214".into(),
        quantity,
        unit: "MT".into(),
        rate,
        cgst,
        sgst,
        igst,
        amount: quantity * rate,
    }
}

/// `n` intra-state items at 9% CGST + 9% SGST.
pub fn intra_state_items(n: usize) -> Vec<LineItem> {
    (0..n)
        .map(|i| item(i as u32 + 1, &format!("TMT Bar Fe500D {}mm", 8 + i % 5 * 2), 2.0, 52000.0, 9.0, 9.0, 0.0))
        .collect()
}

pub fn request(document_type: DocumentType, items: Vec<LineItem>) -> DocumentRenderRequest {
    let totals = Totals::from_items(&items);
    DocumentRenderRequest {
        document_type,
        document_number: format!("{}/2024-2025/007", document_type.number_prefix()),
        date: date(2024, 11, 5),
        company_details: company(),
        customer_details: customer(),
        items,
        totals,
        bank_details: None,
        po_details: None,
        dispatch_details: None,
    }
}

pub fn bank() -> BankDetails {
    BankDetails {
        beneficiary_name: "Shree Ganesh Steel Traders".into(),
        bank_name: "State Bank of India".into(),
        account_number: "30012345678".into(),
        ifsc_code: "SBIN0001234".into(),
        branch: "Bhosari".into(),
    }
}

pub fn dispatch() -> DispatchDetails {
    DispatchDetails {
        delivery_type: "Door Delivery".into(),
        dispatch_date: Some(date(2024, 11, 7)),
        courier_name: "VRL Logistics".into(),
    }
}

/// Small PNG with a transparent corner, so the soft mask path is exercised.
pub fn watermark_png() -> Watermark {
    let mut img = image::RgbaImage::from_pixel(40, 20, image::Rgba([30, 144, 255, 255]));
    img.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
    let mut data = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
        .unwrap();
    Watermark { data }
}

/// Count `/Type /Page` objects (not `/Type /Pages`) in uncompressed object headers.
pub fn count_pages(pdf: &[u8]) -> usize {
    let needle = b"/Type /Page";
    pdf.windows(needle.len() + 1)
        .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
        .count()
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Inflated bodies of every Flate stream in `pdf` that decodes cleanly.
pub fn inflated_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let start_tag = b"stream\n";
    let end_tag = b"\nendstream";
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(rel) = find(&pdf[pos..], start_tag) {
        let at = pos + rel;
        let body_start = at + start_tag.len();
        if at >= 3 && &pdf[at - 3..at] == b"end" {
            pos = body_start;
            continue;
        }
        let Some(len) = find(&pdf[body_start..], end_tag) else {
            break;
        };
        if let Ok(data) = miniz_oxide::inflate::decompress_to_vec_zlib(&pdf[body_start..body_start + len]) {
            out.push(data);
        }
        pos = body_start + len + end_tag.len();
    }
    out
}

/// Page content streams: the inflated streams that draw text.
pub fn page_contents(pdf: &[u8]) -> Vec<String> {
    inflated_streams(pdf)
        .into_iter()
        .filter(|s| contains(s, b"BT\n"))
        .map(|s| String::from_utf8_lossy(&s).into_owned())
        .collect()
}

/// Operator of each content-stream line (pdf-writer emits one operation per line).
pub fn operators(content: &str) -> Vec<&str> {
    content
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
