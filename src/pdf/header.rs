use crate::columns::Align;
use crate::model::{DocumentRenderRequest, display_date};

use super::canvas::{Canvas, DrawStyle, TextStyle};

pub(super) const BRAND_BLUE: [u8; 3] = [0x1E, 0x90, 0xFF];
const BLACK: [u8; 3] = [0, 0, 0];
/// x of the right-hand column on the number/date and PO lines.
const RIGHT_COLUMN_X: f32 = 400.0;

/// Left text at the body edge, right text at `RIGHT_COLUMN_X`, sharing one baseline.
fn two_column_line(canvas: &mut Canvas, left: Option<String>, right: Option<String>) {
    let g = canvas.geometry();
    let body = TextStyle::regular(9.0);
    let line_h = canvas.fonts().regular.line_height(body.size);
    canvas.ensure_space(line_h);
    let y = canvas.cursor().y;
    if let Some(text) = left {
        canvas.text_line(&text, g.body_left, y, RIGHT_COLUMN_X - g.body_left, Align::Left, &body);
    }
    if let Some(text) = right {
        canvas.text_line(&text, RIGHT_COLUMN_X, y, g.width - g.margin - RIGHT_COLUMN_X, Align::Left, &body);
    }
    canvas.advance(line_h);
    canvas.move_down(0.5);
}

fn city_line(city: &str, state: &str, pincode: &str) -> String {
    if pincode.is_empty() {
        format!("{city}, {state}")
    } else {
        format!("{city}, {state} - {pincode}")
    }
}

/// Company block, document title, number/date, PO line and the "Kind Attention"
/// customer block. Leaves the cursor where the item table starts.
pub(super) fn draw_header(canvas: &mut Canvas, req: &DocumentRenderRequest) {
    let g = canvas.geometry();
    let company = &req.company_details;
    let x = g.body_left;

    canvas.flow_centered(&company.company_name, &TextStyle::bold(18.0).colored(BRAND_BLUE));

    let body = TextStyle::regular(9.0);
    canvas.flow_centered(&company.address_line, &body);
    canvas.flow_centered(&city_line(&company.city, &company.state, &company.pincode), &body);
    canvas.move_down(0.2);
    canvas.flow_centered(
        &format!("Con: {} | Email: {}", company.contact_number, company.email),
        &body,
    );
    canvas.move_down(0.8);

    let title = TextStyle::bold(14.0).colored(BRAND_BLUE).underlined();
    canvas.flow_centered(req.document_type.title(), &title);
    canvas.move_down(0.5);

    two_column_line(
        canvas,
        Some(format!("{}: {}", req.document_type.number_label(), req.document_number)),
        Some(format!("Date: {}", display_date(req.date))),
    );

    if let Some(po) = req.po_line() {
        two_column_line(
            canvas,
            (!po.po_number.is_empty()).then(|| format!("PO Number: {}", po.po_number)),
            po.po_date.map(|d| format!("PO Date: {}", display_date(d))),
        );
    }

    let y = canvas.cursor().y;
    canvas.line(x, y, g.width - x, y, &DrawStyle::stroked(BLACK, 1.0));
    canvas.move_down(0.8);

    let customer = &req.customer_details;
    canvas.flow_text("Kind Attention", x, None, Align::Left, &TextStyle::bold(10.0));
    canvas.flow_text(&customer.customer_name, x, None, Align::Left, &body);
    canvas.flow_text(&customer.customer_company_name, x, None, Align::Left, &TextStyle::bold(9.0));
    let address = [
        customer.address_line.clone(),
        city_line(&customer.city, &customer.state, &customer.pincode),
        format!("Contact No: {}", customer.contact_number),
    ]
    .join("\n");
    canvas.flow_text(&address, x, None, Align::Left, &body);
    canvas.move_down(1.5);
}
