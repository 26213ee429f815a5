use crate::columns::Align;
use crate::model::CompanyDetails;

use super::canvas::{Canvas, DrawStyle, LayoutCursor, PageGeometry, TextStyle};

/// Vertical room reserved for the signature lines and the thank-you line.
pub const SIGNATURE_BLOCK_HEIGHT: f32 = 100.0;

const RULE_GREY: [u8; 3] = [0xAA, 0xAA, 0xAA];
const THANK_YOU_GREEN: [u8; 3] = [0x2E, 0x8B, 0x57];
const TERM_INDENT: f32 = 10.0;
const CLOSING_WIDTH: f32 = 500.0;
const SIGNATURE_LINE_GAP: f32 = 15.0;

const CLOSING_STATEMENT: &str = "We trust you will find our offer in order. Should you require any further \
information, please feel free to contact us.";

/// True when a signature block starting at `y` would cross the bottom margin.
pub fn signature_needs_break(y: f32, geometry: &PageGeometry) -> bool {
    !geometry.fits(y, SIGNATURE_BLOCK_HEIGHT)
}

pub(super) struct FooterLayout {
    pub(super) signature: LayoutCursor,
    pub(super) forced_break: bool,
    pub(super) thank_you_page: usize,
}

/// Terms, closing statement, signature block and thank-you line. The signature
/// block and the thank-you line always land on the same page.
pub(super) fn draw_footer(canvas: &mut Canvas, company: &CompanyDetails, terms: &[String]) -> FooterLayout {
    let g = canvas.geometry();
    let x = g.body_left;

    canvas.move_down(1.0);
    canvas.ensure_space(canvas.line_height());
    let y = canvas.cursor().y;
    canvas.line(x, y, g.width - x, y, &DrawStyle::stroked(RULE_GREY, 1.0));
    canvas.move_down(0.5);

    canvas.flow_text("Terms & Conditions:", x, None, Align::Left, &TextStyle::bold(11.0));
    canvas.move_down(0.5);
    let term_style = TextStyle::regular(9.0);
    for term in terms {
        canvas.flow_text(term, x + TERM_INDENT, None, Align::Left, &term_style);
        canvas.move_down(0.2);
    }

    canvas.move_down(1.0);
    canvas.flow_text(CLOSING_STATEMENT, x, Some(CLOSING_WIDTH), Align::Left, &term_style);
    canvas.move_down(1.0);

    let forced_break = signature_needs_break(canvas.cursor().y, &g);
    if forced_break {
        log::debug!("FOOTER signature block moved to a new page at y={:.2}", canvas.cursor().y);
        canvas.new_page();
    }
    let signature = canvas.cursor();
    let y = signature.y;

    let sign_w = g.width - g.margin - x;
    let signer = TextStyle::bold(10.0);
    canvas.text_line("Thanks and Regards,", x, y, sign_w, Align::Left, &signer);
    canvas.text_line(
        &format!("For {}", company.company_name),
        x,
        y + SIGNATURE_LINE_GAP,
        sign_w,
        Align::Left,
        &signer,
    );
    canvas.text_line(
        &format!("{}, {}", company.city, company.state),
        x,
        y + 2.0 * SIGNATURE_LINE_GAP,
        sign_w,
        Align::Left,
        &term_style,
    );

    let line_h = canvas.fonts().regular.line_height(term_style.size);
    canvas.set_y(y + 2.0 * SIGNATURE_LINE_GAP + line_h);
    canvas.set_font_size(term_style.size);
    canvas.move_down(1.0);

    canvas.flow_centered(
        "Thank You For Your Business!",
        &TextStyle::bold(13.0).colored(THANK_YOU_GREEN),
    );

    FooterLayout {
        signature,
        forced_break,
        thank_you_page: canvas.cursor().page,
    }
}
