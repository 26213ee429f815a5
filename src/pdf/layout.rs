use crate::fonts::FontEntry;

pub(crate) struct TextLine {
    pub(crate) text: String,
    pub(crate) width: f32,
}

fn finish_line(text: &mut String, width: &mut f32) -> TextLine {
    let line = TextLine {
        text: std::mem::take(text),
        width: *width,
    };
    *width = 0.0;
    line
}

/// Split a word that is wider than `max_width` on its own into pieces that fit.
/// Every piece holds at least one character so the split always makes progress.
fn split_long_word(word: &str, font: &FontEntry, font_size: f32, max_width: f32) -> Vec<(String, f32)> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_w = 0.0f32;
    for ch in word.chars() {
        let cw = font.char_width_1000(ch) * font_size / 1000.0;
        if !piece.is_empty() && piece_w + cw > max_width {
            pieces.push((std::mem::take(&mut piece), piece_w));
            piece_w = 0.0;
        }
        piece.push(ch);
        piece_w += cw;
    }
    if !piece.is_empty() {
        pieces.push((piece, piece_w));
    }
    pieces
}

/// Greedy word wrap of plain text into lines no wider than `max_width`.
/// Explicit newlines always break; blank source lines are kept as empty lines.
pub(crate) fn wrap_text(text: &str, font: &FontEntry, font_size: f32, max_width: f32) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let space_w = font.space_width(font_size);

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in paragraph.split_whitespace() {
            let ww = font.text_width(word, font_size);

            if ww > max_width && max_width > 0.0 {
                for (piece, pw) in split_long_word(word, font, font_size, max_width) {
                    let proposed = if current.is_empty() { pw } else { current_w + space_w + pw };
                    if !current.is_empty() && proposed > max_width {
                        lines.push(finish_line(&mut current, &mut current_w));
                    }
                    if !current.is_empty() {
                        current.push(' ');
                        current_w += space_w;
                    }
                    current.push_str(&piece);
                    current_w += pw;
                }
                continue;
            }

            let proposed = if current.is_empty() { ww } else { current_w + space_w + ww };
            if !current.is_empty() && proposed > max_width {
                lines.push(finish_line(&mut current, &mut current_w));
            }
            if !current.is_empty() {
                current.push(' ');
                current_w += space_w;
            }
            current.push_str(word);
            current_w += ww;
        }

        lines.push(finish_line(&mut current, &mut current_w));
    }

    // A trailing empty line carries no height of its own.
    while lines.len() > 1 && lines.last().is_some_and(|l| l.text.is_empty()) {
        lines.pop();
    }
    lines
}

/// Height of `text` once wrapped to `max_width`, one line height per line.
pub(crate) fn text_height(text: &str, font: &FontEntry, font_size: f32, max_width: f32) -> f32 {
    wrap_text(text, font, font_size, max_width).len() as f32 * font.line_height(font_size)
}
