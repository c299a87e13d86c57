use unicode_width::UnicodeWidthStr;

/// Height of a big glyph in terminal rows
pub const GLYPH_HEIGHT: usize = 5;

fn glyph(c: char) -> Option<[&'static str; GLYPH_HEIGHT]> {
    let rows = match c {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => ["  █", "  █", "  █", "  █", "  █"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        ':' => [" ", "█", " ", "█", " "],
        '.' => [" ", " ", " ", " ", "█"],
        _ => return None,
    };
    Some(rows)
}

/// Render `text` as five lines of block glyphs separated by one blank column.
/// Returns `None` if a character has no glyph.
pub fn render_big(text: &str) -> Option<Vec<String>> {
    let glyphs = text.chars().map(glyph).collect::<Option<Vec<_>>>()?;

    let lines = (0..GLYPH_HEIGHT)
        .map(|row| {
            glyphs
                .iter()
                .map(|g| g[row])
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .collect();
    Some(lines)
}

/// Display width of a rendered big string
pub fn big_width(lines: &[String]) -> usize {
    lines.iter().map(|l| l.width()).max().unwrap_or(0)
}
