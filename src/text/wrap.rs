use crate::assets::font::FontHandle;
use crate::foundation::error::{PromoError, PromoResult};

// Sub-pixel measurement noise must not flip a break decision.
const FIT_EPSILON: f32 = 1e-3;

/// One wrapped line, expressed as a char range of the original text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedLine {
    /// Line content, whitespace at the break points removed.
    pub text: String,
    /// Index of the line's first char in the original text.
    pub char_start: usize,
    /// Number of chars in `text`.
    pub char_len: usize,
}

impl WrappedLine {
    fn from_span(chars: &[char], start: usize, end: usize) -> Self {
        Self {
            text: chars[start..end].iter().collect(),
            char_start: start,
            char_len: end - start,
        }
    }

    /// Chars of this line visible when the first `revealed` chars of the full text are shown.
    pub fn visible_chars(&self, revealed: usize) -> usize {
        revealed.saturating_sub(self.char_start).min(self.char_len)
    }
}

/// Greedy word wrap of `text` so every line measures at most `max_width` pixels with `font`.
///
/// `\n` always breaks. A word wider than `max_width` on its own is split between chars. Empty
/// text yields no lines; an empty paragraph yields an empty line.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font: &dyn FontHandle,
) -> PromoResult<Vec<WrappedLine>> {
    if !max_width.is_finite() || max_width <= 0.0 {
        return Err(PromoError::validation("wrap max_width must be finite and > 0"));
    }

    let chars: Vec<char> = text.chars().collect();
    let mut lines = Vec::new();
    if chars.is_empty() {
        return Ok(lines);
    }

    let mut wrapper = Wrapper {
        chars: &chars,
        max_width,
        font,
        lines: &mut lines,
    };
    let mut para_start = 0;
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            wrapper.paragraph(para_start, i)?;
            para_start = i + 1;
        }
    }
    wrapper.paragraph(para_start, chars.len())?;

    Ok(lines)
}

struct Wrapper<'a> {
    chars: &'a [char],
    max_width: f32,
    font: &'a dyn FontHandle,
    lines: &'a mut Vec<WrappedLine>,
}

impl Wrapper<'_> {
    fn fits(&self, start: usize, end: usize) -> PromoResult<bool> {
        let s: String = self.chars[start..end].iter().collect();
        let (w, _) = self.font.measure(&s)?;
        Ok(w <= self.max_width + FIT_EPSILON)
    }

    fn push(&mut self, start: usize, end: usize) {
        self.lines
            .push(WrappedLine::from_span(self.chars, start, end));
    }

    fn words(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut word_start = None;
        for i in start..end {
            let ws = self.chars[i].is_whitespace();
            match (word_start, ws) {
                (None, false) => word_start = Some(i),
                (Some(s), true) => {
                    out.push((s, i));
                    word_start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = word_start {
            out.push((s, end));
        }
        out
    }

    fn paragraph(&mut self, start: usize, end: usize) -> PromoResult<()> {
        let words = self.words(start, end);
        if words.is_empty() {
            self.push(start, start);
            return Ok(());
        }

        let mut line: Option<(usize, usize)> = None;
        for (ws, we) in words {
            if let Some((ls, le)) = line {
                if self.fits(ls, we)? {
                    line = Some((ls, we));
                    continue;
                }
                self.push(ls, le);
            }

            let mut s = ws;
            while we - s > 1 && !self.fits(s, we)? {
                let e = self.longest_fit(s, we)?;
                self.push(s, e);
                s = e;
            }
            line = Some((s, we));
        }
        if let Some((ls, le)) = line {
            self.push(ls, le);
        }
        Ok(())
    }

    /// Longest prefix of `start..end` that fits, at least one char and shorter than the span.
    fn longest_fit(&self, start: usize, end: usize) -> PromoResult<usize> {
        let mut e = start + 1;
        while e + 1 < end && self.fits(start, e + 1)? {
            e += 1;
        }
        Ok(e)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
