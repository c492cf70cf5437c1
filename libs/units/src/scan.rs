//! Leading-number scanning for quantity text.

use crate::error::ScanError;
use crate::locale::{Locale, NumberFormat};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScannedNumber {
    pub value: f64,
    /// Byte index of the first character after the number.
    pub end: usize,
}

/// Reads the number at the start of a quantity string.
pub trait NumberScanner: Send + Sync {
    fn scan(&self, text: &str, locale: &Locale) -> Result<ScannedNumber, ScanError>;
}

/// Consumes the longest numeric prefix it can make sense of.
///
/// Accepts leading whitespace, a sign (`+`, `-`, `−`), digit groups separated
/// by the locale's grouping separator (a separator only counts when exactly
/// three digits follow it), the locale's decimal separator or `.`, an
/// exponent (`1.5e3`), and the special values `∞`, `Infinity` and `NaN`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LenientNumberScanner;

impl NumberScanner for LenientNumberScanner {
    fn scan(&self, text: &str, locale: &Locale) -> Result<ScannedNumber, ScanError> {
        Cursor::new(text, locale.number_format()).scan()
    }
}

struct Cursor<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    format: NumberFormat,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, format: NumberFormat) -> Self {
        Self {
            text,
            chars: text.char_indices().collect(),
            pos: 0,
            format,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|(_, c)| *c)
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn byte_pos(&self) -> usize {
        self.chars
            .get(self.pos)
            .map_or(self.text.len(), |(i, _)| *i)
    }

    fn digit_at(&self, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|c| c.is_ascii_digit())
    }

    fn scan(mut self) -> Result<ScannedNumber, ScanError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }

        let mut literal = String::new();
        if let Some(c @ ('+' | '-' | '\u{2212}')) = self.peek() {
            if c != '+' {
                literal.push('-');
            }
            self.pos += 1;
        }

        if let Some(special) = self.special(&literal) {
            return Ok(special);
        }

        let mut digits = 0usize;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                literal.push(c);
                digits += 1;
                self.pos += 1;
            } else if digits > 0 && self.format.is_group_separator(c) && self.group_follows() {
                self.pos += 1;
            } else {
                break;
            }
        }

        if let Some(c) = self.peek() {
            if c == self.format.decimal_separator || c == '.' {
                if digits > 0 || self.digit_at(1) {
                    literal.push('.');
                    self.pos += 1;
                    while self.digit_at(0) {
                        literal.push(self.chars[self.pos].1);
                        digits += 1;
                        self.pos += 1;
                    }
                }
            }
        }

        if digits == 0 {
            return Err(ScanError::NoDigits(self.byte_pos()));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let sign_len = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.digit_at(1 + sign_len) {
                literal.push('e');
                if self.peek_at(1) == Some('-') {
                    literal.push('-');
                }
                self.pos += 1 + sign_len;
                while self.digit_at(0) {
                    literal.push(self.chars[self.pos].1);
                    self.pos += 1;
                }
            }
        }

        let value = literal
            .parse::<f64>()
            .map_err(|_| ScanError::InvalidLiteral(literal.clone()))?;
        Ok(ScannedNumber {
            value,
            end: self.byte_pos(),
        })
    }

    /// A grouping separator is only taken as such when exactly three digits
    /// follow it.
    fn group_follows(&self) -> bool {
        self.digit_at(1) && self.digit_at(2) && self.digit_at(3) && !self.digit_at(4)
    }

    fn special(&mut self, sign: &str) -> Option<ScannedNumber> {
        let start = self.byte_pos();
        let rest = &self.text[start..];
        let negative = sign == "-";
        let (value, len) = if rest.starts_with('∞') {
            (f64::INFINITY, '∞'.len_utf8())
        } else if starts_with_ignore_case(rest, "infinity") {
            (f64::INFINITY, "infinity".len())
        } else if rest.starts_with("NaN") {
            (f64::NAN, "NaN".len())
        } else {
            return None;
        };
        let value = if negative { -value } else { value };
        let end = start + len;
        while self.byte_pos() < end {
            self.pos += 1;
        }
        Some(ScannedNumber { value, end })
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
