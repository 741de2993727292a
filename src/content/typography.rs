//! Locale-aware punctuation correction for prose text

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypographyError {
    #[error("unsupported typography locale `{0}`")]
    UnsupportedLocale(String),
}

/// Quotation marks of a locale: outer pair, then inner pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Quotes {
    open_double: char,
    close_double: char,
    open_single: char,
    close_single: char,
}

const EN_QUOTES: Quotes = Quotes {
    open_double: '“',
    close_double: '”',
    open_single: '‘',
    close_single: '’',
};

const GUILLEMET_QUOTES: Quotes = Quotes {
    open_double: '«',
    close_double: '»',
    open_single: '„',
    close_single: '“',
};

const DE_QUOTES: Quotes = Quotes {
    open_double: '„',
    close_double: '“',
    open_single: '‚',
    close_single: '‘',
};

const FR_QUOTES: Quotes = Quotes {
    open_double: '«',
    close_double: '»',
    open_single: '‹',
    close_single: '›',
};

/// Locale layer over the parser's smart punctuation.
///
/// The parser already places curly quotes, dashes and ellipses with full
/// block context. This maps its English quotes to the locale's pairs and
/// replaces `(c)`, `(r)` and `(tm)`.
#[derive(Debug, Clone)]
pub struct Typographer {
    quotes: Quotes,
}

impl Typographer {
    pub fn for_locale(locale: &str) -> Result<Self, TypographyError> {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let quotes = match language.as_str() {
            "en" => EN_QUOTES,
            "uk" | "ru" | "be" => GUILLEMET_QUOTES,
            "de" => DE_QUOTES,
            "fr" => FR_QUOTES,
            _ => return Err(TypographyError::UnsupportedLocale(locale.to_string())),
        };

        Ok(Self { quotes })
    }

    /// Rewrite a run of prose
    pub fn apply(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;

        while i < chars.len() {
            let rest = &chars[i..];
            let (replacement, consumed) = match rest[0] {
                '“' => (self.quotes.open_double, 1),
                '”' => (self.quotes.close_double, 1),
                '‘' => (self.quotes.open_single, 1),
                // an apostrophe inside a word stays as it is
                '’' if rest.get(1).is_some_and(|c| c.is_alphanumeric()) => ('’', 1),
                '’' => (self.quotes.close_single, 1),
                '(' => symbol(rest).unwrap_or(('(', 1)),
                c => (c, 1),
            };

            out.push(replacement);
            i += consumed;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en(text: &str) -> String {
        Typographer::for_locale("en-US").unwrap().apply(text)
    }

    #[test]
    fn test_english_is_left_as_parsed() {
        assert_eq!(en("“Don’t panic,” she said."), "“Don’t panic,” she said.");
        assert_eq!(en("plain \"ascii\" -- text"), "plain \"ascii\" -- text");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(en("(c) 2024 Acme(TM) (R)"), "© 2024 Acme™ ®");
        assert_eq!(en("(see above)"), "(see above)");
    }

    #[test]
    fn test_locale_quotes() {
        let uk = Typographer::for_locale("uk").unwrap();
        assert_eq!(uk.apply("він сказав “привіт”"), "він сказав «привіт»");

        let de = Typographer::for_locale("de-DE").unwrap();
        assert_eq!(de.apply("“Hallo”"), "„Hallo“");
        assert_eq!(de.apply("‘klein’ gibt’s"), "‚klein‘ gibt’s");
    }

    #[test]
    fn test_unsupported_locale() {
        assert_eq!(
            Typographer::for_locale("xx").unwrap_err(),
            TypographyError::UnsupportedLocale("xx".to_string())
        );
    }
}
