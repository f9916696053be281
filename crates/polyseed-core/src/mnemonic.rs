//! Encoded phrase type.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::lang::Language;

/// A 16-word phrase together with the language it was written in.
///
/// The phrase text is zeroized on drop. Neither `Clone` nor `Debug` is
/// implemented so the words cannot leak through copies or logs.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic {
    phrase: String,
    #[zeroize(skip)]
    language: &'static Language,
}

impl Mnemonic {
    pub(crate) fn new(phrase: String, language: &'static Language) -> Self {
        Self { phrase, language }
    }

    /// Returns the phrase as a string slice.
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    /// Returns the language of the phrase.
    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// Returns the individual words.
    ///
    /// Dense languages are split per character, the rest on whitespace
    /// (which includes the ideographic space).
    pub fn words(&self) -> Vec<&str> {
        if self.language.is_dense() {
            self.phrase
                .char_indices()
                .map(|(i, c)| &self.phrase[i..i + c.len_utf8()])
                .collect()
        } else {
            self.phrase.split_whitespace().collect()
        }
    }

    /// Returns the phrase length in bytes.
    pub fn len(&self) -> usize {
        self.phrase.len()
    }

    /// Returns `true` if the phrase is empty.
    pub fn is_empty(&self) -> bool {
        self.phrase.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_ideographic_space() {
        let ja = &Language::all()[1];
        let m = Mnemonic::new("あい\u{3000}いう".into(), ja);
        assert_eq!(m.words(), vec!["あい", "いう"]);
    }

    #[test]
    fn dense_words_are_characters() {
        let zh = &Language::all()[8];
        let m = Mnemonic::new("的一是".into(), zh);
        assert_eq!(m.words(), vec!["的", "一", "是"]);
        assert_eq!(m.len(), 9);
    }
}
