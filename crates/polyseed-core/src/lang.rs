//! Wordlist registry.
//!
//! Ten languages backed by the 2048-word BIP-39 vocabularies shipped in
//! the `bip39` crate. The registry order is fixed and doubles as the
//! decode order; the one-byte identifier is mixed into the phrase
//! checksum, which is what makes language auto-detection possible.
//!
//! Word matching works on NFKD-normalized, lowercased keys. For each
//! word, in order:
//!
//! 1. exact key
//! 2. key with combining marks removed (accent-insensitive languages)
//! 3. unique prefix (languages with a prefix length)
//!
//! Per-language lookup tables are built lazily on first use and are
//! read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use polyseed_types::{PolyseedError, Result, WORDLIST_SIZE};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// A registered phrase language.
///
/// Instances only exist inside the static registry, so every
/// `&'static Language` handed out is guaranteed to be registered.
pub struct Language {
    id: u8,
    name: &'static str,
    name_en: &'static str,
    code: &'static str,
    separator: &'static str,
    dense: bool,
    prefix_len: Option<usize>,
    accent_insensitive: bool,
    compose: bool,
    words: bip39::Language,
    index: OnceLock<WordIndex>,
}

/// Lookup tables for one vocabulary.
///
/// `None` entries mark keys shared by more than one word; such keys
/// never resolve.
struct WordIndex {
    exact: HashMap<String, u16>,
    loose: HashMap<String, Option<u16>>,
    prefix: HashMap<String, Option<u16>>,
}

impl Language {
    const fn new(
        id: u8,
        name: &'static str,
        name_en: &'static str,
        code: &'static str,
        words: bip39::Language,
    ) -> Self {
        Self {
            id,
            name,
            name_en,
            code,
            separator: " ",
            dense: false,
            prefix_len: None,
            accent_insensitive: false,
            compose: false,
            words,
            index: OnceLock::new(),
        }
    }

    const fn dense(mut self) -> Self {
        self.separator = "";
        self.dense = true;
        self
    }

    const fn prefix(mut self, len: usize) -> Self {
        self.prefix_len = Some(len);
        self
    }

    const fn accent_insensitive(mut self) -> Self {
        self.accent_insensitive = true;
        self
    }

    const fn compose(mut self) -> Self {
        self.compose = true;
        self
    }

    /// All registered languages in decode order.
    pub fn all() -> &'static [Language] {
        &REGISTRY
    }

    /// The English wordlist.
    pub fn english() -> &'static Language {
        &REGISTRY[0]
    }

    /// Looks up a language by its checksum identifier.
    pub fn by_id(id: u8) -> Option<&'static Language> {
        REGISTRY.iter().find(|lang| lang.id == id)
    }

    /// Looks up a language by native name, English name or code,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`PolyseedError::UnsupportedLanguage`] if nothing matches.
    pub fn by_name(name: &str) -> Result<&'static Language> {
        let wanted = name.trim().nfc().collect::<String>().to_lowercase();
        REGISTRY
            .iter()
            .find(|lang| {
                lang.name.to_lowercase() == wanted
                    || lang.name_en.to_lowercase() == wanted
                    || lang.code == wanted
            })
            .ok_or_else(|| PolyseedError::UnsupportedLanguage {
                name: name.to_string(),
            })
    }

    /// Identifier mixed into the phrase checksum.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Name in the language itself.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name in English.
    pub fn name_en(&self) -> &'static str {
        self.name_en
    }

    /// Short code such as `"en"` or `"zh-hans"`.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// String placed between words when encoding.
    pub fn word_separator(&self) -> &'static str {
        self.separator
    }

    /// `true` for single-character words written without separators.
    pub fn is_dense(&self) -> bool {
        self.dense
    }

    /// Number of leading characters that identify a word, if abbreviated
    /// input is accepted.
    pub fn prefix_len(&self) -> Option<usize> {
        self.prefix_len
    }

    /// `true` if words match regardless of accents.
    pub fn is_accent_insensitive(&self) -> bool {
        self.accent_insensitive
    }

    /// `true` if encoded phrases are emitted in NFC form.
    pub fn composes_output(&self) -> bool {
        self.compose
    }

    /// Returns the vocabulary entry at `index`.
    pub fn word(&self, index: u16) -> Option<&'static str> {
        self.words.word_list().get(usize::from(index)).copied()
    }

    /// Resolves a single user-typed word to its index.
    ///
    /// Accepts any Unicode form and case; see the module docs for the
    /// matching rules.
    pub fn find_word(&self, word: &str) -> Option<u16> {
        self.lookup(&fold(word))
    }

    /// Resolves an already folded key (NFKD, lowercase).
    pub(crate) fn lookup(&self, key: &str) -> Option<u16> {
        let index = self.index();
        if let Some(&i) = index.exact.get(key) {
            return Some(i);
        }
        if self.accent_insensitive {
            if let Some(&hit) = index.loose.get(&strip_marks(key)) {
                return hit;
            }
        }
        let len = self.prefix_len?;
        let key = self.match_form(key);
        if key.chars().count() < len {
            return None;
        }
        let head: String = key.chars().take(len).collect();
        index.prefix.get(&head).copied().flatten()
    }

    /// Splits a folded phrase into folded word keys.
    pub(crate) fn tokenize(&self, folded: &str) -> Vec<String> {
        if self.dense {
            folded
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(String::from)
                .collect()
        } else {
            folded.split_whitespace().map(str::to_string).collect()
        }
    }

    fn match_form(&self, key: &str) -> String {
        if self.accent_insensitive {
            strip_marks(key)
        } else {
            key.to_string()
        }
    }

    fn index(&self) -> &WordIndex {
        self.index.get_or_init(|| self.build_index())
    }

    fn build_index(&self) -> WordIndex {
        let list = self.words.word_list();
        let mut exact = HashMap::with_capacity(WORDLIST_SIZE);
        let mut loose = HashMap::new();
        let mut prefix = HashMap::new();

        for (i, word) in (0u16..).zip(list.iter()) {
            let key = fold(word);
            if self.accent_insensitive {
                insert_unique(&mut loose, strip_marks(&key), i);
            }
            if let Some(len) = self.prefix_len {
                let head: String = self.match_form(&key).chars().take(len).collect();
                insert_unique(&mut prefix, head, i);
            }
            exact.insert(key, i);
        }

        tracing::debug!(language = self.name_en, words = exact.len(), "wordlist index built");

        WordIndex {
            exact,
            loose,
            prefix,
        }
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Language {}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("id", &self.id)
            .field("name_en", &self.name_en)
            .finish()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_en)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// NFKD plus lowercase; the comparison form for every table key.
fn fold(word: &str) -> String {
    word.nfkd().collect::<String>().to_lowercase()
}

fn strip_marks(key: &str) -> String {
    key.chars().filter(|c| !is_combining_mark(*c)).collect()
}

fn insert_unique(map: &mut HashMap<String, Option<u16>>, key: String, index: u16) {
    map.entry(key)
        .and_modify(|slot| {
            if *slot != Some(index) {
                *slot = None;
            }
        })
        .or_insert(Some(index));
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

static REGISTRY: [Language; 10] = [
    Language::new(0, "English", "English", "en", bip39::Language::English).prefix(4),
    Language::new(1, "日本語", "Japanese", "ja", bip39::Language::Japanese).compose(),
    Language::new(2, "한국어", "Korean", "ko", bip39::Language::Korean).compose(),
    Language::new(3, "Español", "Spanish", "es", bip39::Language::Spanish)
        .prefix(4)
        .accent_insensitive()
        .compose(),
    Language::new(4, "Français", "French", "fr", bip39::Language::French)
        .prefix(4)
        .accent_insensitive()
        .compose(),
    Language::new(5, "Italiano", "Italian", "it", bip39::Language::Italian).prefix(4),
    Language::new(6, "Čeština", "Czech", "cs", bip39::Language::Czech).prefix(4),
    Language::new(7, "Português", "Portuguese", "pt", bip39::Language::Portuguese).prefix(4),
    Language::new(
        8,
        "中文(简体)",
        "Chinese (simplified)",
        "zh-hans",
        bip39::Language::SimplifiedChinese,
    )
    .dense(),
    Language::new(
        9,
        "中文(繁體)",
        "Chinese (traditional)",
        "zh-hant",
        bip39::Language::TraditionalChinese,
    )
    .dense(),
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_ids_are_sequential() {
        for (i, lang) in Language::all().iter().enumerate() {
            assert_eq!(usize::from(lang.id()), i);
            assert_eq!(Language::by_id(lang.id()), Some(lang));
        }
        assert!(Language::by_id(10).is_none());
    }

    #[test]
    fn every_vocabulary_is_complete_and_unambiguous() {
        for lang in Language::all() {
            for i in 0..WORDLIST_SIZE as u16 {
                let word = lang.word(i);
                assert!(word.is_some(), "{lang}: missing word {i}");
                assert_eq!(word.and_then(|w| lang.find_word(w)), Some(i), "{lang}: word {i}");
            }
            assert!(lang.word(WORDLIST_SIZE as u16).is_none());
        }
    }

    #[test]
    fn by_name_accepts_all_spellings() -> std::result::Result<(), PolyseedError> {
        assert_eq!(Language::by_name("english")?.id(), 0);
        assert_eq!(Language::by_name("FR")?.id(), 4);
        assert_eq!(Language::by_name("Español")?.id(), 3);
        assert_eq!(Language::by_name("espa\u{f1}ol")?.id(), 3);
        assert_eq!(Language::by_name("Chinese (Traditional)")?.id(), 9);
        assert_eq!(Language::by_name("日本語")?.id(), 1);
        Ok(())
    }

    #[test]
    fn by_name_rejects_unknown() {
        assert!(matches!(
            Language::by_name("klingon"),
            Err(PolyseedError::UnsupportedLanguage { .. })
        ));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let en = Language::english();
        let first = en.word(0).map(str::to_uppercase);
        assert_eq!(first.and_then(|w| en.find_word(&w)), Some(0));
    }

    #[test]
    fn prefix_matches_abbreviated_words() {
        let en = Language::english();
        for i in [0u16, 416, 1696, 2047] {
            let Some(word) = en.word(i) else {
                panic!("missing english word {i}");
            };
            if word.chars().count() > 4 {
                let head: String = word.chars().take(4).collect();
                assert_eq!(en.find_word(&head), Some(i), "prefix of {word}");
            }
        }
        // Too short for a prefix and not a word.
        assert_eq!(en.find_word("ab"), None);
    }

    #[test]
    fn accent_insensitive_languages_ignore_marks() {
        for lang in Language::all().iter().filter(|l| l.is_accent_insensitive()) {
            let accented = (0..WORDLIST_SIZE as u16)
                .filter_map(|i| lang.word(i).map(|w| (i, w)))
                .find(|(_, w)| !w.is_ascii());
            let Some((i, word)) = accented else {
                panic!("{lang} has no accented words");
            };
            let bare = strip_marks(&fold(word));
            assert_ne!(bare, fold(word));
            assert_eq!(lang.find_word(&bare), Some(i));
        }
    }

    #[test]
    fn accent_sensitive_language_rejects_stripped_words() {
        // Japanese kana with dakuten do not match once the mark is removed.
        let ja = &Language::all()[1];
        let voiced = (0..WORDLIST_SIZE as u16)
            .filter_map(|i| ja.word(i).map(|w| (i, w)))
            .find(|(_, w)| fold(w).chars().any(is_combining_mark));
        let Some((i, word)) = voiced else {
            panic!("japanese list has no voiced kana");
        };
        let bare = strip_marks(&fold(word));
        assert_ne!(ja.find_word(&bare), Some(i));
    }

    #[test]
    fn longest_phrase_fits_every_language() {
        use polyseed_types::{MAX_PHRASE_BYTES, NUM_WORDS};

        for lang in Language::all() {
            let longest = (0..WORDLIST_SIZE as u16)
                .filter_map(|i| lang.word(i))
                .map(|w| {
                    if lang.composes_output() {
                        w.nfc().collect::<String>().len()
                    } else {
                        w.len()
                    }
                })
                .max()
                .unwrap_or_default();
            let worst = NUM_WORDS * longest + (NUM_WORDS - 1) * lang.word_separator().len();
            assert!(worst <= MAX_PHRASE_BYTES, "{lang}: worst case {worst} bytes");
        }
    }

    #[test]
    fn dense_tokenize_splits_characters() {
        let zh = &Language::all()[8];
        let tokens = zh.tokenize("的 一是\u{3000}在");
        assert_eq!(tokens, vec!["的", "一", "是", "在"]);
    }

    #[test]
    fn spaced_tokenize_splits_on_whitespace() {
        let en = Language::english();
        let tokens = en.tokenize("  abandon\tability \n able ");
        assert_eq!(tokens, vec!["abandon", "ability", "able"]);
    }

    #[test]
    fn insert_unique_marks_collisions() {
        let mut map = HashMap::new();
        insert_unique(&mut map, "abcd".into(), 1);
        insert_unique(&mut map, "abcd".into(), 2);
        insert_unique(&mut map, "efgh".into(), 3);
        assert_eq!(map.get("abcd"), Some(&None));
        assert_eq!(map.get("efgh"), Some(&Some(3)));
    }
}
