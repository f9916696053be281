//! Language listing.

use polyseed_core::Language;

use crate::output;
use crate::GlobalOpts;

pub fn list(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let rows: Vec<Vec<String>> = Language::all()
        .iter()
        .map(|lang| {
            vec![
                lang.id().to_string(),
                lang.code().to_string(),
                lang.name_en().to_string(),
                lang.name().to_string(),
                lang.prefix_len().map(|n| n.to_string()).unwrap_or_else(|| "-".into()),
                if lang.is_accent_insensitive() {
                    "optional".into()
                } else {
                    "required".into()
                },
            ]
        })
        .collect();
    output::print_table(&["id", "code", "name_en", "name", "prefix", "accents"], &rows, opts.json);
    Ok(())
}
