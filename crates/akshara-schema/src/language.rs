//! ISO 639 language code normalization.
//!
//! Every code accepted by the registry is first reduced to its ISO 639-3 form.
//! Part 1 (`hi`), part 3 and part 2/T (`hin`) and the part 2/B bibliographic
//! codes (`fre`, `ger`, ...) are all accepted, case-insensitively.

use isolang::Language;

/// ISO 639-2/B codes that differ from their 639-2/T (and therefore 639-3) form.
const BIBLIOGRAPHIC_ALIASES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("mao", "mri"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("tib", "bod"),
    ("wel", "cym"),
];

/// Normalize a language code to ISO 639-3.
///
/// Returns `None` when the code is not a known ISO 639 code of any part.
pub fn normalize_language(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_lowercase();
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }

    let language = match code.len() {
        2 => Language::from_639_1(&code),
        3 => {
            let canonical = BIBLIOGRAPHIC_ALIASES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == code)
                .map_or(code.as_str(), |(_, terminologic)| terminologic);
            Language::from_639_3(canonical)
        }
        _ => None,
    }?;

    Some(language.to_639_3().to_owned())
}
