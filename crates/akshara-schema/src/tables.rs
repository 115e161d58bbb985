//! Built-in reference data: primary scripts per language and the
//! romanization target of each script.
//!
//! Language keys are ISO 639-3. The first script of each entry is the primary
//! one. Scripts without a romanization entry have no defined target.

use crate::script::Script;

pub(crate) static LANGUAGE_SCRIPTS: &[(&str, &[Script])] = &[
    ("hin", &[Script::DEVANAGARI]),
    ("ara", &[Script::ARAB]),
    ("ben", &[Script::BENGALI]),
    ("rus", &[Script::RUSSIAN_CYRILLIC]),
    ("jpn", &[Script::HIRAGANA, Script::KATAKANA]),
    ("pan", &[Script::GURMUKHI, Script::SHAHMUKHI]),
    ("mar", &[Script::DEVANAGARI]),
    ("tel", &[Script::TELUGU]),
    ("tam", &[Script::TAMIL, Script::TAMIL_EXTENDED]),
    ("fas", &[Script::ARAB_FA, Script::ARAB]),
    ("urd", &[Script::URDU, Script::ARAB, Script::SHAHMUKHI]),
    ("guj", &[Script::GUJARATI]),
    ("pus", &[Script::ARAB]),
    ("mal", &[Script::MALAYALAM]),
    ("mai", &[Script::DEVANAGARI, Script::TIRHUTA, Script::KAITHI]),
    ("mya", &[Script::BURMESE]),
    ("ukr", &[Script::RUSSIAN_CYRILLIC]),
    ("uzb", &[Script::RUSSIAN_CYRILLIC]),
    ("orm", &[Script::ETHI]),
    ("asm", &[Script::ASSAMESE]),
    ("kur", &[Script::ARAB]),
    ("tha", &[Script::THAI]),
    ("nep", &[Script::DEVANAGARI]),
    ("khm", &[Script::KHMER]),
    ("sin", &[Script::SINHALA]),
    ("kaz", &[Script::RUSSIAN_CYRILLIC]),
    ("bul", &[Script::RUSSIAN_CYRILLIC]),
    ("bel", &[Script::RUSSIAN_CYRILLIC]),
    ("sat", &[Script::SANTALI]),
    ("srp", &[Script::RUSSIAN_CYRILLIC]),
    ("tir", &[Script::ETHI]),
    ("kas", &[Script::DEVANAGARI, Script::SHARADA]),
    ("kir", &[Script::RUSSIAN_CYRILLIC]),
    ("tgk", &[Script::RUSSIAN_CYRILLIC]),

    ("mni", &[Script::MEETEI_MAYEK]),
    ("bod", &[Script::TIBETAN]),
    ("new", &[Script::NEWA]),
    ("khb", &[Script::KHUEN_THAM, Script::LUE_THAM]),
    ("nod", &[Script::TAI_THAM]),
    ("lep", &[Script::LEPCHA]),
    ("lif", &[Script::LIMBU]),
    ("ccp", &[Script::CHAKMA]),
    ("gon", &[Script::GUNJALA_GONDI, Script::MASARAM_GONDI]),
    ("hoc", &[Script::WARANG_CITI]),
    ("rhg", &[Script::HANIFI_ROHINGYA]),
    ("kht", &[Script::KHAMTI_SHAN]),
    ("kaw", &[Script::KAWI]),
    ("jav", &[Script::JAVANESE]),
    ("bug", &[Script::BUGINESE]),
    ("syl", &[Script::SYLOTI_NAGRI]),
    ("bho", &[Script::DEVANAGARI]),
    ("awa", &[Script::DEVANAGARI]),
    ("kok", &[Script::DEVANAGARI]),
    ("dgo", &[Script::DEVANAGARI]),
    ("bra", &[Script::DEVANAGARI]),
    ("tjl", &[Script::TAI_LAING]),
    ("srb", &[Script::SORA_SOMPENG]),
    ("rej", &[Script::REJANG]),
    ("ban", &[Script::BALINESE]),
    ("saz", &[Script::SAURASHTRA]),
    ("mak", &[Script::MAKASAR]),
    ("div", &[Script::THAANA]),

    ("san", &[Script::DEVANAGARI]),
    ("ave", &[Script::AVESTAN]),
    ("pal", &[Script::PHLI]),
    ("xpr", &[Script::PRTI]),
    ("xna", &[Script::NARB]),
    ("xsa", &[Script::SARB]),
    ("peo", &[Script::OLD_PERSIAN]),
    ("sog", &[Script::SOGD]),
    ("arc", &[Script::ARMI]),
    ("phn", &[Script::PHNX]),
    ("smp", &[Script::SAMR]),
    ("uga", &[Script::UGAR]),
    ("syr", &[Script::SYRE]),

    ("aha", &[Script::AHOM]),
    ("btx", &[Script::BATAK_KARO]),
    ("btm", &[Script::BATAK_MANDA]),
    ("btd", &[Script::BATAK_PAKPAK]),
    ("bts", &[Script::BATAK_SIMA]),
    ("bbc", &[Script::BATAK_TOBA]),
    ("bku", &[Script::BUHID]),
    ("hnn", &[Script::HANUNOO]),
    ("mro", &[Script::MRO]),
    ("nnp", &[Script::WANCHO]),
];

pub(crate) static ROMANIZATIONS: &[(Script, Script)] = &[
    (Script::DEVANAGARI, Script::ISO),
    (Script::BENGALI, Script::ISO),
    (Script::GUJARATI, Script::ISO),
    (Script::GURMUKHI, Script::ISO),
    (Script::KANNADA, Script::ISO),
    (Script::MALAYALAM, Script::ISO),
    (Script::ORIYA, Script::ISO),
    (Script::TAMIL, Script::ISO),
    (Script::TELUGU, Script::ISO),
    (Script::SINHALA, Script::ISO),
    (Script::MEETEI_MAYEK, Script::ISO),
    (Script::TIRHUTA, Script::ISO),
    (Script::SYLOTI_NAGRI, Script::ISO),

    (Script::THAI, Script::ISO),
    (Script::LAO, Script::ISO),
    (Script::LAO_PALI, Script::ISO),
    (Script::BURMESE, Script::ISO),
    (Script::KHMER, Script::ISO),
    (Script::JAVANESE, Script::ISO),
    (Script::BALINESE, Script::ISO),
    (Script::CHAM, Script::ISO),
    (Script::TAI_THAM, Script::ISO),
    (Script::LAO_THAM, Script::ISO),
    (Script::KHUEN_THAM, Script::ISO),
    (Script::LUE_THAM, Script::ISO),
    (Script::CHAKMA, Script::ISO),
    (Script::LEPCHA, Script::ISO),
    (Script::LIMBU, Script::ISO),
    (Script::AHOM, Script::ISO),

    (Script::ARAB, Script::ISO233),
    (Script::ARAB_FA, Script::PERSIAN_DMG),
    (Script::HEBREW, Script::ISO259),
    (Script::HEBR_AR, Script::ISO259),
    (Script::SYRN, Script::LATN),
    (Script::SYRJ, Script::LATN),
    (Script::SYRE, Script::LATN),
    (Script::ARMI, Script::LATN),
    (Script::PHNX, Script::LATN),
    (Script::OLD_PERSIAN, Script::PERSIAN_DMG),

    (Script::HIRAGANA, Script::ISO),
    (Script::KATAKANA, Script::ISO),

    (Script::RUSSIAN_CYRILLIC, Script::ISO),
    (Script::IPA, Script::ISO),
    (Script::THAANA, Script::ISO),
    (Script::TIBETAN, Script::ISO),

    (Script::GRANTHA, Script::IAST),
    (Script::GRANTHA_PANDYA, Script::IAST),
    (Script::BRAHMI, Script::IAST),
    (Script::SIDDHAM, Script::IAST),
    (Script::SHARADA, Script::IAST),
    (Script::MODI, Script::IAST),
    (Script::NANDINAGARI, Script::IAST),
    (Script::KHAROSHTHI, Script::IAST),
    (Script::BHAIKSUKI, Script::IAST),
    (Script::TAMIL_BRAHMI, Script::IAST),

    (Script::NARB, Script::LATN),
    (Script::SARB, Script::LATN),
    (Script::PHLI, Script::PERSIAN_DMG),
    (Script::PHLP, Script::PERSIAN_DMG),
    (Script::PRTI, Script::PERSIAN_DMG),
    (Script::SOGO, Script::LATN),
    (Script::SOGD, Script::LATN),
    (Script::UGAR, Script::LATN),
    (Script::SAMR, Script::LATN),

    (Script::VATTELUTTU, Script::ISO),
    (Script::MAHAJANI, Script::ISO),
    (Script::MULTANI, Script::ISO),
    (Script::KHUDAWADI, Script::ISO),
    (Script::KHOJKI, Script::ISO),
    (Script::SHAN, Script::ISO),
    (Script::TAI_LAING, Script::ISO),
    (Script::KHAMTI_SHAN, Script::ISO),
    (Script::MONGOLIAN, Script::ISO),
    (Script::PHAGS_PA, Script::ISO),
    (Script::MARCHEN, Script::ISO),
    (Script::ZANABAZAR_SQUARE, Script::ISO),
    (Script::SOYOMBO, Script::ISO),
    (Script::DOGRA, Script::ISO),
    (Script::GUNJALA_GONDI, Script::ISO),
    (Script::MASARAM_GONDI, Script::ISO),
    (Script::SORA_SOMPENG, Script::ISO),
    (Script::WARANG_CITI, Script::ISO),
];
