//! The `Script` identifier and the fixed catalog of scripts the backend accepts.
//!
//! A `Script` can wrap any string; whether it is a member of the catalog is
//! decided by a [`ScriptRegistry`](crate::ScriptRegistry), never by the type.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::ops::Deref;

/// Identifier of a writing system or romanization scheme, e.g. `Devanagari` or `ISO`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script(Cow<'static, str>);

impl Script {
    /// Create a script identifier from any string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(Cow::Owned(s.into()))
    }

    /// Create a script identifier from a static string without allocating.
    pub const fn from_static(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0.into_owned()
    }
}

impl Deref for Script {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Script {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Script {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Script {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Script {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<String> for Script {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl From<&str> for Script {
    fn from(s: &str) -> Self {
        Self(Cow::Owned(s.to_owned()))
    }
}

macro_rules! script_catalog {
    ($($konst:ident => $name:literal,)*) => {
        impl Script {
            $(pub const $konst: Script = Script::from_static($name);)*
        }

        /// Every script accepted by the backend, in catalog order.
        pub const BUILTIN_SCRIPTS: &[&str] = &[$($name,)*];
    };
}

script_catalog! {
    AHOM => "Ahom",
    ARAB => "Arab",
    ARIYAKA => "Ariyaka",
    ASSAMESE => "Assamese",
    AVESTAN => "Avestan",
    BALINESE => "Balinese",
    BATAK_KARO => "BatakKaro",
    BATAK_MANDA => "BatakManda",
    BATAK_PAKPAK => "BatakPakpak",
    BATAK_SIMA => "BatakSima",
    BATAK_TOBA => "BatakToba",
    BENGALI => "Bengali",
    BHAIKSUKI => "Bhaiksuki",
    BRAHMI => "Brahmi",
    BUGINESE => "Buginese",
    BUHID => "Buhid",
    BURMESE => "Burmese",
    CHAKMA => "Chakma",
    CHAM => "Cham",
    RUSSIAN_CYRILLIC => "RussianCyrillic",
    DEVANAGARI => "Devanagari",
    DOGRA => "Dogra",
    ELYM => "Elym",
    ETHI => "Ethi",
    GUNJALA_GONDI => "GunjalaGondi",
    MASARAM_GONDI => "MasaramGondi",
    GRANTHA => "Grantha",
    GRANTHA_PANDYA => "GranthaPandya",
    GUJARATI => "Gujarati",
    HANUNOO => "Hanunoo",
    HATR => "Hatr",
    HEBREW => "Hebrew",
    HEBR_AR => "Hebr-Ar",
    ARMI => "Armi",
    PHLI => "Phli",
    PRTI => "Prti",
    HIRAGANA => "Hiragana",
    KATAKANA => "Katakana",
    JAVANESE => "Javanese",
    KAITHI => "Kaithi",
    KANNADA => "Kannada",
    KAWI => "Kawi",
    KHAMTI_SHAN => "KhamtiShan",
    KHAROSHTHI => "Kharoshthi",
    KHMER => "Khmer",
    KHOJKI => "Khojki",
    KHOM_THAI => "KhomThai",
    KHUDAWADI => "Khudawadi",
    LAO => "Lao",
    LAO_PALI => "LaoPali",
    LEPCHA => "Lepcha",
    LIMBU => "Limbu",
    MAHAJANI => "Mahajani",
    MAKASAR => "Makasar",
    MALAYALAM => "Malayalam",
    MANI => "Mani",
    MARCHEN => "Marchen",
    MEETEI_MAYEK => "MeeteiMayek",
    MODI => "Modi",
    MON => "Mon",
    MONGOLIAN => "Mongolian",
    MRO => "Mro",
    MULTANI => "Multani",
    NBAT => "Nbat",
    NANDINAGARI => "Nandinagari",
    NEWA => "Newa",
    NARB => "Narb",
    OLD_PERSIAN => "OldPersian",
    SOGO => "Sogo",
    SARB => "Sarb",
    ORIYA => "Oriya",
    PALLAVA => "Pallava",
    PALM => "Palm",
    ARAB_FA => "Arab-Fa",
    PHAGS_PA => "PhagsPa",
    PHNX => "Phnx",
    PHLP => "Phlp",
    GURMUKHI => "Gurmukhi",
    RANJANA => "Ranjana",
    REJANG => "Rejang",
    HANIFI_ROHINGYA => "HanifiRohingya",
    BARAHA_NORTH => "BarahaNorth",
    BARAHA_SOUTH => "BarahaSouth",
    ROMAN_COLLOQUIAL => "RomanColloquial",
    PERSIAN_DMG => "PersianDMG",
    HK => "HK",
    IAST => "IAST",
    IAST_PALI => "IASTPali",
    IPA => "IPA",
    ISO => "ISO",
    ISO_PALI => "ISOPali",
    ISO233 => "ISO233",
    ISO259 => "ISO259",
    ITRANS => "Itrans",
    IAST_LOC => "IASTLOC",
    ROMAN_READABLE => "RomanReadable",
    HEBREW_SBL => "HebrewSBL",
    SLP1 => "SLP1",
    TYPE => "Type",
    LATN => "Latn",
    TITUS => "Titus",
    VELTHUIS => "Velthuis",
    WX => "WX",
    SAMR => "Samr",
    SANTALI => "Santali",
    SAURASHTRA => "Saurashtra",
    SHAHMUKHI => "Shahmukhi",
    SHAN => "Shan",
    SHARADA => "Sharada",
    SIDDHAM => "Siddham",
    SINHALA => "Sinhala",
    SOGD => "Sogd",
    SORA_SOMPENG => "SoraSompeng",
    SOYOMBO => "Soyombo",
    SUNDANESE => "Sundanese",
    SYLOTI_NAGRI => "SylotiNagri",
    SYRN => "Syrn",
    SYRE => "Syre",
    SYRJ => "Syrj",
    TAGALOG => "Tagalog",
    TAGBANWA => "Tagbanwa",
    TAI_LAING => "TaiLaing",
    TAKRI => "Takri",
    TAMIL => "Tamil",
    TAMIL_EXTENDED => "TamilExtended",
    TAMIL_BRAHMI => "TamilBrahmi",
    TELUGU => "Telugu",
    THAANA => "Thaana",
    THAI => "Thai",
    TAI_THAM => "TaiTham",
    LAO_THAM => "LaoTham",
    KHUEN_THAM => "KhuenTham",
    LUE_THAM => "LueTham",
    TIBETAN => "Tibetan",
    TIRHUTA => "Tirhuta",
    UGAR => "Ugar",
    URDU => "Urdu",
    VATTELUTTU => "Vatteluttu",
    WANCHO => "Wancho",
    WARANG_CITI => "WarangCiti",
    ZANABAZAR_SQUARE => "ZanabazarSquare",
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn constants_match_catalog_names() {
        assert_eq!(Script::DEVANAGARI.as_str(), "Devanagari");
        assert_eq!(Script::HEBR_AR.as_str(), "Hebr-Ar");
        assert_eq!(Script::ARAB_FA.as_str(), "Arab-Fa");
        assert_eq!(Script::ISO233.as_str(), "ISO233");
        assert_eq!(Script::IAST_LOC.as_str(), "IASTLOC");
    }

    #[test]
    fn catalog_has_no_duplicates() {
        let unique: HashSet<&str> = BUILTIN_SCRIPTS.iter().copied().collect();
        assert_eq!(unique.len(), BUILTIN_SCRIPTS.len());
        assert_eq!(BUILTIN_SCRIPTS.len(), 141);
    }

    #[test]
    fn owned_and_static_compare_equal() {
        assert_eq!(Script::new("Tamil"), Script::TAMIL);
        assert_eq!(Script::from("Tamil"), Script::TAMIL);
        assert_eq!(Script::TAMIL, "Tamil");
    }

    #[test]
    fn serde_is_a_plain_string() {
        let json = serde_json::to_string(&Script::GURMUKHI).unwrap();
        assert_eq!(json, "\"Gurmukhi\"");
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Script::GURMUKHI);
    }

    #[test]
    fn borrow_allows_str_lookups() {
        let set: HashSet<Script> = [Script::THAI, Script::LAO].into_iter().collect();
        assert!(set.contains("Thai"));
        assert!(!set.contains("thai"));
    }
}
