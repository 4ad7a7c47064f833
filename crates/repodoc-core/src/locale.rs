// SPDX-License-Identifier: AGPL-3.0-or-later
//! Supported report locales, their titles and download file names

use crate::traits::OutputKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A report locale; anything unrecognised resolves to English
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Fr,
    De,
    Zh,
}

/// Writing system, which decides the font family of every style role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Latin,
    Cjk,
}

impl Locale {
    pub const ALL: [Self; 5] = [Self::En, Self::Es, Self::Fr, Self::De, Self::Zh];

    pub fn code(&self) -> &'static str {
        self.profile().code
    }

    pub const fn script(&self) -> Script {
        match self {
            Self::Zh => Script::Cjk,
            Self::En | Self::Es | Self::Fr | Self::De => Script::Latin,
        }
    }

    /// Resolve a locale code such as `de` or `zh-CN`, falling back to English
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match Self::ALL.into_iter().find(|l| l.code() == primary) {
            Some(locale) => locale,
            None => {
                tracing::warn!(code, "unsupported locale, falling back to English");
                Self::En
            }
        }
    }

    pub fn profile(&self) -> &'static LocaleProfile {
        &PROFILES[*self as usize]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Title and file naming for one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleProfile {
    pub locale: Locale,
    pub code: &'static str,
    pub display_title: &'static str,
    pub file_base_name: &'static str,
}

/// Indexed by `Locale as usize`.
static PROFILES: [LocaleProfile; 5] = [
    LocaleProfile {
        locale: Locale::En,
        code: "en",
        display_title: "Repository Analysis",
        file_base_name: "repository_analysis",
    },
    LocaleProfile {
        locale: Locale::Es,
        code: "es",
        display_title: "Análisis del Repositorio",
        file_base_name: "analisis_repositorio",
    },
    LocaleProfile {
        locale: Locale::Fr,
        code: "fr",
        display_title: "Analyse du Dépôt",
        file_base_name: "analyse_depot",
    },
    LocaleProfile {
        locale: Locale::De,
        code: "de",
        display_title: "Repository-Analyse",
        file_base_name: "repository_analyse",
    },
    LocaleProfile {
        locale: Locale::Zh,
        code: "zh",
        display_title: "代码仓库分析",
        file_base_name: "代码仓库分析",
    },
];

impl LocaleProfile {
    /// `<base>.<ext>` as it should appear on disk
    pub fn file_name(&self, kind: OutputKind) -> String {
        format!("{}.{}", self.file_base_name, kind.extension())
    }

    /// File name safe for an HTTP header; non-ASCII names are percent-encoded
    pub fn transport_file_name(&self, kind: OutputKind) -> String {
        let name = self.file_name(kind);
        if name.is_ascii() {
            name
        } else {
            urlencoding::encode(&name).into_owned()
        }
    }
}

/// Look up the profile for a locale code, English when unknown
pub fn resolve_profile(code: &str) -> &'static LocaleProfile {
    Locale::from_code(code).profile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_line_up_with_variants() {
        for locale in Locale::ALL {
            assert_eq!(locale.profile().locale, locale);
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Locale::from_code("de"), Locale::De);
        assert_eq!(Locale::from_code(" ZH "), Locale::Zh);
        assert_eq!(Locale::from_code("zh-CN"), Locale::Zh);
        assert_eq!(Locale::from_code("fr_CA"), Locale::Fr);
    }

    #[test]
    fn test_unknown_code_falls_back_to_english() {
        assert_eq!(Locale::from_code("xx"), Locale::En);
        assert_eq!(Locale::from_code(""), Locale::En);
        let profile = resolve_profile("pt");
        assert_eq!(profile.display_title, "Repository Analysis");
        assert_eq!(profile.file_base_name, "repository_analysis");
    }

    #[test]
    fn test_ascii_file_names_pass_through() {
        let profile = resolve_profile("es");
        assert_eq!(
            profile.transport_file_name(OutputKind::Pdf),
            "analisis_repositorio.pdf"
        );
        assert_eq!(
            profile.transport_file_name(OutputKind::Markdown),
            "analisis_repositorio.md"
        );
    }

    #[test]
    fn test_non_ascii_file_names_are_percent_encoded() {
        let profile = resolve_profile("zh");
        assert_eq!(profile.file_name(OutputKind::Pdf), "代码仓库分析.pdf");
        assert_eq!(
            profile.transport_file_name(OutputKind::Pdf),
            "%E4%BB%A3%E7%A0%81%E4%BB%93%E5%BA%93%E5%88%86%E6%9E%90.pdf"
        );
    }

    #[test]
    fn test_script() {
        assert_eq!(Locale::Zh.script(), Script::Cjk);
        assert_eq!(Locale::Fr.script(), Script::Latin);
    }
}
