//! # Document Configuration
//!
//! [`DocumentConfig`] is the root of every build: template, color scheme,
//! page layout, typography, page furniture and feature flags. It is
//! constructible in Rust and deserializable from JSON; both paths run the
//! same derivation, so the palette always matches the scheme and template
//! overrides are always applied.
//!
//! ```
//! use quire::config::{DocumentConfig, Template, ColorScheme};
//!
//! let config: DocumentConfig = serde_json::from_str(
//!     r#"{"template": "magazine", "color_scheme": "modern"}"#,
//! ).unwrap();
//! assert_eq!(config.layout.columns, 2);
//! assert_eq!(config.palette().primary.to_hex(), "#2E86AB");
//!
//! let config = DocumentConfig::new(Template::Academic, ColorScheme::Classic);
//! assert!(config.table_of_contents);
//! ```

pub mod decoration;
pub mod layout;
pub mod palette;
pub mod typography;

pub use decoration::{
    BackgroundConfig, BorderConfig, BorderStyle, FooterConfig, GradientDirection, HeaderConfig,
    WatermarkConfig,
};
pub use layout::{INCH, LayoutConfig, Margins, Orientation, PageSize};
pub use palette::ColorPalette;
pub use typography::Typography;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuireError;

/// Horizontal alignment shared by text, images, tables and furniture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl FromStr for HAlign {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(HAlign::Left),
            "center" | "centre" => Ok(HAlign::Center),
            "right" => Ok(HAlign::Right),
            "justify" => Ok(HAlign::Justify),
            other => Err(QuireError::InvalidConfig(format!("unknown alignment '{}'", other))),
        }
    }
}

/// Generates a snake_case serde enum with `name()`, `ALL` and `FromStr`.
macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident, default $default:ident, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl FromStr for $name {
            type Err = QuireError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name() == wanted)
                    .ok_or_else(|| QuireError::InvalidConfig(format!(
                        "unknown {} '{}'", stringify!($name), s
                    )))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum!(
    /// Overall look of the document; some templates change the layout.
    Template, default Minimal, {
        Minimal => "minimal",
        Corporate => "corporate",
        Creative => "creative",
        Academic => "academic",
        Magazine => "magazine",
        Newspaper => "newspaper",
        Brochure => "brochure",
        Invoice => "invoice",
        Certificate => "certificate",
        Presentation => "presentation",
    }
);

named_enum!(
    /// Named color scheme; selects the [`ColorPalette`].
    ColorScheme, default Classic, {
        Classic => "classic",
        Modern => "modern",
        Vibrant => "vibrant",
        Pastel => "pastel",
        Monochrome => "monochrome",
        CorporateBlue => "corporate_blue",
        Nature => "nature",
        Sunset => "sunset",
        Ocean => "ocean",
        Forest => "forest",
    }
);

/// Full configuration of one document build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDocumentConfig")]
pub struct DocumentConfig {
    template: Template,
    color_scheme: ColorScheme,
    pub layout: LayoutConfig,
    pub typography: Typography,
    pub watermark: Option<WatermarkConfig>,
    pub header: Option<HeaderConfig>,
    pub footer: Option<FooterConfig>,
    pub background: Option<BackgroundConfig>,
    pub border: Option<BorderConfig>,
    pub table_of_contents: bool,
    pub section_numbering: bool,
    pub page_breaks_before_sections: bool,
    pub footnotes: bool,
    #[serde(skip_serializing)]
    palette: ColorPalette,
}

/// Wire form of [`DocumentConfig`]; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawDocumentConfig {
    template: Template,
    color_scheme: ColorScheme,
    layout: LayoutConfig,
    typography: Typography,
    watermark: Option<WatermarkConfig>,
    header: Option<HeaderConfig>,
    footer: Option<FooterConfig>,
    background: Option<BackgroundConfig>,
    border: Option<BorderConfig>,
    table_of_contents: bool,
    section_numbering: bool,
    page_breaks_before_sections: bool,
    footnotes: bool,
}

impl TryFrom<RawDocumentConfig> for DocumentConfig {
    type Error = QuireError;

    fn try_from(raw: RawDocumentConfig) -> Result<Self, Self::Error> {
        let mut config = DocumentConfig {
            template: raw.template,
            color_scheme: raw.color_scheme,
            layout: raw.layout,
            typography: raw.typography,
            watermark: raw.watermark,
            header: raw.header,
            footer: raw.footer,
            background: raw.background,
            border: raw.border,
            table_of_contents: raw.table_of_contents,
            section_numbering: raw.section_numbering,
            page_breaks_before_sections: raw.page_breaks_before_sections,
            footnotes: raw.footnotes,
            palette: ColorPalette::default(),
        };
        config.derive();
        config.validate()?;
        Ok(config)
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig::new(Template::Minimal, ColorScheme::Classic)
    }
}

impl DocumentConfig {
    pub fn new(template: Template, color_scheme: ColorScheme) -> Self {
        let mut config = DocumentConfig {
            template,
            color_scheme,
            layout: LayoutConfig::default(),
            typography: Typography::default(),
            watermark: None,
            header: None,
            footer: None,
            background: None,
            border: None,
            table_of_contents: false,
            section_numbering: false,
            page_breaks_before_sections: false,
            footnotes: false,
            palette: ColorPalette::default(),
        };
        config.derive();
        config
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn set_template(&mut self, template: Template) {
        self.template = template;
        self.derive();
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;
        self.derive();
    }

    /// Rebuild the palette and apply template overrides. Idempotent.
    fn derive(&mut self) {
        self.palette = ColorPalette::for_scheme(self.color_scheme);
        match self.template {
            Template::Magazine => {
                self.layout.columns = 2;
                self.layout.column_gap = 0.3 * INCH;
            }
            Template::Newspaper => {
                self.layout.columns = 3;
                self.layout.column_gap = 0.2 * INCH;
            }
            Template::Academic => {
                self.layout.margins.top = 1.5 * INCH;
                self.layout.margins.bottom = 1.5 * INCH;
                self.table_of_contents = true;
                self.section_numbering = true;
            }
            _ => {}
        }
    }

    /// Check geometric invariants.
    pub fn validate(&self) -> Result<(), QuireError> {
        let width = self.layout.content_width();
        if width <= 0.0 {
            return Err(QuireError::InvalidConfig(format!(
                "content width must be positive, got {:.1}pt",
                width
            )));
        }
        let height = self.layout.content_height();
        if height <= 0.0 {
            return Err(QuireError::InvalidConfig(format!(
                "content height must be positive, got {:.1}pt",
                height
            )));
        }
        if self.layout.columns == 0 {
            return Err(QuireError::InvalidConfig("column count must be at least 1".into()));
        }
        if self.layout.frame_width() <= 0.0 {
            return Err(QuireError::InvalidConfig("column gap leaves no room for columns".into()));
        }
        if self.typography.base_size <= 0.0 {
            return Err(QuireError::InvalidConfig("base font size must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = DocumentConfig::default();
        assert_eq!(config.template(), Template::Minimal);
        assert_eq!(config.color_scheme(), ColorScheme::Classic);
        assert_eq!(config.palette().accent.to_hex(), "#FFD700");
        assert_eq!(config.layout.columns, 1);
    }

    #[test]
    fn test_template_overrides() {
        let magazine = DocumentConfig::new(Template::Magazine, ColorScheme::Classic);
        assert_eq!(magazine.layout.columns, 2);
        assert!((magazine.layout.column_gap - 21.6).abs() < 1e-4);

        let newspaper = DocumentConfig::new(Template::Newspaper, ColorScheme::Classic);
        assert_eq!(newspaper.layout.columns, 3);

        let academic = DocumentConfig::new(Template::Academic, ColorScheme::Classic);
        assert_eq!(academic.layout.margins.top, 108.0);
        assert_eq!(academic.layout.margins.bottom, 108.0);
        assert!(academic.table_of_contents && academic.section_numbering);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let mut config = DocumentConfig::new(Template::Academic, ColorScheme::Modern);
        let before = config.clone();
        config.set_template(Template::Academic);
        config.set_color_scheme(ColorScheme::Modern);
        assert_eq!(config, before);
    }

    #[test]
    fn test_scheme_change_rederives_palette() {
        let mut config = DocumentConfig::default();
        config.set_color_scheme(ColorScheme::Nature);
        assert_eq!(config.palette().primary.to_hex(), "#2E7D32");
    }

    #[test]
    fn test_deserialize_runs_derivation() {
        let config: DocumentConfig =
            serde_json::from_str(r#"{"template": "newspaper", "color_scheme": "vibrant"}"#).unwrap();
        assert_eq!(config.layout.columns, 3);
        assert_eq!(config.palette().primary.to_hex(), "#FF6B6B");
    }

    #[test]
    fn test_non_positive_content_width_rejected() {
        let json = r#"{"layout": {"margins": {"left": 400, "right": 300}}}"#;
        let err = serde_json::from_str::<DocumentConfig>(json).unwrap_err();
        assert!(err.to_string().contains("content width"));
    }

    #[test]
    fn test_unknown_template_rejected() {
        assert!(serde_json::from_str::<DocumentConfig>(r#"{"template": "zine"}"#).is_err());
        assert!("zine".parse::<Template>().is_err());
        assert_eq!("corporate_blue".parse::<ColorScheme>().unwrap(), ColorScheme::CorporateBlue);
    }
}
