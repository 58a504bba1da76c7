//! Presentation tokens, patches and saved overrides.
//!
//! # Responsibility
//! - Define the fixed-shape token set rendered by every template.
//! - Define partial shapes (`TokenPatch`, `PresentationOverride`) used for
//!   edits and per-profile persistence.
//! - Provide shallow, key-by-key comparison used by the sync bridge.
//!
//! # Invariants
//! - `PresentationTokens` is always fully populated; missing keys in wire
//!   input are filled from `Default`.
//! - `PresentationOverride::matches` treats partial data as different, so a
//!   questionable override is re-applied instead of silently skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("valid hex color regex")
});

const DEFAULT_TEMPLATE: &str = "classic";

/// Validation error for presentation values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationError {
    /// Color token is not `#rgb`, `#rrggbb` or `#rrggbbaa`.
    InvalidColor { key: &'static str, value: String },
    /// Font token is empty or whitespace.
    BlankFont { key: &'static str },
    /// Size token that must be positive is zero.
    ZeroSize { key: &'static str },
    /// Template identifier is empty or whitespace.
    BlankTemplate,
}

impl Display for PresentationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidColor { key, value } => {
                write!(f, "token `{key}` is not a hex color: `{value}`")
            }
            Self::BlankFont { key } => write!(f, "token `{key}` must name a font"),
            Self::ZeroSize { key } => write!(f, "token `{key}` must be greater than zero"),
            Self::BlankTemplate => write!(f, "template id cannot be empty"),
        }
    }
}

impl Error for PresentationError {}

fn check_color(key: &'static str, value: &str) -> Result<(), PresentationError> {
    if HEX_COLOR_RE.is_match(value) {
        Ok(())
    } else {
        Err(PresentationError::InvalidColor {
            key,
            value: value.to_string(),
        })
    }
}

fn check_font(key: &'static str, value: &str) -> Result<(), PresentationError> {
    if value.trim().is_empty() {
        return Err(PresentationError::BlankFont { key });
    }
    Ok(())
}

fn check_positive(key: &'static str, value: &u16) -> Result<(), PresentationError> {
    if *value == 0 {
        return Err(PresentationError::ZeroSize { key });
    }
    Ok(())
}

fn check_none<T>(_key: &'static str, _value: &T) -> Result<(), PresentationError> {
    Ok(())
}

// Generates the full token struct and its partial counterpart from one key
// list so the two shapes can never drift apart.
macro_rules! presentation_tokens {
    ($( $(#[$doc:meta])* $field:ident: $ty:ty = $default:expr => $check:ident; )+) => {
        /// Full set of live visual properties.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct PresentationTokens {
            $( $(#[$doc])* pub $field: $ty, )+
        }

        impl Default for PresentationTokens {
            fn default() -> Self {
                Self { $( $field: $default, )+ }
            }
        }

        impl PresentationTokens {
            /// Token key names in declaration order.
            pub const KEYS: &'static [&'static str] = &[$( stringify!($field) ),+];
        }

        /// Partial token set; `None` keys are left untouched when applied.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct TokenPatch {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )+
        }

        impl TokenPatch {
            /// Returns whether no key is set.
            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )+
            }

            /// Returns whether every key is set.
            pub fn is_complete(&self) -> bool {
                true $( && self.$field.is_some() )+
            }

            /// Number of keys set.
            pub fn len(&self) -> usize {
                0 $( + usize::from(self.$field.is_some()) )+
            }

            /// Returns `base` with every set key replaced.
            pub fn apply_to(&self, base: &PresentationTokens) -> PresentationTokens {
                PresentationTokens {
                    $( $field: self.$field.clone().unwrap_or_else(|| base.$field.clone()), )+
                }
            }

            /// Shallow comparison against a full token set.
            ///
            /// Only a complete patch can match; any missing key counts as a
            /// difference.
            pub fn matches(&self, tokens: &PresentationTokens) -> bool {
                true $( && self.$field.as_ref() == Some(&tokens.$field) )+
            }

            /// Validates every key that is set.
            pub fn validate(&self) -> Result<(), PresentationError> {
                $(
                    if let Some(value) = &self.$field {
                        $check(stringify!($field), value)?;
                    }
                )+
                Ok(())
            }
        }

        impl From<&PresentationTokens> for TokenPatch {
            fn from(tokens: &PresentationTokens) -> Self {
                Self { $( $field: Some(tokens.$field.clone()), )+ }
            }
        }
    };
}

presentation_tokens! {
    /// Brand color used for headings and the totals band.
    primary_color: String = String::from("#1f3a5f") => check_color;
    accent_color: String = String::from("#2f80ed") => check_color;
    text_color: String = String::from("#1f2933") => check_color;
    muted_text_color: String = String::from("#6b7280") => check_color;
    background_color: String = String::from("#ffffff") => check_color;
    border_color: String = String::from("#e5e7eb") => check_color;
    table_header_color: String = String::from("#f3f4f6") => check_color;
    heading_font: String = String::from("Inter") => check_font;
    body_font: String = String::from("Inter") => check_font;
    /// Points.
    base_font_size: u16 = 10 => check_positive;
    /// Base spacing unit in points; zero collapses gaps.
    spacing: u16 = 16 => check_none;
    border_radius: u16 = 4 => check_none;
    logo_size: u16 = 48 => check_positive;
    /// Alternate row shading in the items table.
    table_stripes: bool = true => check_none;
    show_borders: bool = true => check_none;
}

impl PresentationTokens {
    /// Validates every token.
    pub fn validate(&self) -> Result<(), PresentationError> {
        TokenPatch::from(self).validate()
    }
}

/// Identifier of the visual template a document renders with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn validate(&self) -> Result<(), PresentationError> {
        if self.0.trim().is_empty() {
            return Err(PresentationError::BlankTemplate);
        }
        Ok(())
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl Display for TemplateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Snapshot of the live presentation store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationState {
    #[serde(default)]
    pub template: TemplateId,
    #[serde(default)]
    pub tokens: PresentationTokens,
}

/// Saved presentation preference (per profile, and embedded per document).
///
/// Persisted data may be partial or stale, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOverride {
    #[serde(default)]
    pub template: Option<TemplateId>,
    #[serde(default)]
    pub tokens: TokenPatch,
}

impl PresentationOverride {
    /// Full override capturing `state` exactly.
    pub fn from_state(state: &PresentationState) -> Self {
        Self {
            template: Some(state.template.clone()),
            tokens: TokenPatch::from(&state.tokens),
        }
    }

    /// Returns whether this override carries nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.template.is_none() && self.tokens.is_empty()
    }

    /// Shallow comparison against a live snapshot.
    ///
    /// Missing template or any missing token key compares as different.
    pub fn matches(&self, state: &PresentationState) -> bool {
        self.template.as_ref() == Some(&state.template) && self.tokens.matches(&state.tokens)
    }

    pub fn validate(&self) -> Result<(), PresentationError> {
        if let Some(template) = &self.template {
            template.validate()?;
        }
        self.tokens.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        PresentationError, PresentationOverride, PresentationState, PresentationTokens,
        TemplateId, TokenPatch,
    };

    #[test]
    fn default_tokens_are_valid_and_complete() {
        let tokens = PresentationTokens::default();
        tokens.validate().expect("defaults should validate");
        assert!(TokenPatch::from(&tokens).is_complete());
        assert_eq!(
            TokenPatch::from(&tokens).len(),
            PresentationTokens::KEYS.len()
        );
    }

    #[test]
    fn apply_to_replaces_only_set_keys() {
        let base = PresentationTokens::default();
        let patch = TokenPatch {
            primary_color: Some("#000000".to_string()),
            spacing: Some(8),
            ..TokenPatch::default()
        };

        let merged = patch.apply_to(&base);
        assert_eq!(merged.primary_color, "#000000");
        assert_eq!(merged.spacing, 8);
        assert_eq!(merged.body_font, base.body_font);
        assert_eq!(merged.table_stripes, base.table_stripes);
    }

    #[test]
    fn partial_patch_never_matches() {
        let tokens = PresentationTokens::default();
        let partial = TokenPatch {
            primary_color: Some(tokens.primary_color.clone()),
            ..TokenPatch::default()
        };
        assert!(!partial.matches(&tokens));
        assert!(TokenPatch::from(&tokens).matches(&tokens));
    }

    #[test]
    fn validate_rejects_bad_color_and_blank_font() {
        let bad_color = TokenPatch {
            accent_color: Some("blue".to_string()),
            ..TokenPatch::default()
        };
        assert_eq!(
            bad_color.validate(),
            Err(PresentationError::InvalidColor {
                key: "accent_color",
                value: "blue".to_string(),
            })
        );

        let blank_font = TokenPatch {
            heading_font: Some("   ".to_string()),
            ..TokenPatch::default()
        };
        assert_eq!(
            blank_font.validate(),
            Err(PresentationError::BlankFont {
                key: "heading_font"
            })
        );
    }

    #[test]
    fn override_without_template_is_different() {
        let state = PresentationState::default();
        let mut saved = PresentationOverride::from_state(&state);
        assert!(saved.matches(&state));

        saved.template = None;
        assert!(!saved.matches(&state));
    }

    #[test]
    fn tokens_deserialize_missing_keys_from_defaults() {
        let tokens: PresentationTokens =
            serde_json::from_value(serde_json::json!({ "primary_color": "#123456" }))
                .expect("partial token json should decode");
        assert_eq!(tokens.primary_color, "#123456");
        assert_eq!(tokens.body_font, PresentationTokens::default().body_font);
    }

    #[test]
    fn token_patch_skips_unset_keys_on_the_wire() {
        let patch = TokenPatch {
            table_stripes: Some(false),
            ..TokenPatch::default()
        };
        let json = serde_json::to_value(&patch).expect("patch should encode");
        assert_eq!(json, serde_json::json!({ "table_stripes": false }));
    }

    #[test]
    fn template_id_rejects_blank() {
        assert_eq!(
            TemplateId::new(" ").validate(),
            Err(PresentationError::BlankTemplate)
        );
        assert_eq!(TemplateId::default().as_str(), "classic");
    }
}
