//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for settings that are accepted but
//! probably unintended.

use std::fmt;

use crate::{Config, LANGUAGE_PLACEHOLDER};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// A decay above 1 weights fallback languages above the primary one.
    DecayAboveOne {
        /// Field or template name.
        field: String,
        /// Configured decay.
        decay: f64,
    },
    /// A boost or decay is negative.
    NegativeWeight {
        /// Section the weight was found in (`boost` or `decay`).
        section: &'static str,
        /// Field or template name.
        field: String,
        /// Configured value.
        value: f64,
    },
    /// A weight is configured for a field that is not in the roster.
    UnknownField {
        /// Section the weight was found in (`boost` or `decay`).
        section: &'static str,
        /// Field or template name.
        field: String,
    },
    /// A stemmed field maps to a plain variant that is not in the roster.
    MissingPlainVariant {
        /// Stemmed field.
        field: String,
        /// Declared plain counterpart.
        plain: String,
    },
    /// The language fallback chain is empty, so language-aware fields are never queried.
    EmptyFallbackChain,
    /// A custom match profile declares no fields and fails when used.
    ProfileWithoutFields {
        /// Profile name.
        profile: String,
    },
    /// A language-aware template does not contain the language placeholder.
    TemplateWithoutPlaceholder {
        /// Template name.
        template: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecayAboveOne { field, decay } => {
                write!(
                    f,
                    "decay for '{field}' is {decay}, which favors fallback languages over the primary one"
                )
            }
            Self::NegativeWeight {
                section,
                field,
                value,
            } => {
                write!(f, "{section} for '{field}' is negative: {value}")
            }
            Self::UnknownField { section, field } => {
                write!(f, "{section} configured for unknown field '{field}'")
            }
            Self::MissingPlainVariant { field, plain } => {
                write!(
                    f,
                    "plain variant '{plain}' of field '{field}' is not in the field roster"
                )
            }
            Self::EmptyFallbackChain => {
                write!(f, "no search languages are configured")
            }
            Self::ProfileWithoutFields { profile } => {
                write!(f, "custom match profile '{profile}' declares no fields")
            }
            Self::TemplateWithoutPlaceholder { template } => {
                write!(
                    f,
                    "field template '{template}' does not contain {LANGUAGE_PLACEHOLDER}"
                )
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.search.languages.is_empty() {
        warnings.push(ConfigWarning::EmptyFallbackChain);
    }

    for template in config
        .fields
        .stemmed_templates
        .iter()
        .chain(&config.fields.plain_templates)
    {
        if !template.contains(LANGUAGE_PLACEHOLDER) {
            warnings.push(ConfigWarning::TemplateWithoutPlaceholder {
                template: template.clone(),
            });
        }
    }

    for (field, plain) in &config.fields.plain_variants {
        if !config.fields.contains(plain) {
            warnings.push(ConfigWarning::MissingPlainVariant {
                field: field.clone(),
                plain: plain.clone(),
            });
        }
    }

    warnings.extend(validate_weights(config, "boost", config.boost.iter()));
    warnings.extend(validate_weights(config, "decay", config.decay.iter()));

    for (field, &decay) in &config.decay {
        if decay > 1.0 {
            warnings.push(ConfigWarning::DecayAboveOne {
                field: field.clone(),
                decay,
            });
        }
    }

    for (name, profile) in &config.custom_match {
        if profile.fields.is_none() {
            warnings.push(ConfigWarning::ProfileWithoutFields {
                profile: name.clone(),
            });
        }
    }

    warnings
}

/// Checks one weight section for unknown fields and negative values.
fn validate_weights<'a>(
    config: &Config,
    section: &'static str,
    weights: impl Iterator<Item = (&'a String, &'a f64)>,
) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    for (field, &value) in weights {
        if !config.fields.contains(field) {
            warnings.push(ConfigWarning::UnknownField {
                section,
                field: field.clone(),
            });
        }
        if value < 0.0 {
            warnings.push(ConfigWarning::NegativeWeight {
                section,
                field: field.clone(),
                value,
            });
        }
    }
    warnings
}
