//! Field checks shared by the config sections

pub use crate::error::ValidationError;

/// A `[table]` of `config.toml`
pub trait ConfigSection: Default {
    /// Every problem in the section, not just the first
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Takes `other`'s values; later layers win
    fn merge(&mut self, other: Self);

    /// TOML table name, used as the field prefix in errors
    fn section_name(&self) -> &'static str;
}

pub struct Validator;

impl Validator {
    /// Inclusive on both ends
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if (min..=max).contains(&value) {
            return Ok(());
        }
        Err(ValidationError::with_value(
            field,
            format!("must be between {} and {}", min, max),
            value,
        ))
    }

    /// Whitespace counts as empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        match value.trim() {
            "" => Err(ValidationError::new(field, "must not be empty")),
            _ => Ok(()),
        }
    }

    /// `http://` or `https://` followed by a host, no spaces
    pub fn http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        let rest = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"));

        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') && !value.contains(' ') => {
                Ok(())
            }
            _ => Err(ValidationError::with_value(
                field,
                "must be an http:// or https:// URL",
                value,
            )),
        }
    }

    pub fn collect_errors<I>(results: I) -> Result<(), Vec<ValidationError>>
    where
        I: IntoIterator<Item = Result<(), ValidationError>>,
    {
        let errors: Vec<_> = results.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
