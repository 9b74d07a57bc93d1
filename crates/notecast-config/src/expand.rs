//! Environment variable expansion for string config values.
//!
//! Supported syntax:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses the default

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(ConfigError::EnvVar {
                field: field.to_owned(),
                message: "unterminated ${ reference".to_owned(),
            });
        };
        let reference = &after[..end];
        let (name, default) = match reference.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (reference, None),
        };
        match std::env::var(name) {
            Ok(resolved) => out.push_str(&resolved),
            Err(_) => match default {
                Some(default) => out.push_str(default),
                None => {
                    return Err(ConfigError::EnvVar {
                        field: field.to_owned(),
                        message: format!("${{{name}}} not set"),
                    });
                }
            },
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
