//! Name normalization and legalization
//!
//! GraphQL names must match `[_A-Za-z][_0-9A-Za-z]*`. Property keys that do not
//! are renamed deterministically; the same key set always yields the same
//! names, which is what lets the runtime map a legal name back to its key.

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use std::collections::HashSet;

/// Whether `name` can be used verbatim as a GraphQL field name
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Legalize `name`, then append `2`, `3`, … until it is not in `used`
///
/// The returned name is added to `used`. Callers seed `used` with every
/// original key of the object so a renamed key never shadows a legal sibling.
pub fn make_unique_valid_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = legalize(name);

    let mut candidate = base.clone();
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{}{}", base, suffix);
        suffix += 1;
    }

    used.insert(candidate.clone());
    candidate
}

fn legalize(name: &str) -> String {
    let camel: String = name
        .to_lower_camel_case()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    match camel.chars().next() {
        None => "_".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{}", camel),
        Some(_) => camel,
    }
}

/// `My.Type/#bar` -> `MyTypeBar`
pub fn normalize_type_name(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Turn an operation id into a root field name
///
/// Lower camel case, with a leading `get` dropped when a letter follows it:
/// `getPetById` -> `petById`.
pub fn normalize_operation_id(operation_id: &str) -> String {
    let camel = operation_id.to_lower_camel_case();

    if let Some(rest) = camel.strip_prefix("get") {
        let mut chars = rest.chars();
        if let Some(next) = chars.next().filter(|c| c.is_alphabetic()) {
            return next.to_lowercase().chain(chars).collect();
        }
    }

    camel
}

/// GraphQL argument name for a parameter name (`x-foo` -> `xFoo`)
pub fn argument_name(parameter_name: &str) -> String {
    let camel = parameter_name.to_lower_camel_case();
    if is_valid_name(&camel) {
        camel
    } else {
        legalize(parameter_name)
    }
}
