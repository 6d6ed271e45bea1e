//! Field path construction.
//!
//! Paths are dot-joined external names. The root path is the empty string.

/// Extend `base` with a field name or map key.
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

/// Address an element by index, `base[i]`. Used only for diagnostics.
pub fn index(base: &str, i: usize) -> String {
    format!("{base}[{i}]")
}

/// Address the elements selected by an array filter, `base.$[label]`.
pub fn positional(base: &str, label: &str) -> String {
    join(base, &format!("$[{label}]"))
}
