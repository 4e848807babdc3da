//! Count-aware description templates.
//!
//! | marker   | one        | many       |
//! |----------|------------|------------|
//! | `[n]`    | `1`        | the count  |
//! | `[s]`    | (empty)    | `s`        |
//! | `[S]`    | `s`        | (empty)    |
//! | `[is]`   | `is`       | `are`      |
//! | `[has]`  | `has`      | `have`     |
//! | `[does]` | `does`     | `do`       |

const MARKERS: [&str; 6] = ["[n]", "[s]", "[S]", "[is]", "[has]", "[does]"];

pub fn has_markers(template: &str) -> bool {
    MARKERS.iter().any(|m| template.contains(m))
}

/// Substitutes every marker for a group of `n` objects.
pub fn expand(
    template: &str,
    n: usize,
) -> String {
    let one = n == 1;
    template
        .replace("[n]", &n.to_string())
        .replace("[s]", if one { "" } else { "s" })
        .replace("[S]", if one { "s" } else { "" })
        .replace("[is]", if one { "is" } else { "are" })
        .replace("[has]", if one { "has" } else { "have" })
        .replace("[does]", if one { "does" } else { "do" })
}

/// Description of a group: the expanded template, or `key (n)` when the
/// key carries no markers.
pub fn describe(
    key: &str,
    n: usize,
) -> String {
    if has_markers(key) {
        expand(key, n)
    }
    else {
        format!("{} ({})", key, n)
    }
}
