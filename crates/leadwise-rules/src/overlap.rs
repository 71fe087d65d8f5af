// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coarse "did we already say this" check.

/// Characters of each reply compared against the other.
pub const PREFIX_CHARS: usize = 40;

fn prefix(text: &str) -> String {
    text.chars().take(PREFIX_CHARS).collect()
}

/// True when either text contains the other's leading characters,
/// ignoring case. Blank text never overlaps.
pub fn overlaps(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    b.contains(&prefix(&a)) || a.contains(&prefix(&b))
}
