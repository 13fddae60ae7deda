//! Name and code ordering for sibling categories
//!
//! Approximates the default browser collation for the Latin names used in
//! the chart of accounts: case and common accents are ignored at the primary
//! level, whitespace and punctuation sort before digits, digits before letters.
//! Accent differences break ties next, then lowercase goes before uppercase,
//! and finally code points are compared.

use std::cmp::Ordering;

fn fold_accent(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

fn primary_key(s: &str) -> Vec<(u8, char)> {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .map(|c| {
            let class = if c.is_alphabetic() {
                2
            } else if c.is_numeric() {
                1
            } else {
                0
            };
            (class, c)
        })
        .collect()
}

fn accent_key(s: &str) -> String {
    s.to_lowercase()
}

fn case_key(s: &str) -> Vec<bool> {
    s.chars().map(char::is_uppercase).collect()
}

/// Compare two category names
pub fn compare_names(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
        .then_with(|| a.cmp(b))
}

/// Compare dotted account codes segment by segment; absent codes sort last
pub fn compare_codes(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let mut left = a.split('.');
            let mut right = b.split('.');
            loop {
                match (left.next(), right.next()) {
                    (None, None) => return Ordering::Equal,
                    (None, Some(_)) => return Ordering::Less,
                    (Some(_), None) => return Ordering::Greater,
                    (Some(l), Some(r)) => {
                        let ord = match (l.trim().parse::<u64>(), r.trim().parse::<u64>()) {
                            (Ok(l), Ok(r)) => l.cmp(&r),
                            _ => compare_names(l, r),
                        };
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                }
            }
        }
    }
}
