//! Loose version ordering
//!
//! Pins in manifests are not semver: `0.9.9.8`, `18311`, `20200203` and
//! `1.8.5-rc1` all appear. Versions are compared component-wise after
//! splitting on `.`, `-`, `+` and `_`.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Component<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn components(version: &str) -> Vec<Component<'_>> {
    version
        .split(['.', '-', '+', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part.chars().all(|c| c.is_ascii_digit()) {
                Component::Number(part.trim_start_matches('0'))
            } else {
                Component::Text(part)
            }
        })
        .collect()
}

fn compare_component(a: &Component<'_>, b: &Component<'_>) -> Ordering {
    match (a, b) {
        // Leading zeros are stripped, so length first then lexical is numeric order.
        (Component::Number(x), Component::Number(y)) => {
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (Component::Number(_), Component::Text(_)) => Ordering::Less,
        (Component::Text(_), Component::Number(_)) => Ordering::Greater,
        (Component::Text(x), Component::Text(y)) => x.cmp(y),
    }
}

/// Order two versions; `None` when either is a range
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    if is_range(a) || is_range(b) {
        return None;
    }
    let (left, right) = (components(a), components(b));
    for (x, y) in left.iter().zip(right.iter()) {
        let ordering = compare_component(x, y);
        if ordering != Ordering::Equal {
            return Some(ordering);
        }
    }
    Some(left.len().cmp(&right.len()))
}

fn is_range(version: &str) -> bool {
    version.starts_with('[')
}
