// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Unfolding of comma-joined `Set-Cookie` headers
//!
//! The transport folds repeated `Set-Cookie` headers into one string joined by
//! `", "`. Cookie values themselves may contain a comma inside the
//! `Expires=<day>, <date>` attribute, so the folded string cannot simply be
//! split on commas.

use std::collections::VecDeque;

use lazy_static::lazy_static;
use regex::Regex;

use super::headers;
use super::response::{HeaderField, ResponseHeaders};

lazy_static! {
    /// A fragment ending in `Expires=<weekday>` continues into the next one
    static ref EXPIRES_WEEKDAY_TAIL: Regex =
        Regex::new(r"(?i)(?:^|;)\s*expires\s*=\s*[a-z]{3,9}\s*$").unwrap();
    /// A fragment that opens a new `name=value` pair
    static ref COOKIE_PAIR_START: Regex = Regex::new(r"^\s*[^=;,\s]+\s*=").unwrap();
}

/// Strategy used to unfold a folded `Set-Cookie` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetCookieSplit {
    /// Split on every comma, then rejoin fragments two at a time.
    ///
    /// Assumes every cookie carries exactly one comma (its `Expires` date).
    #[default]
    Pairwise,
    /// Split only where a comma opens a new `name=value` pair outside an
    /// `Expires` date.
    AttributeAware,
}

impl SetCookieSplit {
    /// Unfold `folded` into individual cookie strings
    pub fn split(self, folded: &str) -> Vec<String> {
        match self {
            SetCookieSplit::Pairwise => split_pairwise(folded),
            SetCookieSplit::AttributeAware => split_attribute_aware(folded),
        }
    }
}

/// Split on every comma and rejoin fragments two at a time.
///
/// With an odd fragment count the last fragment has no partner and is
/// emitted on its own. Trailing empty fragments are ignored, so an empty
/// header yields no cookies.
pub fn split_pairwise(folded: &str) -> Vec<String> {
    let mut fragments: VecDeque<&str> = folded.split(',').collect();
    while matches!(fragments.back(), Some(last) if last.trim().is_empty()) {
        fragments.pop_back();
    }

    let mut cookies = Vec::with_capacity(fragments.len() / 2 + 1);
    while let Some(first) = fragments.pop_front() {
        match fragments.pop_front() {
            Some(second) => cookies.push(format!("{},{}", first, second).trim().to_string()),
            None => {
                tracing::debug!(fragment = first, "Set-Cookie fragment has no partner");
                cookies.push(first.trim().to_string());
            }
        }
    }
    cookies
}

/// Split only on commas that start a new cookie.
pub fn split_attribute_aware(folded: &str) -> Vec<String> {
    let mut cookies: Vec<String> = Vec::new();
    for fragment in folded.split(',') {
        let continues = cookies.last().map_or(false, |current| {
            EXPIRES_WEEKDAY_TAIL.is_match(current) || !COOKIE_PAIR_START.is_match(fragment)
        });
        if !continues {
            cookies.push(fragment.to_string());
        } else if let Some(current) = cookies.last_mut() {
            current.push(',');
            current.push_str(fragment);
        }
    }

    cookies
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Replace a folded `set-cookie` entry with its individual cookie strings.
///
/// Headers without `set-cookie`, or whose entry is already a list, are left
/// untouched.
pub fn normalize_set_cookie(response_headers: &mut ResponseHeaders, mode: SetCookieSplit) {
    let folded = match response_headers.get(headers::SET_COOKIE) {
        Some(HeaderField::Single(folded)) => folded.clone(),
        _ => return,
    };
    let cookies = mode.split(&folded);
    tracing::trace!(count = cookies.len(), "Unfolded Set-Cookie header");
    response_headers.set(headers::SET_COOKIE, HeaderField::List(cookies));
}
