//! Tiered room-inventory extraction from booking page markup.
//!
//! Booking pages are served in more than one layout depending on device
//! class and whether the request was redirected to a search-results view.
//! Extraction walks the tier table in [`tiers`] in order and returns the
//! first tier that yields any entries, so a partial read of the high-fidelity
//! table still wins over the fallback cards.
//!
//! The extractor never fails: malformed markup, missing elements, and
//! unparseable price text all degrade to skipped rows or an empty inventory,
//! with the cause reported through tracing only.

pub mod tiers;

use crate::models::RoomInventory;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use tiers::{MergePolicy, TIERS, Tier};

/// Everything that is not part of a price number.
static PRICE_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").unwrap());

/// Extract a room-type → lowest-price inventory from one property page.
///
/// Tiers are attempted in fallback order; the first tier producing at least
/// one entry short-circuits the rest. Empty or non-HTML input parses to a
/// document matching no selectors and yields an empty inventory, the same
/// result as a sold-out or blocked page.
pub fn extract(markup: &str) -> RoomInventory {
    let document = Html::parse_document(markup);
    for tier in TIERS.iter() {
        let inventory = scan_tier(&document, tier);
        if !inventory.is_empty() {
            debug!(tier = tier.label, rooms = inventory.len(), "Tier matched");
            return inventory;
        }
        debug!(tier = tier.label, "Tier yielded no entries; falling through");
    }
    RoomInventory::new()
}

/// Run one tier's selectors over the document.
fn scan_tier(document: &Html, tier: &Tier) -> RoomInventory {
    let mut inventory = RoomInventory::new();

    for row in document.select(&tier.rows) {
        let Some(price_elem) = first_match(&row, &tier.prices) else {
            debug!(tier = tier.label, "Row has no price element; skipping");
            continue;
        };

        let name = match first_match(&row, &tier.names) {
            // The name must come from a different element than the price;
            // a shared element means the selectors collapsed onto the same
            // node and the row cannot be trusted.
            Some(name_elem) if name_elem.id() != price_elem.id() => {
                normalize_label(&element_text(&name_elem))
            }
            Some(_) => {
                debug!(tier = tier.label, "Name and price selectors hit the same element; skipping row");
                continue;
            }
            None => match tier.default_name {
                Some(label) => label.to_string(),
                None => continue,
            },
        };

        let raw_price = element_text(&price_elem);
        let Some(price) = clean_price(&raw_price, tier.keep_decimal) else {
            debug!(tier = tier.label, room = %name, text = %raw_price, "Price text has no digits; skipping row");
            continue;
        };

        match tier.merge {
            MergePolicy::MinPrice => {
                inventory
                    .entry(name)
                    .and_modify(|existing| {
                        if price < *existing {
                            *existing = price;
                        }
                    })
                    .or_insert(price);
            }
            MergePolicy::LastWins => {
                inventory.insert(name, price);
            }
        }
    }

    inventory
}

/// First element inside `row` matching any of the candidate selectors,
/// candidates tried in order.
fn first_match<'a>(row: &ElementRef<'a>, candidates: &[Selector]) -> Option<ElementRef<'a>> {
    candidates.iter().find_map(|sel| row.select(sel).next())
}

/// Concatenated text content of an element.
fn element_text(elem: &ElementRef) -> String {
    elem.text().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace runs to single spaces and trim.
fn normalize_label(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce price text to a number.
///
/// Currency symbols, thousands separators, and surrounding text are stripped.
/// Returns `None` when nothing numeric remains ("Sold Out") or the residue
/// doesn't parse (two decimal points from a stray separator); callers drop
/// the row in either case.
fn clean_price(raw: &str, keep_decimal: bool) -> Option<f64> {
    let mut cleaned = PRICE_JUNK.replace_all(raw, "").into_owned();
    if !keep_decimal {
        cleaned.retain(|c| c != '.');
    }
    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}
