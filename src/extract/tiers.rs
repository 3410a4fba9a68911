//! Extraction tiers expressed as data.
//!
//! Each supported page layout is a [`TierSpec`] row in one static table, and
//! the engine in the parent module walks that table in order. Adding or
//! reordering a layout is a data edit, not a new code path.

use once_cell::sync::Lazy;
use scraper::Selector;

/// How duplicate room labels within one tier combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep the lowest price seen for a label. Used for the structured table,
    /// where one room type appears per fare (refundable, non-refundable).
    MinPrice,
    /// Later entries replace earlier ones. Acceptable for fallback tiers,
    /// which are low fidelity to begin with.
    LastWins,
}

/// One extraction strategy over a page layout, as plain selector data.
pub struct TierSpec {
    /// Short name used in diagnostics.
    pub label: &'static str,
    /// Selector matching each bookable row or card.
    pub rows: &'static str,
    /// Name-element candidates, tried in order within a row.
    pub names: &'static [&'static str],
    /// Price-element candidates, tried in order within a row.
    pub prices: &'static [&'static str],
    /// Label to use when no name element matches. `None` means a nameless
    /// row is dropped.
    pub default_name: Option<&'static str>,
    /// Whether the decimal point survives price cleaning. The fallback tier
    /// keeps digits only, so prices there truncate to whole units.
    pub keep_decimal: bool,
    /// Duplicate-label policy for this tier.
    pub merge: MergePolicy,
}

/// A [`TierSpec`] with its selectors compiled.
pub struct Tier {
    pub label: &'static str,
    pub rows: Selector,
    pub names: Vec<Selector>,
    pub prices: Vec<Selector>,
    pub default_name: Option<&'static str>,
    pub keep_decimal: bool,
    pub merge: MergePolicy,
}

impl Tier {
    fn compile(spec: &TierSpec) -> Tier {
        let parse = |s: &str| Selector::parse(s).unwrap();
        Tier {
            label: spec.label,
            rows: parse(spec.rows),
            names: spec.names.iter().map(|s| parse(s)).collect(),
            prices: spec.prices.iter().map(|s| parse(s)).collect(),
            default_name: spec.default_name,
            keep_decimal: spec.keep_decimal,
            merge: spec.merge,
        }
    }
}

/// Tier table for booking pages, in fallback order.
///
/// Tier 1 is the desktop room-rate table, which lists every category. Tier 2
/// is the card layout served on redirects to a search-results view; it only
/// ever shows a headline offer, hence the "Standard Offer" default label.
const BOOKING_TIERS: &[TierSpec] = &[
    TierSpec {
        label: "room-table",
        rows: "tr.js-hprt-table-row",
        names: &[".hprt-roomtype-icon-link", ".hprt-roomtype-link"],
        prices: &[
            ".bui-price-display__value",
            ".prco-valign-middle-helper",
            "span[data-testid=\"price-and-discounted-price\"]",
        ],
        default_name: None,
        keep_decimal: true,
        merge: MergePolicy::MinPrice,
    },
    TierSpec {
        label: "offer-cards",
        rows: "[data-testid=\"property-card\"]",
        names: &["[data-testid=\"title\"]"],
        prices: &["[data-testid=\"price-and-discounted-price\"]"],
        default_name: Some("Standard Offer"),
        keep_decimal: false,
        merge: MergePolicy::LastWins,
    },
];

/// Compiled tiers, built once on first use.
pub static TIERS: Lazy<Vec<Tier>> = Lazy::new(|| BOOKING_TIERS.iter().map(Tier::compile).collect());
