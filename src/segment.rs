//! Segment classification from recency and frequency scores
//!
//! The classifier is an ordered table of digit-range patterns over the
//! (recency, frequency) score pair; the first matching row wins. The table
//! covers all 25 valid score pairs, so `classify` only fails if the table is
//! edited into an incomplete state.

use std::fmt;

use crate::error::RfmError;

/// Behavioral segment derived from the recency and frequency scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Hibernating,
    AtRisk,
    CantLoose,
    AboutToSleep,
    NeedAttention,
    LoyalCustomers,
    Promising,
    NewCustomers,
    PotentialLoyalists,
    Champions,
}

impl Segment {
    /// Every segment, in classifier table order.
    pub const ALL: [Segment; 10] = [
        Segment::Hibernating,
        Segment::AtRisk,
        Segment::CantLoose,
        Segment::AboutToSleep,
        Segment::NeedAttention,
        Segment::LoyalCustomers,
        Segment::Promising,
        Segment::NewCustomers,
        Segment::PotentialLoyalists,
        Segment::Champions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Hibernating => "hibernating",
            Segment::AtRisk => "at_risk",
            Segment::CantLoose => "cant_loose",
            Segment::AboutToSleep => "about_to_sleep",
            Segment::NeedAttention => "need_attention",
            Segment::LoyalCustomers => "loyal_customers",
            Segment::Promising => "promising",
            Segment::NewCustomers => "new_customers",
            Segment::PotentialLoyalists => "potential_loyalists",
            Segment::Champions => "champions",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ordered pattern table: inclusive digit ranges for the recency and
/// frequency scores. Order matters; earlier rows shadow later ones.
const SEGMENT_TABLE: [((u8, u8), (u8, u8), Segment); 10] = [
    ((1, 2), (1, 2), Segment::Hibernating),
    ((1, 2), (3, 4), Segment::AtRisk),
    ((1, 2), (5, 5), Segment::CantLoose),
    ((3, 3), (1, 2), Segment::AboutToSleep),
    ((3, 3), (3, 3), Segment::NeedAttention),
    ((3, 4), (4, 5), Segment::LoyalCustomers),
    ((4, 4), (1, 1), Segment::Promising),
    ((5, 5), (1, 1), Segment::NewCustomers),
    ((4, 5), (2, 3), Segment::PotentialLoyalists),
    ((5, 5), (4, 5), Segment::Champions),
];

/// Map a (recency, frequency) score pair to its segment, first match wins.
pub fn classify(recency_score: u8, frequency_score: u8) -> crate::Result<Segment> {
    for &((r_lo, r_hi), (f_lo, f_hi), segment) in &SEGMENT_TABLE {
        if (r_lo..=r_hi).contains(&recency_score) && (f_lo..=f_hi).contains(&frequency_score) {
            return Ok(segment);
        }
    }
    Err(RfmError::NoMatchingSegment {
        code: format!("{recency_score}{frequency_score}"),
    })
}

/// Classify a two-character RF code such as `"51"`.
pub fn classify_code(code: &str) -> crate::Result<Segment> {
    let unmatched = || RfmError::NoMatchingSegment {
        code: code.to_string(),
    };

    let mut digits = code.chars();
    let recency = digits.next().and_then(|c| c.to_digit(10)).ok_or_else(unmatched)?;
    let frequency = digits.next().and_then(|c| c.to_digit(10)).ok_or_else(unmatched)?;
    if digits.next().is_some() {
        return Err(unmatched());
    }
    classify(recency as u8, frequency as u8)
}
