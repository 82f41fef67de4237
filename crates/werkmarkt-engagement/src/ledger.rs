//! Revision ledger
//!
//! A pure counter co-located with the engagement. `revisions_used` only
//! moves inside the `request_revision` transition; nothing else may touch
//! it.

use werkmarkt_types::Engagement;

/// Whether the client may send the current delivery back for rework.
pub fn can_request_revision(engagement: &Engagement) -> bool {
    engagement
        .revisions_allowed
        .allows_another(engagement.revisions_used)
}
