//! Phase-B termination rules.

use serde::{Deserialize, Serialize};

use crate::config::CompletionRule;

/// Everything the completion rules look at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub rfb_available: u32,
    pub lfb_available: u32,
    /// Board pieces of each type not flagged as part of a W.
    pub unpaired_rfb: usize,
    pub unpaired_lfb: usize,
    pub fits_rfb: bool,
    pub fits_lfb: bool,
    pub formations: usize,
}

impl BoardSummary {
    pub fn has_unpaired(&self) -> bool {
        self.unpaired_rfb > 0 || self.unpaired_lfb > 0
    }

    /// Nothing left dangling and at least one W standing.
    pub fn is_resolved(&self) -> bool {
        !self.has_unpaired() && self.formations > 0
    }
}

/// `Some(resolved)` once Phase B is over.
pub fn evaluate(rule: CompletionRule, summary: &BoardSummary) -> Option<bool> {
    let over = match rule {
        CompletionRule::Strict => strict(summary),
        CompletionRule::Permissive => permissive(summary),
    };
    over.then(|| summary.is_resolved())
}

/// Everything spent and paired, or one type has nothing left that could still pair.
fn strict(s: &BoardSummary) -> bool {
    let spent = s.rfb_available == 0 && s.lfb_available == 0 && !s.has_unpaired();
    let no_partner = |available: u32, unpaired: usize| available == 0 && unpaired == 0;
    spent || no_partner(s.rfb_available, s.unpaired_rfb) || no_partner(s.lfb_available, s.unpaired_lfb)
}

/// One type exhausted and the other either exhausted too, or unable to land anywhere.
fn permissive(s: &BoardSummary) -> bool {
    let side_done = |available: u32, unpaired: usize, other_available: u32, other_unpaired: usize, other_fits: bool| {
        if available != 0 {
            return false;
        }
        if unpaired == 0 {
            return true;
        }
        (other_available == 0 && other_unpaired == 0) || (other_available > 0 && !other_fits)
    };
    side_done(s.lfb_available, s.unpaired_lfb, s.rfb_available, s.unpaired_rfb, s.fits_rfb)
        || side_done(s.rfb_available, s.unpaired_rfb, s.lfb_available, s.unpaired_lfb, s.fits_lfb)
}
