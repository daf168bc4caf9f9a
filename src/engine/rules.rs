//! Amendment gating.
//!
//! The active amendment set travels by value in the apply context;
//! engines never consult process-global state, so every gated path is
//! reachable from tests by toggling a bit.

use strum_macros::{Display, EnumIter};

/// Amendment flags consumed by the validators and apply engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Amendment {
    /// Strict flag masks on the escrow and payment channel families.
    Fix1543,
    /// Stricter escrow time comparisons.
    Fix1571,
    /// Credential entries and credential-based preauthorization.
    Credentials,
    /// DepositAuth flag semantics on AccountRoot.
    DepositAuth,
    /// The payment channel family.
    PayChan,
    /// Reserved; not implemented by this core.
    TokenEscrow,
}

/// The active amendment set, as a small copied bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rules {
    bits: u32,
}

impl Rules {
    pub const fn new() -> Self {
        Rules { bits: 0 }
    }

    /// All amendments this core knows about.
    pub const fn all() -> Self {
        Rules {
            bits: (1 << Amendment::Fix1543 as u32)
                | (1 << Amendment::Fix1571 as u32)
                | (1 << Amendment::Credentials as u32)
                | (1 << Amendment::DepositAuth as u32)
                | (1 << Amendment::PayChan as u32)
                | (1 << Amendment::TokenEscrow as u32),
        }
    }

    pub const fn with(self, amendment: Amendment) -> Self {
        Rules {
            bits: self.bits | 1 << amendment as u32,
        }
    }

    pub const fn without(self, amendment: Amendment) -> Self {
        Rules {
            bits: self.bits & !(1 << amendment as u32),
        }
    }

    pub const fn enabled(&self, amendment: Amendment) -> bool {
        self.bits & 1 << amendment as u32 != 0
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_toggling() {
        let rules = Rules::new().with(Amendment::Fix1571);

        assert!(rules.enabled(Amendment::Fix1571));
        assert!(!rules.enabled(Amendment::DepositAuth));
        assert!(!rules.without(Amendment::Fix1571).enabled(Amendment::Fix1571));
    }

    #[test]
    fn test_all_covers_every_amendment() {
        for amendment in Amendment::iter() {
            assert!(Rules::all().enabled(amendment), "{amendment}");
        }
    }
}
