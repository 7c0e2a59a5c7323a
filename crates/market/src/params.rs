//! Deal pricing terms and the payment schedule.
//!
//! [`Params`] carries the price terms both peers agreed on. The schedule
//! methods are pure functions of those terms: both sides evaluate them
//! against their own view of funds received and bytes sent, and the protocol
//! only stays in agreement if the two evaluations match.
//!
//! # Escalating checkpoints
//!
//! The provider releases `payment_interval` bytes before the first payment
//! demand; each time a checkpoint elapses the interval grows by
//! `payment_interval_increase`. With interval 100 and increase 50 the
//! checkpoints fall at 100, 250, 450, 700, ...

use serde::{Deserialize, Serialize};
use serde_cbor::Value;
use turnstile_primitives::{PieceAddress, TokenAmount};

use crate::MarketError;

/// Price terms for one retrieval deal.
///
/// Field order is part of the wire contract; see [`Params::schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Params {
    /// Which subset of the payload graph is requested; absent means all of it.
    pub selector: Option<Value>,
    /// Piece to serve the payload from, when the consumer cares.
    pub piece: Option<PieceAddress>,
    /// Price per byte transferred, in atto.
    pub price_per_byte: TokenAmount,
    /// Bytes released before the first payment demand.
    pub payment_interval: u64,
    /// Growth added to the interval each time it elapses.
    pub payment_interval_increase: u64,
    /// Flat fee cleared before any per-byte accounting begins.
    pub unseal_price: TokenAmount,
}

impl Params {
    /// Whole-payload terms with no unseal fee.
    pub fn new_v0(
        price_per_byte: TokenAmount,
        payment_interval: u64,
        payment_interval_increase: u64,
    ) -> Self {
        Self {
            selector: None,
            piece: None,
            price_per_byte,
            payment_interval,
            payment_interval_increase,
            unseal_price: TokenAmount::zero(),
        }
    }

    /// Terms with an explicit selector, optional source piece, and unseal fee.
    pub fn new_v1(
        price_per_byte: TokenAmount,
        payment_interval: u64,
        payment_interval_increase: u64,
        selector: Value,
        piece: Option<PieceAddress>,
        unseal_price: TokenAmount,
    ) -> Self {
        Self {
            selector: Some(selector),
            piece,
            price_per_byte,
            payment_interval,
            payment_interval_increase,
            unseal_price,
        }
    }

    /// Declared schema for the serialized form.
    pub fn schema() -> &'static str {
        r#"
        type Params struct {
            Selector nullable Any
            Piece nullable Bytes
            PricePerByte Bytes
            PaymentInterval Int
            PaymentIntervalIncrease Int
            UnsealPrice Bytes
        }
        "#
    }

    /// True iff a selector is present (not the null marker).
    pub fn selector_specified(&self) -> bool {
        self.selector
            .as_ref()
            .is_some_and(|node| !matches!(node, Value::Null))
    }

    /// Reject terms no honest peer would propose.
    ///
    /// Prices must be non-negative; nil is read as zero everywhere, so it is
    /// accepted here.
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.price_per_byte.is_negative() {
            return Err(MarketError::Schema("negative price per byte".into()));
        }
        if self.unseal_price.is_negative() {
            return Err(MarketError::Schema("negative unseal price".into()));
        }
        Ok(())
    }

    /// The largest payment checkpoint at or below `current_interval`.
    pub fn interval_lower_bound(&self, current_interval: u64) -> u64 {
        let mut interval_size = self.payment_interval;
        let mut lower_bound = 0u64;
        let mut target = 0u64;
        while target <= current_interval {
            lower_bound = target;
            if interval_size == 0 && self.payment_interval_increase == 0 {
                // degenerate schedule, no further checkpoints
                break;
            }
            target = match target.checked_add(interval_size) {
                Some(next) => next,
                None => break,
            };
            interval_size = interval_size.saturating_add(self.payment_interval_increase);
        }
        lower_bound
    }

    /// The first payment checkpoint strictly above `current_interval`: the
    /// next point at which payment will be demanded.
    pub fn next_interval(&self, current_interval: u64) -> u64 {
        let mut interval_size = self.payment_interval;
        let mut next = 0u64;
        while next <= current_interval {
            if interval_size == 0 && self.payment_interval_increase == 0 {
                break;
            }
            next = match next.checked_add(interval_size) {
                Some(n) => n,
                None => return u64::MAX,
            };
            interval_size = interval_size.saturating_add(self.payment_interval_increase);
        }
        next
    }

    /// The amount the consumer must pay right now.
    ///
    /// The unseal fee clears first; while it is short, the whole remainder is
    /// owed and no transfer payment is counted. Once cleared, a free deal
    /// owes nothing, otherwise payment must cover every checkpoint at or
    /// below `bytes_sent`. In finalization it must cover `bytes_sent`
    /// exactly, so the last payment clears to zero instead of the last
    /// checkpoint.
    ///
    /// Never negative; overpayment reads as zero owed.
    pub fn outstanding_balance(
        &self,
        funds_received: &TokenAmount,
        bytes_sent: u64,
        in_finalization: bool,
    ) -> TokenAmount {
        if funds_received < &self.unseal_price {
            return &self.unseal_price - funds_received;
        }

        if self.price_per_byte.nil_or_zero() {
            return TokenAmount::zero();
        }

        let transfer_payment = funds_received - &self.unseal_price;

        let minimum_bytes_to_pay = if in_finalization {
            bytes_sent
        } else {
            self.interval_lower_bound(bytes_sent)
        };

        let required = TokenAmount::from_atto(minimum_bytes_to_pay) * self.price_per_byte.clone();

        let owed = required - transfer_payment;
        if owed.is_negative() {
            return TokenAmount::zero();
        }
        owed
    }

    /// The next checkpoint implied by funds already received.
    ///
    /// Free deals have no interval accounting and return 0. Division
    /// truncates; partial bytes never count as paid.
    pub fn next_interval_from_funds(&self, funds_received: &TokenAmount) -> u64 {
        if self.price_per_byte.nil_or_zero() {
            return 0;
        }

        let mut bytes_paid = funds_received.clone();
        if !self.unseal_price.nil_or_zero() {
            bytes_paid = bytes_paid - self.unseal_price.clone();
        }
        let bytes_paid = bytes_paid / self.price_per_byte.clone();

        self.next_interval(bytes_paid.atto_u64_saturating())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_params() -> Params {
        Params::new_v0(TokenAmount::from_atto(10), 100, 50)
    }

    #[test]
    fn test_interval_lower_bound() {
        let params = test_params();

        // checkpoints at 100, 250, 450, 700
        assert_eq!(params.interval_lower_bound(0), 0);
        assert_eq!(params.interval_lower_bound(99), 0);
        assert_eq!(params.interval_lower_bound(100), 100);
        assert_eq!(params.interval_lower_bound(150), 100);
        assert_eq!(params.interval_lower_bound(249), 100);
        assert_eq!(params.interval_lower_bound(250), 250);
        assert_eq!(params.interval_lower_bound(450), 450);
        assert_eq!(params.interval_lower_bound(699), 450);
    }

    #[test]
    fn test_next_interval() {
        let params = test_params();

        assert_eq!(params.next_interval(0), 100);
        assert_eq!(params.next_interval(99), 100);
        assert_eq!(params.next_interval(100), 250);
        assert_eq!(params.next_interval(249), 250);
        assert_eq!(params.next_interval(250), 450);
        assert_eq!(params.next_interval(450), 700);
    }

    #[test]
    fn test_outstanding_balance_mid_transfer() {
        let params = test_params();

        // at 150 bytes sent the floor is the checkpoint at 100, so 1000 atto
        // is required; 600 received leaves 400 owed
        let owed =
            params.outstanding_balance(&TokenAmount::from_atto(600), 150, false);
        assert_eq!(owed, TokenAmount::from_atto(400));
    }

    #[test]
    fn test_outstanding_balance_finalization() {
        let params = test_params();

        // finalization demands payment to exactly 150 bytes: 1500 required,
        // 600 received, 900 owed
        let owed = params.outstanding_balance(&TokenAmount::from_atto(600), 150, true);
        assert_eq!(owed, TokenAmount::from_atto(900));
    }

    #[test]
    fn test_outstanding_balance_overpaid_is_zero() {
        let params = test_params();

        let owed = params.outstanding_balance(&TokenAmount::from_atto(5000), 150, false);
        assert!(owed.is_zero());
    }

    #[test]
    fn test_unseal_fee_clears_first() {
        let mut params = test_params();
        params.unseal_price = TokenAmount::from_atto(1000);

        // short of the unseal fee: the shortfall is owed, bytes don't count yet
        let owed = params.outstanding_balance(&TokenAmount::from_atto(300), 500, false);
        assert_eq!(owed, TokenAmount::from_atto(700));

        // unseal fee exactly cleared, transfer payment starts from zero
        let owed = params.outstanding_balance(&TokenAmount::from_atto(1000), 150, false);
        assert_eq!(owed, TokenAmount::from_atto(1000));
    }

    #[test]
    fn test_free_deal_owes_nothing() {
        let mut params = Params::new_v0(TokenAmount::zero(), 100, 50);
        assert!(params
            .outstanding_balance(&TokenAmount::zero(), 10_000, false)
            .is_zero());

        // nil price behaves exactly like zero
        params.price_per_byte = TokenAmount::nil();
        assert!(params
            .outstanding_balance(&TokenAmount::zero(), 10_000, true)
            .is_zero());
    }

    #[test]
    fn test_next_interval_from_funds() {
        let params = test_params();

        // 1000 atto at 10 per byte pays for 100 bytes; next checkpoint is 250
        assert_eq!(
            params.next_interval_from_funds(&TokenAmount::from_atto(1000)),
            250
        );

        // partial bytes truncate: 995 atto still only pays 99 bytes
        assert_eq!(
            params.next_interval_from_funds(&TokenAmount::from_atto(995)),
            100
        );

        // free deals have no interval accounting
        let free = Params::new_v0(TokenAmount::zero(), 100, 50);
        assert_eq!(free.next_interval_from_funds(&TokenAmount::from_atto(1000)), 0);
        let nil = Params::new_v0(TokenAmount::nil(), 100, 50);
        assert_eq!(nil.next_interval_from_funds(&TokenAmount::from_atto(1000)), 0);
    }

    #[test]
    fn test_next_interval_from_funds_under_unseal_fee() {
        let mut params = test_params();
        params.unseal_price = TokenAmount::from_atto(1000);

        // funds below the unseal fee leave zero bytes paid, not a negative count
        assert_eq!(
            params.next_interval_from_funds(&TokenAmount::from_atto(300)),
            100
        );
    }

    #[test]
    fn test_degenerate_schedule_terminates() {
        let params = Params::new_v0(TokenAmount::from_atto(10), 0, 0);
        assert_eq!(params.interval_lower_bound(1_000_000), 0);
        assert_eq!(params.next_interval(1_000_000), 0);

        // zero initial interval with growth still escalates: 0, 50, 150, ...
        let params = Params::new_v0(TokenAmount::from_atto(10), 0, 50);
        assert_eq!(params.next_interval(0), 50);
        assert_eq!(params.next_interval(50), 150);
    }

    #[test]
    fn test_selector_specified() {
        let mut params = test_params();
        assert!(!params.selector_specified());

        params.selector = Some(Value::Null);
        assert!(!params.selector_specified());

        params.selector = Some(Value::Text("all".into()));
        assert!(params.selector_specified());
    }

    #[test]
    fn test_validate_rejects_negative_prices() {
        let mut params = test_params();
        params.price_per_byte = -TokenAmount::from_atto(1);
        assert!(params.validate().is_err());

        let mut params = test_params();
        params.unseal_price = -TokenAmount::from_atto(1);
        assert!(params.validate().is_err());

        assert!(test_params().validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_bounds_monotonic(
            interval in 1u64..1_000,
            increase in 0u64..1_000,
            a in 0u64..10_000,
            b in 0u64..10_000,
        ) {
            let params = Params::new_v0(TokenAmount::from_atto(1), interval, increase);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(params.interval_lower_bound(lo) <= params.interval_lower_bound(hi));
            prop_assert!(params.next_interval(lo) <= params.next_interval(hi));
            prop_assert!(params.next_interval(hi) > hi);
            prop_assert!(params.interval_lower_bound(lo) <= lo);
        }

        #[test]
        fn prop_outstanding_balance_never_negative(
            funds in 0u64..1_000_000,
            sent in 0u64..100_000,
            finalizing in any::<bool>(),
        ) {
            let mut params = test_params();
            params.unseal_price = TokenAmount::from_atto(500);
            let owed = params.outstanding_balance(&TokenAmount::from_atto(funds), sent, finalizing);
            prop_assert!(!owed.is_negative());
        }

        #[test]
        fn prop_owed_zero_iff_paid_to_floor(
            funds in 0u64..100_000,
            sent in 0u64..5_000,
        ) {
            let params = test_params();
            let owed = params.outstanding_balance(&TokenAmount::from_atto(funds), sent, false);
            let floor_payment = params.interval_lower_bound(sent) * 10;
            prop_assert_eq!(owed.is_zero(), funds >= floor_payment);

            let owed = params.outstanding_balance(&TokenAmount::from_atto(funds), sent, true);
            prop_assert_eq!(owed.is_zero(), funds >= sent * 10);
        }
    }
}
