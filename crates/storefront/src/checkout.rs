//! The checkout state machine.
//!
//! Checkout is a three-step wizard - shipping info, payment method, review -
//! modelled as an explicit tagged-union state with a single transition
//! function. Every guard lives in [`CheckoutDraft::apply`]; route handlers
//! only translate HTTP into [`CheckoutEvent`]s, so the reachable states can
//! be tested exhaustively without a server.
//!
//! Guarantees:
//! - `Review` is unreachable until the shipping form has passed full-field
//!   validation *and* a payment method is selected, whatever order of
//!   forward/backward moves got us here.
//! - Backward moves are always allowed and never discard entered data.
//! - A failed transition leaves the draft exactly where it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use orchard_core::{Email, PaymentMethodId};

use crate::models::ShippingAddress;
use crate::models::session::keys;

/// Per-field validation messages, keyed by form field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Where the customer is in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Info,
    Payment,
    Review,
}

/// Errors from a rejected transition or submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The shipping form failed validation; the draft stays on `Info`.
    #[error("please correct the highlighted fields")]
    Invalid(FieldErrors),

    /// The event does not apply to the current step (e.g. selecting a
    /// payment method while still on the info step).
    #[error("that action is not available on the {0:?} step")]
    WrongStep(CheckoutStep),

    /// Tried to leave the payment step without choosing a payment method.
    #[error("select a payment method to continue")]
    NoPaymentMethod,

    /// Checkout cannot run against an empty cart.
    #[error("your cart is empty")]
    EmptyCart,

    /// Submission was requested before the review step.
    #[error("review your order before submitting")]
    NotReady,
}

/// The raw shipping form as posted by the client. All fields required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingForm {
    /// Validate every field, collecting all failures rather than stopping at
    /// the first so the client can highlight the whole form at once.
    ///
    /// # Errors
    ///
    /// Returns the per-field error map if any field is missing or malformed.
    pub fn validate(&self) -> Result<ShippingAddress, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.insert("email", e.to_string());
                None
            }
        };

        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
            ("phone", &self.phone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.insert(field, "this field is required".to_owned());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let Some(email) = email else {
            // Unreachable: a failed email parse populated `errors` above
            return Err(errors);
        };

        Ok(ShippingAddress {
            email,
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            country: self.country.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
        })
    }
}

/// The in-progress, not-yet-submitted checkout state.
///
/// Validated data is kept even when the customer steps backward, so a round
/// trip through earlier steps loses nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutDraft {
    step: CheckoutStep,
    shipping: Option<ShippingAddress>,
    payment_method_id: Option<PaymentMethodId>,
}

/// Everything that can happen to a draft.
#[derive(Debug, Clone)]
pub enum CheckoutEvent {
    /// Submit the shipping form (Info → Payment on success).
    SubmitInfo(ShippingForm),
    /// Choose a payment method (Payment → Review).
    SelectPayment(PaymentMethodId),
    /// Step backward one screen; always allowed, always lossless.
    Back,
}

impl Default for CheckoutDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutDraft {
    /// A blank draft at the info step.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: CheckoutStep::Info,
            shipping: None,
            payment_method_id: None,
        }
    }

    /// Current wizard step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Shipping info, if the info step has been passed.
    #[must_use]
    pub const fn shipping(&self) -> Option<&ShippingAddress> {
        self.shipping.as_ref()
    }

    /// Selected payment method, if any.
    #[must_use]
    pub const fn payment_method_id(&self) -> Option<PaymentMethodId> {
        self.payment_method_id
    }

    /// The single transition function.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] and leaves the draft untouched if the event
    /// is rejected.
    pub fn apply(&mut self, event: CheckoutEvent) -> Result<(), CheckoutError> {
        match (self.step, event) {
            (CheckoutStep::Info, CheckoutEvent::SubmitInfo(form)) => {
                let shipping = form.validate().map_err(CheckoutError::Invalid)?;
                self.shipping = Some(shipping);
                self.step = CheckoutStep::Payment;
                Ok(())
            }
            (CheckoutStep::Payment, CheckoutEvent::SelectPayment(id)) => {
                self.payment_method_id = Some(id);
                self.step = CheckoutStep::Review;
                Ok(())
            }
            // Re-submitting an earlier form from a later step is fine; it
            // re-validates and returns the customer to the following screen.
            (CheckoutStep::Payment | CheckoutStep::Review, CheckoutEvent::SubmitInfo(form)) => {
                let shipping = form.validate().map_err(CheckoutError::Invalid)?;
                self.shipping = Some(shipping);
                self.step = CheckoutStep::Payment;
                Ok(())
            }
            (CheckoutStep::Review, CheckoutEvent::SelectPayment(id)) => {
                self.payment_method_id = Some(id);
                Ok(())
            }
            (CheckoutStep::Info, CheckoutEvent::SelectPayment(_)) => {
                Err(CheckoutError::WrongStep(CheckoutStep::Info))
            }
            (CheckoutStep::Info, CheckoutEvent::Back) => Ok(()),
            (CheckoutStep::Payment, CheckoutEvent::Back) => {
                self.step = CheckoutStep::Info;
                Ok(())
            }
            (CheckoutStep::Review, CheckoutEvent::Back) => {
                self.step = CheckoutStep::Payment;
                Ok(())
            }
        }
    }

    /// Check the draft is submittable and hand back what the order manager
    /// needs. The draft itself is not consumed; it is discarded by the caller
    /// only after the order commits.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotReady`] before the review step and
    /// [`CheckoutError::NoPaymentMethod`] if the invariant somehow broke.
    pub fn ready_for_submit(&self) -> Result<(&ShippingAddress, PaymentMethodId), CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::NotReady);
        }
        let shipping = self.shipping.as_ref().ok_or(CheckoutError::NotReady)?;
        let payment = self
            .payment_method_id
            .ok_or(CheckoutError::NoPaymentMethod)?;
        Ok((shipping, payment))
    }
}

// =============================================================================
// Session persistence
// =============================================================================

/// Load the draft, starting a fresh one if the session has none.
///
/// # Errors
///
/// Returns the session store's error if the read fails.
pub async fn load(session: &Session) -> Result<CheckoutDraft, tower_sessions::session::Error> {
    Ok(session
        .get::<CheckoutDraft>(keys::CHECKOUT_DRAFT)
        .await?
        .unwrap_or_default())
}

/// Save the draft back to the session.
///
/// # Errors
///
/// Returns the session store's error if the write fails.
pub async fn save(
    session: &Session,
    draft: &CheckoutDraft,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CHECKOUT_DRAFT, draft).await
}

/// Drop the draft, e.g. after a completed order.
///
/// # Errors
///
/// Returns the session store's error if the write fails.
pub async fn reset(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CheckoutDraft>(keys::CHECKOUT_DRAFT)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ShippingForm {
        ShippingForm {
            email: "a@b.com".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            address: "1 Analytical Way".to_owned(),
            city: "London".to_owned(),
            postal_code: "EC1A 1AA".to_owned(),
            country: "GB".to_owned(),
            phone: "+44 20 7946 0000".to_owned(),
        }
    }

    #[test]
    fn test_fresh_draft_starts_at_info() {
        let draft = CheckoutDraft::new();
        assert_eq!(draft.step(), CheckoutStep::Info);
        assert!(draft.shipping().is_none());
        assert!(draft.payment_method_id().is_none());
    }

    #[test]
    fn test_valid_info_advances_to_payment() {
        let mut draft = CheckoutDraft::new();
        draft
            .apply(CheckoutEvent::SubmitInfo(valid_form()))
            .unwrap();
        assert_eq!(draft.step(), CheckoutStep::Payment);
        assert!(draft.shipping().is_some());
    }

    #[test]
    fn test_invalid_email_blocks_info() {
        for bad in ["foo", "foo@", "@bar.com"] {
            let mut draft = CheckoutDraft::new();
            let form = ShippingForm {
                email: bad.to_owned(),
                ..valid_form()
            };

            let err = draft.apply(CheckoutEvent::SubmitInfo(form)).unwrap_err();
            let CheckoutError::Invalid(fields) = err else {
                panic!("expected field errors for {bad}");
            };
            assert!(fields.contains_key("email"));
            assert_eq!(draft.step(), CheckoutStep::Info, "did not stay on info");
        }
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let mut draft = CheckoutDraft::new();
        let form = ShippingForm {
            email: "a@b.com".to_owned(),
            city: String::new(),
            phone: "   ".to_owned(),
            ..valid_form()
        };

        let err = draft.apply(CheckoutEvent::SubmitInfo(form)).unwrap_err();
        let CheckoutError::Invalid(fields) = err else {
            panic!("expected field errors");
        };
        assert!(fields.contains_key("city"));
        assert!(fields.contains_key("phone"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_cannot_select_payment_from_info() {
        let mut draft = CheckoutDraft::new();
        let err = draft
            .apply(CheckoutEvent::SelectPayment(PaymentMethodId::generate()))
            .unwrap_err();
        assert_eq!(err, CheckoutError::WrongStep(CheckoutStep::Info));
        assert_eq!(draft.step(), CheckoutStep::Info);
    }

    #[test]
    fn test_review_requires_payment_method_whatever_the_path() {
        // Walk forward, back, forward again without ever selecting payment:
        // review must stay unreachable.
        let mut draft = CheckoutDraft::new();
        draft
            .apply(CheckoutEvent::SubmitInfo(valid_form()))
            .unwrap();
        draft.apply(CheckoutEvent::Back).unwrap();
        draft
            .apply(CheckoutEvent::SubmitInfo(valid_form()))
            .unwrap();

        assert_eq!(draft.step(), CheckoutStep::Payment);
        assert!(draft.ready_for_submit().is_err());
    }

    #[test]
    fn test_full_forward_path() {
        let mut draft = CheckoutDraft::new();
        let method = PaymentMethodId::generate();

        draft
            .apply(CheckoutEvent::SubmitInfo(valid_form()))
            .unwrap();
        draft.apply(CheckoutEvent::SelectPayment(method)).unwrap();

        assert_eq!(draft.step(), CheckoutStep::Review);
        let (shipping, selected) = draft.ready_for_submit().unwrap();
        assert_eq!(shipping.email.as_str(), "a@b.com");
        assert_eq!(selected, method);
    }

    #[test]
    fn test_back_is_lossless() {
        let mut draft = CheckoutDraft::new();
        let method = PaymentMethodId::generate();
        draft
            .apply(CheckoutEvent::SubmitInfo(valid_form()))
            .unwrap();
        draft.apply(CheckoutEvent::SelectPayment(method)).unwrap();

        draft.apply(CheckoutEvent::Back).unwrap();
        assert_eq!(draft.step(), CheckoutStep::Payment);
        draft.apply(CheckoutEvent::Back).unwrap();
        assert_eq!(draft.step(), CheckoutStep::Info);

        // Entered data survives the round trip
        assert!(draft.shipping().is_some());
        assert_eq!(draft.payment_method_id(), Some(method));
    }

    #[test]
    fn test_back_from_info_is_a_no_op() {
        let mut draft = CheckoutDraft::new();
        draft.apply(CheckoutEvent::Back).unwrap();
        assert_eq!(draft.step(), CheckoutStep::Info);
    }

    #[test]
    fn test_submit_before_review_is_rejected() {
        let mut draft = CheckoutDraft::new();
        assert_eq!(draft.ready_for_submit().unwrap_err(), CheckoutError::NotReady);

        draft
            .apply(CheckoutEvent::SubmitInfo(valid_form()))
            .unwrap();
        assert_eq!(draft.ready_for_submit().unwrap_err(), CheckoutError::NotReady);
    }

    #[test]
    fn test_resubmitting_info_from_review_returns_to_payment() {
        let mut draft = CheckoutDraft::new();
        draft
            .apply(CheckoutEvent::SubmitInfo(valid_form()))
            .unwrap();
        draft
            .apply(CheckoutEvent::SelectPayment(PaymentMethodId::generate()))
            .unwrap();

        let form = ShippingForm {
            city: "Cambridge".to_owned(),
            ..valid_form()
        };
        draft.apply(CheckoutEvent::SubmitInfo(form)).unwrap();

        assert_eq!(draft.step(), CheckoutStep::Payment);
        assert_eq!(draft.shipping().unwrap().city, "Cambridge");
        // Payment selection survives; one step forward re-reaches review
        assert!(draft.payment_method_id().is_some());
    }

    #[test]
    fn test_shipping_form_trims_fields() {
        let form = ShippingForm {
            first_name: "  Ada ".to_owned(),
            ..valid_form()
        };
        let shipping = form.validate().unwrap();
        assert_eq!(shipping.first_name, "Ada");
    }
}
