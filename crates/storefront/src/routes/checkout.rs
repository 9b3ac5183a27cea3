//! Checkout route handlers.
//!
//! Handlers translate HTTP into [`CheckoutEvent`]s; every guard lives in the
//! state machine itself. A rejected transition returns the error body and
//! leaves both the draft and the cart exactly as they were, so the customer
//! resumes on the same step with their data intact.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use orchard_core::{CurrencyCode, OrderNumber, PaymentMethodId};

use crate::cart::{self, Cart};
use crate::checkout::{
    self, CheckoutDraft, CheckoutError, CheckoutEvent, CheckoutStep, ShippingForm,
};
use crate::db;
use crate::error::{AppError, Result};
use crate::models::session::{PlacedOrderRef, keys};
use crate::models::{PaymentMethod, ShippingAddress};
use crate::pricing::Totals;
use crate::services::orders;
use crate::services::payments::{PaymentAction, PaymentOutcome};
use crate::state::AppState;

/// The draft as shown to the client.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub shipping: Option<ShippingAddress>,
    pub payment_method_id: Option<PaymentMethodId>,
    pub totals: Totals,
}

impl CheckoutView {
    fn new(draft: &CheckoutDraft, cart: &Cart) -> Self {
        Self {
            step: draft.step(),
            shipping: draft.shipping().cloned(),
            payment_method_id: draft.payment_method_id(),
            totals: crate::pricing::quote(cart.subtotal()),
        }
    }
}

/// Confirmation returned once the order is placed.
#[derive(Debug, Serialize)]
pub struct OrderConfirmationView {
    pub order_number: OrderNumber,
    pub totals: Totals,
}

async fn load_non_empty_cart(session: &Session) -> Result<Cart> {
    let cart = cart::load(session).await?;
    if cart.is_empty() {
        return Err(AppError::Checkout(CheckoutError::EmptyCart));
    }
    Ok(cart)
}

/// Show the current draft, starting a fresh one if the session has none.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CheckoutView>> {
    let cart = load_non_empty_cart(&session).await?;
    let draft = checkout::load(&session).await?;
    checkout::save(&session, &draft).await?;

    Ok(Json(CheckoutView::new(&draft, &cart)))
}

/// Submit the shipping form (info → payment).
#[instrument(skip(session, form))]
pub async fn submit_info(
    session: Session,
    Json(form): Json<ShippingForm>,
) -> Result<Json<CheckoutView>> {
    let cart = load_non_empty_cart(&session).await?;
    let mut draft = checkout::load(&session).await?;

    draft.apply(CheckoutEvent::SubmitInfo(form))?;
    checkout::save(&session, &draft).await?;

    Ok(Json(CheckoutView::new(&draft, &cart)))
}

/// Payment method selection request.
#[derive(Debug, Deserialize)]
pub struct SelectPaymentRequest {
    pub payment_method_id: PaymentMethodId,
}

/// Select a payment method (payment → review).
///
/// The selection is validated against the store's active methods before the
/// state machine sees it.
#[instrument(skip(state, session))]
pub async fn select_payment(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SelectPaymentRequest>,
) -> Result<Json<CheckoutView>> {
    let cart = load_non_empty_cart(&session).await?;

    db::payment_methods::get_active(state.pool(), request.payment_method_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("unknown payment method".to_owned()))?;

    let mut draft = checkout::load(&session).await?;
    draft.apply(CheckoutEvent::SelectPayment(request.payment_method_id))?;
    checkout::save(&session, &draft).await?;

    Ok(Json(CheckoutView::new(&draft, &cart)))
}

/// Step backward one screen. Always allowed, never loses data.
#[instrument(skip(session))]
pub async fn back(session: Session) -> Result<Json<CheckoutView>> {
    let cart = load_non_empty_cart(&session).await?;
    let mut draft = checkout::load(&session).await?;

    draft.apply(CheckoutEvent::Back)?;
    checkout::save(&session, &draft).await?;

    Ok(Json(CheckoutView::new(&draft, &cart)))
}

/// Place the order (review → done).
///
/// On success the cart is cleared, the draft is reset, and a reference to
/// the placed order stays in the session for the confirmation screen and the
/// decoupled payment step. On failure everything is left untouched and the
/// customer can retry.
#[instrument(skip(state, session))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<OrderConfirmationView>> {
    let cart = load_non_empty_cart(&session).await?;
    let draft = checkout::load(&session).await?;
    let (shipping, payment_method_id) = draft.ready_for_submit()?;

    let placed = orders::place_order(
        state.pool(),
        &cart,
        shipping,
        payment_method_id,
        CurrencyCode::BASE,
    )
    .await?;

    // Only now that the order is committed: clear the cart, drop the draft.
    let mut cart = cart;
    cart.clear();
    cart::save(&session, &cart).await?;
    checkout::reset(&session).await?;
    session
        .insert(
            keys::LAST_ORDER,
            &PlacedOrderRef {
                order_id: placed.order_id,
                order_number: placed.order_number.clone(),
            },
        )
        .await?;

    Ok(Json(OrderConfirmationView {
        order_number: placed.order_number,
        totals: placed.totals,
    }))
}

/// Trigger the payment bridge for the just-placed order.
///
/// Capture is decoupled from order creation: the order exists (`pending` /
/// `pending`) before any provider is contacted, and a bridge failure leaves
/// it in place to pay again.
#[instrument(skip(state, session))]
pub async fn pay(State(state): State<AppState>, session: Session) -> Result<Json<PaymentOutcome>> {
    let placed: PlacedOrderRef = session
        .get(keys::LAST_ORDER)
        .await?
        .ok_or_else(|| AppError::NotFound("no recently placed order".to_owned()))?;

    let order = db::orders::get(state.pool(), placed.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", placed.order_number)))?;

    let method = db::payment_methods::get_active(state.pool(), order.payment_method_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("the order's payment method is no longer available".to_owned())
        })?;

    let outcome = state
        .payments()
        .dispatch(
            method.provider,
            PaymentAction::Create,
            order.id,
            order.total_amount,
            order.currency,
        )
        .await?;

    Ok(Json(outcome))
}

/// Payment method display data.
#[derive(Debug, Serialize)]
pub struct PaymentMethodView {
    pub id: PaymentMethodId,
    pub code: String,
    pub name: String,
}

impl From<PaymentMethod> for PaymentMethodView {
    fn from(method: PaymentMethod) -> Self {
        Self {
            id: method.id,
            code: method.code,
            name: method.name,
        }
    }
}

/// List the active payment methods for the payment step.
#[instrument(skip(state))]
pub async fn payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentMethodView>>> {
    let methods = db::payment_methods::list_active(state.pool()).await?;
    Ok(Json(methods.into_iter().map(Into::into).collect()))
}
