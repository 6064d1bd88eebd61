//! Catalog pages and checkout

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::extract::{CurrentUser, MaybeUser};
use super::{views, StoreState};
use crate::error::AppError;
use crate::services::cart::{QUANTITY_MAX, QUANTITY_MIN};
use crate::services::PurchaseResult;

/// GET /store query
#[derive(Debug, Default, Deserialize)]
pub struct StoreQuery {
    id: Option<String>,
    purchased: Option<String>,
    error: Option<String>,
}

/// POST /store form
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    id: Option<String>,
    qty: Option<String>,
    back: Option<String>,
}

fn parse_id(raw: Option<&str>) -> Option<i32> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Blank means 1; out-of-range values are clamped; garbage is rejected.
fn parse_quantity(raw: Option<&str>) -> Option<i32> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Some(QUANTITY_MIN);
    };
    let value: i64 = raw.parse().ok()?;
    let clamped = value.clamp(i64::from(QUANTITY_MIN), i64::from(QUANTITY_MAX));
    i32::try_from(clamped).ok()
}

/// GET /store
pub async fn show_store(
    State(state): State<StoreState>,
    MaybeUser(current): MaybeUser,
    Query(query): Query<StoreQuery>,
) -> Result<Response, AppError> {
    let user = current.as_ref().map(|c| &c.user);
    let banner = views::store_banner(query.purchased.as_deref(), query.error.as_deref());

    if let Some(id) = parse_id(query.id.as_deref()) {
        if let Some(gadget) = state.gadgets.get(id).await? {
            return Ok(views::gadget_page(user, &gadget, banner).into_response());
        }
    }

    let gadgets = state.gadgets.list().await?;
    Ok(views::store_page(user, &gadgets, banner).into_response())
}

/// POST /store
pub async fn checkout(
    State(state): State<StoreState>,
    current: CurrentUser,
    Form(form): Form<CheckoutForm>,
) -> Redirect {
    let Some(id) = parse_id(form.id.as_deref()) else {
        return Redirect::to("/store");
    };
    let Some(quantity) = parse_quantity(form.qty.as_deref()) else {
        return Redirect::to("/store");
    };

    let result = state
        .cart
        .checkout(&current.session_id, &current.user.username, id, quantity)
        .await;

    let flag = match result {
        PurchaseResult::Success => "purchased=1",
        PurchaseResult::InsufficientBalance => "error=insufficient",
        PurchaseResult::Failure => "error=payment",
    };

    if form.back.as_deref() == Some("detail") {
        Redirect::to(&format!("/store?id={id}&{flag}"))
    } else {
        Redirect::to(&format!("/store?{flag}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(None), Some(1));
        assert_eq!(parse_quantity(Some("")), Some(1));
        assert_eq!(parse_quantity(Some("7")), Some(7));
        assert_eq!(parse_quantity(Some("0")), Some(1));
        assert_eq!(parse_quantity(Some("-5")), Some(1));
        assert_eq!(parse_quantity(Some("1000")), Some(100));
        assert_eq!(parse_quantity(Some("99999999999999")), Some(100));
        assert_eq!(parse_quantity(Some("two")), None);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some("3")), Some(3));
        assert_eq!(parse_id(Some(" 3 ")), Some(3));
        assert_eq!(parse_id(Some("3 OR 1=1")), None);
        assert_eq!(parse_id(None), None);
    }
}
