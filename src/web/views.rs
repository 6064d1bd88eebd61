//! Server-rendered HTML pages
//!
//! Pages are askama templates under `templates/`; askama escapes every
//! interpolated value. Handlers return the template structs directly.

use askama::Template;
use finova_store::{Gadget, User};

// =============================================================================
// View Models
// =============================================================================

/// Signed-in user shown in the navigation bar
#[derive(Debug, Clone)]
pub struct NavView {
    pub username: String,
    pub balance: String,
}

impl From<&User> for NavView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            balance: format!("{:.2}", user.balance),
        }
    }
}

/// Gadget as shown in listings
#[derive(Debug, Clone)]
pub struct GadgetView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: String,
    pub for_sale: bool,
}

impl From<&Gadget> for GadgetView {
    fn from(gadget: &Gadget) -> Self {
        Self {
            id: gadget.id,
            name: gadget.name.clone(),
            description: gadget.description.clone(),
            image: gadget.image.clone(),
            price: gadget
                .price
                .map_or_else(|| "Not for sale".to_string(), |p| format!("${p:.2}")),
            for_sale: gadget.price.is_some(),
        }
    }
}

/// Outcome banner on the store pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banner {
    pub class: &'static str,
    pub text: &'static str,
}

/// Banner for `purchased` / `error` query flags
pub fn store_banner(purchased: Option<&str>, error: Option<&str>) -> Option<Banner> {
    if purchased == Some("1") {
        return Some(Banner {
            class: "success",
            text: "Purchase successful",
        });
    }
    let text = match error {
        Some("insufficient") => "Insufficient balance",
        Some("payment") => "Payment failed, please try again",
        _ => return None,
    };
    Some(Banner {
        class: "error",
        text,
    })
}

// =============================================================================
// Auth
// =============================================================================

/// Login or registration form
#[derive(Template)]
#[template(path = "credentials.html")]
pub struct CredentialsTemplate {
    nav: Option<NavView>,
    title: &'static str,
    registering: bool,
    error: Option<String>,
}

/// Login form
pub fn login_page(error: Option<&str>) -> CredentialsTemplate {
    CredentialsTemplate {
        nav: None,
        title: "Log in",
        registering: false,
        error: error.map(str::to_string),
    }
}

/// Registration form
pub fn register_page(error: Option<&str>) -> CredentialsTemplate {
    CredentialsTemplate {
        nav: None,
        title: "Register",
        registering: true,
        error: error.map(str::to_string),
    }
}

// =============================================================================
// Store
// =============================================================================

/// Catalog listing
#[derive(Template)]
#[template(path = "store.html")]
pub struct StoreTemplate {
    nav: Option<NavView>,
    banner: Option<Banner>,
    gadgets: Vec<GadgetView>,
    back_to_detail: bool,
}

/// Single gadget
#[derive(Template)]
#[template(path = "gadget.html")]
pub struct GadgetTemplate {
    nav: Option<NavView>,
    banner: Option<Banner>,
    gadget: GadgetView,
    back_to_detail: bool,
}

pub fn store_page(
    user: Option<&User>,
    gadgets: &[Gadget],
    banner: Option<Banner>,
) -> StoreTemplate {
    StoreTemplate {
        nav: user.map(NavView::from),
        banner,
        gadgets: gadgets.iter().map(GadgetView::from).collect(),
        back_to_detail: false,
    }
}

pub fn gadget_page(
    user: Option<&User>,
    gadget: &Gadget,
    banner: Option<Banner>,
) -> GadgetTemplate {
    GadgetTemplate {
        nav: user.map(NavView::from),
        banner,
        gadget: GadgetView::from(gadget),
        back_to_detail: true,
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Profile with purchase history and the export/import forms
#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    nav: Option<NavView>,
    username: String,
    image: String,
    balance: String,
    purchases: Vec<GadgetView>,
    message: Option<String>,
    error: Option<String>,
}

pub fn profile_page(
    user: &User,
    purchases: &[Gadget],
    message: Option<&str>,
    error: Option<&str>,
) -> ProfileTemplate {
    let nav = NavView::from(user);
    ProfileTemplate {
        username: user.username.clone(),
        image: user.image.clone(),
        balance: nav.balance.clone(),
        nav: Some(nav),
        purchases: purchases.iter().map(GadgetView::from).collect(),
        message: message.map(str::to_string),
        error: error.map(str::to_string),
    }
}
