//! Services
//!
//! Request handlers call these; they own validation and call the storage
//! traits.

pub mod cart;
pub mod gadgets;
pub mod images;
pub mod statements;
pub mod users;

pub use cart::{CartService, ImportOutcome, PurchaseResult};
pub use gadgets::GadgetService;
pub use images::{FetchPolicy, ImageError, ImageService};
pub use statements::{StatementQuery, StatementService};
pub use users::{AuthError, ProfileError, UserService};
