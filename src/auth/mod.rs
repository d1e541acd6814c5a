//! Authentication and authorization.
//!
//! - **Passwords** are stored as salted bcrypt hashes and only ever compared
//!   through [`PasswordHasher::verify`].
//! - **Tokens** are stateless HS256 JWTs carrying the user's email as `sub`
//!   and an absolute expiry. Nothing is stored server-side, so a token stays
//!   valid until it expires.
//! - **Identity** is resolved once per request by verifying the bearer token
//!   and loading the user it names.
//!
//! ## Usage
//!
//! ```ignore
//! let accounts = AccountService::new(hasher, tokens.clone());
//! let token = accounts.login(&session.users(), &email, password).await?;
//!
//! // Later, on a request carrying `Authorization: Bearer <token>`
//! let principal = IdentityResolver::new(&tokens)
//!     .resolve(&session.users(), &token.access_token)
//!     .await?;
//! ```

mod account;
mod context;
mod extractor;
pub mod password;
pub mod token;
mod user_store;

pub use account::{AccessToken, AccountService, Signup};
pub use context::Principal;
pub use extractor::{AuthConfig, AuthError, IdentityResolver, bearer_token};
pub use password::PasswordHasher;
pub use token::{Claims, TokenError, TokenService};
pub use user_store::{UserInsert, UserStore};
