mod errors;
mod general;
mod orders;
mod token;
mod users;

pub use errors::{AuthError, NotifyError, StorageError, TokenError};

pub use general::{ErrorResponse, FrontendUrl, SuccessResponse, SESSION_COOKIE};

pub use orders::{Order, OrderItem};

pub use token::SessionUser;

pub use users::{Account, PasswordCredential, Role, UnknownRole};
