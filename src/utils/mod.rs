mod auth;
mod emails;

pub use auth::password::{
    constant_time_eq, CredentialHasher, KdfAlgorithm, DEFAULT_ITERATIONS, KEY_LEN, SALT_LEN,
};

pub use auth::reset::{ResetTokenManager, RESET_TOKEN_BYTES};

pub use auth::tokens::SessionTokens;

pub use emails::{
    render_invoice, render_reset_link_email, send_order_invoice, send_reset_confirmation,
    send_reset_link, Notifier, SmtpNotifier, INVOICE_SUBJECT, RESET_CONFIRMATION_SUBJECT,
    RESET_LINK_SUBJECT,
};
