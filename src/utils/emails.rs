use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::instrument;

use crate::settings::EmailSettings;
use crate::types::{NotifyError, Order};

pub const RESET_LINK_SUBJECT: &str = "Reset your storefront password";
pub const RESET_CONFIRMATION_SUBJECT: &str = "Your storefront password was reset";
pub const INVOICE_SUBJECT: &str = "Your storefront order receipt";

/// Flat charges printed on every invoice.
const SHIPPING: f64 = 4.99;
const SALES_TAX: f64 = 6.99;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        (
            "password_reset_email.html",
            include_str!("../../templates/password_reset_email.html"),
        ),
        (
            "password_reset_success.html",
            include_str!("../../templates/password_reset_success.html"),
        ),
        ("invoice.html", include_str!("../../templates/invoice.html")),
    ] {
        if let Err(e) = env.add_template(name, source) {
            tracing::event!(target: "backend", tracing::Level::ERROR, "Cannot load template {}: {}", name, e);
        }
    }
    env
});

/// Delivers an HTML e-mail to a single recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), NotifyError>;
}

/// SMTP delivery through one pooled transport, built once at startup.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &EmailSettings) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(
            settings.host_user.clone(),
            settings.host_user_password.clone(),
        );
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
            .credentials(credentials)
            .build();
        let sender = Mailbox::new(
            Some(settings.sender_name.clone()),
            settings.sender_address.parse()?,
        );

        Ok(Self { mailer, sender })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[instrument(name = "Sending e-mail", skip(self, body_html), fields(recipient = %to))]
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.sender.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body_html.to_string())?;

        match self.mailer.send(email).await {
            Ok(_) => {
                tracing::event!(target: "backend", tracing::Level::INFO, "E-mail successfully sent!");
                Ok(())
            }
            Err(e) => {
                tracing::event!(target: "backend", tracing::Level::ERROR, "Could not send e-mail: {:#?}", e);
                Err(e.into())
            }
        }
    }
}

/// Link to the frontend page where the reset is completed.
pub fn render_reset_link_email(
    frontend_url: &str,
    email: &str,
    token: &str,
) -> Result<String, NotifyError> {
    Ok(TEMPLATES.get_template("password_reset_email.html")?.render(context! {
        frontend_url => frontend_url.trim_end_matches('/'),
        email => email,
        token => token,
    })?)
}

pub async fn send_reset_link(
    notifier: &dyn Notifier,
    frontend_url: &str,
    email: &str,
    token: &str,
) -> Result<(), NotifyError> {
    let body = render_reset_link_email(frontend_url, email, token)?;
    notifier.send(email, RESET_LINK_SUBJECT, &body).await
}

pub async fn send_reset_confirmation(notifier: &dyn Notifier, email: &str) -> Result<(), NotifyError> {
    let body = TEMPLATES
        .get_template("password_reset_success.html")?
        .render(context! { email => email })?;
    notifier.send(email, RESET_CONFIRMATION_SUBJECT, &body).await
}

#[derive(Serialize)]
struct InvoiceLine<'a> {
    name: &'a str,
    qty: u32,
    amount: String,
}

/// HTML receipt for `order`: one row per item, then shipping, tax and total.
pub fn render_invoice(order: &Order) -> Result<String, NotifyError> {
    let lines: Vec<InvoiceLine<'_>> = order
        .items
        .iter()
        .map(|item| InvoiceLine {
            name: &item.name,
            qty: item.qty,
            amount: format!("{:.2}", item.price * f64::from(item.qty)),
        })
        .collect();

    Ok(TEMPLATES.get_template("invoice.html")?.render(context! {
        order_id => &order.id,
        lines => lines,
        shipping => format!("{:.2}", SHIPPING),
        sales_tax => format!("{:.2}", SALES_TAX),
        total => format!("{:.2}", order.total),
    })?)
}

pub async fn send_order_invoice(
    notifier: &dyn Notifier,
    email: &str,
    order: &Order,
) -> Result<(), NotifyError> {
    let body = render_invoice(order)?;
    notifier.send(email, INVOICE_SUBJECT, &body).await
}
