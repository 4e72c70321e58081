use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use async_trait::async_trait;
use backend::settings::{HasherSettings, Secret};
use backend::startup::AppState;
use backend::store::{AccountStore, InMemoryAccountStore};
use backend::types::{NotifyError, SESSION_COOKIE};
use backend::utils::{CredentialHasher, KdfAlgorithm, Notifier, SessionTokens, RESET_TOKEN_BYTES};
use tokio::sync::Mutex;

pub const FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records outgoing mail instead of delivering it.
#[derive(Default)]
pub struct Outbox {
    pub sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl Outbox {
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub async fn last(&self) -> Option<SentMail> {
        self.sent.lock().await.last().cloned()
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            let address: Result<lettre::Address, _> = "not an address".parse();
            return Err(NotifyError::Address(address.unwrap_err()));
        }
        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body_html.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryAccountStore>,
    pub outbox: Arc<Outbox>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryAccountStore::new());
        let outbox = Arc::new(Outbox::default());

        let hasher = CredentialHasher::new(&HasherSettings {
            algorithm: KdfAlgorithm::Pbkdf2Sha256,
            iterations: 1_000,
            memory_kib: 1024,
        })
        .expect("Failed to build hasher");
        let sessions = SessionTokens::new(&Secret {
            secret_key: "0123456789abcdef0123456789abcdef".to_string(),
            token_expiration: 60,
            hmac_secret: "integration-tests".to_string(),
        })
        .expect("Failed to build session tokens");

        let state = AppState::new(
            store.clone() as Arc<dyn AccountStore>,
            outbox.clone() as Arc<dyn Notifier>,
            hasher,
            sessions,
            FRONTEND_URL.to_string(),
        );

        Self {
            state,
            store,
            outbox,
        }
    }
}

pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned())
}

/// Pulls the reset token out of a reset-link e-mail.
pub fn token_from_mail(body: &str) -> String {
    let start = body.find("token=").expect("No token in e-mail") + "token=".len();
    body[start..start + RESET_TOKEN_BYTES * 2].to_string()
}
