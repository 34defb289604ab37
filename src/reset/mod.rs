//! Password reset wizard.
//!
//! The wizard moves through four steps:
//!
//! | Step   | Leaves to | When |
//! |--------|-----------|------|
//! | Email  | Verify    | a code was sent |
//! | Verify | Reset     | the code was accepted |
//! | Verify | Email     | `restart`, or the server reports the verification expired |
//! | Reset  | Done      | the password was changed |
//! | Reset  | Email     | the server reports the verification expired |
//!
//! Every network-triggering operation holds a busy flag for its duration. While it
//! is set, every other operation is rejected with [`ResetError::Busy`] before any
//! other check runs. The state lives behind a mutex that is never held across an
//! await, so the wizard can be shared between a front end and its event handlers.

pub mod countdown;
pub mod errors;

pub use countdown::{Countdown, format_mmss};
pub use errors::ResetError;

use crate::api::{ApiClient, ApiError, ErrorCode, auth, types::Ack};
use secrecy::{ExposeSecret, SecretString};
use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const DEFAULT_EMAIL_DOMAIN: &str = "sch.ac.kr";
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const CODE_DIGITS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Email,
    Verify,
    Reset,
    Done,
}

impl Step {
    pub const ALL: [Self; 4] = [Self::Email, Self::Verify, Self::Reset, Self::Done];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Email => 0,
            Self::Verify => 1,
            Self::Reset => 2,
            Self::Done => 3,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Email => "email",
            Self::Verify => "verify",
            Self::Reset => "reset",
            Self::Done => "done",
        };
        formatter.write_str(name)
    }
}

/// Institutional email policy: addresses must end with `@<domain>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailPolicy {
    suffix: String,
}

impl EmailPolicy {
    #[must_use]
    pub fn new(domain: &str) -> Self {
        let domain = domain.trim().trim_start_matches('@').to_lowercase();
        Self {
            suffix: format!("@{domain}"),
        }
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether the normalized `email` has a local part and the institutional suffix.
    #[must_use]
    pub fn allows(&self, email: &str) -> bool {
        let email = normalize_email(email);
        email.len() > self.suffix.len() && email.ends_with(&self.suffix)
    }
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EMAIL_DOMAIN)
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Keeps ASCII digits only, capped at the code length.
#[must_use]
pub fn digits_only(code: &str) -> String {
    code.chars()
        .filter(char::is_ascii_digit)
        .take(CODE_DIGITS)
        .collect()
}

/// Comparable view of the wizard for front ends. Credentials are only reported as
/// present or absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub step: Step,
    pub email: String,
    pub code: String,
    pub countdown: u64,
    pub busy: bool,
    pub message: Option<String>,
    pub has_password: bool,
    pub has_confirmation: bool,
}

#[derive(Debug)]
struct Inner {
    step: Step,
    email: String,
    code: String,
    password: SecretString,
    confirmation: SecretString,
    countdown: Countdown,
    busy: bool,
    message: Option<String>,
}

impl Inner {
    fn new() -> Self {
        Self {
            step: Step::Email,
            email: String::new(),
            code: String::new(),
            password: SecretString::default(),
            confirmation: SecretString::default(),
            countdown: Countdown::new(),
            busy: false,
            message: None,
        }
    }

    fn clear_credentials(&mut self) {
        self.password = SecretString::default();
        self.confirmation = SecretString::default();
    }

    /// Hard reset after the server reports the verification expired.
    fn expire(&mut self) {
        self.step = Step::Email;
        self.code.clear();
        self.clear_credentials();
        self.countdown.stop();
    }

    fn record<T>(&mut self, outcome: Result<T, ResetError>) -> Result<T, ResetError> {
        if let Err(err) = &outcome {
            self.message = Some(err.to_string());
        }
        outcome
    }
}

/// Clears the busy flag when an operation ends, including when its future is
/// dropped mid-request.
struct BusyGuard<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl BusyGuard<'_> {
    fn release(mut self, inner: &mut Inner) {
        inner.busy = false;
        self.armed = false;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .busy = false;
        }
    }
}

enum Outcome {
    Accepted,
    Rejected(Option<ErrorCode>),
    Failed(ApiError),
}

/// Structured error bodies on non-2xx responses count as business rejections.
fn classify(result: Result<Ack, ApiError>) -> Outcome {
    match result {
        Ok(ack) if ack.ok => Outcome::Accepted,
        Ok(ack) => Outcome::Rejected(ack.error),
        Err(err) => match err.body().and_then(ErrorCode::from_body) {
            Some(code) => Outcome::Rejected(Some(code)),
            None => Outcome::Failed(err),
        },
    }
}

pub struct ResetWorkflow {
    client: Arc<ApiClient>,
    policy: EmailPolicy,
    inner: Mutex<Inner>,
}

impl fmt::Debug for ResetWorkflow {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResetWorkflow")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ResetWorkflow {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, policy: EmailPolicy) -> Self {
        Self {
            client,
            policy,
            inner: Mutex::new(Inner::new()),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &EmailPolicy {
        &self.policy
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        Snapshot {
            step: inner.step,
            email: inner.email.clone(),
            code: inner.code.clone(),
            countdown: inner.countdown.remaining(),
            busy: inner.busy,
            message: inner.message.clone(),
            has_password: !inner.password.expose_secret().is_empty(),
            has_confirmation: !inner.confirmation.expose_secret().is_empty(),
        }
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.lock().step
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.lock().message.clone()
    }

    #[must_use]
    pub fn countdown_remaining(&self) -> u64 {
        self.lock().countdown.remaining()
    }

    /// Receiver observing every countdown tick.
    #[must_use]
    pub fn watch_countdown(&self) -> watch::Receiver<u64> {
        self.lock().countdown.subscribe()
    }

    /// Whether `send_code(email)` would pass every local gate right now.
    #[must_use]
    pub fn can_send_code(&self, email: &str) -> bool {
        let inner = self.lock();
        !inner.busy && self.send_code_gate(&inner, &normalize_email(email)).is_ok()
    }

    /// Requests a one-time code and enters `Verify`, seeding the countdown with the
    /// server's TTL. Only available in `Email`; a new code needs `restart` first.
    ///
    /// # Errors
    /// Local validation errors issue no request. Server and transport failures
    /// keep the current step and the typed email.
    pub async fn send_code(&self, email: &str) -> Result<u64, ResetError> {
        let (guard, email) = self.begin(|inner| {
            let email = normalize_email(email);
            self.send_code_gate(inner, &email)?;
            inner.email.clone_from(&email);
            Ok(email)
        })?;

        let result = auth::send_password_code(&self.client, &email).await;

        let mut inner = self.lock();
        guard.release(&mut inner);

        let outcome = match result {
            Ok(response) if response.ok => {
                let ttl = response.ttl_seconds();
                inner.countdown.start(ttl);
                inner.step = Step::Verify;
                info!(ttl, "verification code sent");
                Ok(ttl)
            }
            Ok(response) => {
                warn!(error = ?response.error, "send code rejected");
                Err(ResetError::SendCodeRejected)
            }
            Err(err) => Err(err.into()),
        };

        inner.record(outcome)
    }

    /// Confirms the one-time code and enters `Reset`.
    ///
    /// # Errors
    /// Returns `CodeRequired` without a request for a blank code. A rejected code
    /// keeps `Verify` and its countdown; an expired verification returns to `Email`.
    pub async fn verify_code(&self, code: &str) -> Result<(), ResetError> {
        let (guard, (email, code)) = self.begin(|inner| {
            if inner.step != Step::Verify {
                return Err(ResetError::WrongStep { actual: inner.step });
            }
            inner.code = digits_only(code);
            if inner.code.is_empty() {
                return Err(ResetError::CodeRequired);
            }
            Ok((inner.email.clone(), inner.code.clone()))
        })?;

        let result = auth::verify_email_code(&self.client, &email, &code).await;

        let mut inner = self.lock();
        guard.release(&mut inner);

        let outcome = match classify(result) {
            Outcome::Accepted => {
                inner.countdown.stop();
                inner.step = Step::Reset;
                info!("verification code accepted");
                Ok(())
            }
            Outcome::Rejected(Some(ErrorCode::EmailVerificationExpired)) => {
                inner.expire();
                Err(ResetError::VerificationExpired)
            }
            Outcome::Rejected(code) => {
                debug!(error = ?code, "verification code rejected");
                Err(ResetError::CodeRejected)
            }
            Outcome::Failed(err) => Err(err.into()),
        };

        inner.record(outcome)
    }

    /// Submits the new password and enters `Done`.
    ///
    /// # Errors
    /// Short or mismatched passwords are rejected without a request. An expired
    /// verification returns to `Email` with every secret field cleared; other
    /// server errors keep `Reset`.
    pub async fn reset_password(
        &self,
        password: SecretString,
        confirmation: SecretString,
    ) -> Result<(), ResetError> {
        let (guard, (email, password)) = self.begin(move |inner| {
            if inner.step != Step::Reset {
                return Err(ResetError::WrongStep { actual: inner.step });
            }
            inner.password = password;
            inner.confirmation = confirmation;

            let value = inner.password.expose_secret();
            if value.chars().count() < MIN_PASSWORD_CHARS {
                return Err(ResetError::PasswordTooShort {
                    min: MIN_PASSWORD_CHARS,
                });
            }
            if value != inner.confirmation.expose_secret() {
                return Err(ResetError::PasswordMismatch);
            }
            Ok((inner.email.clone(), inner.password.clone()))
        })?;

        let result = auth::reset_password(&self.client, &email, &password).await;

        let mut inner = self.lock();
        guard.release(&mut inner);

        let outcome = match classify(result) {
            Outcome::Accepted => {
                inner.clear_credentials();
                inner.step = Step::Done;
                info!("password changed");
                Ok(())
            }
            Outcome::Rejected(Some(ErrorCode::EmailVerificationExpired)) => {
                inner.expire();
                Err(ResetError::VerificationExpired)
            }
            Outcome::Rejected(Some(ErrorCode::PasswordTooShort)) => {
                Err(ResetError::PasswordTooShort {
                    min: MIN_PASSWORD_CHARS,
                })
            }
            Outcome::Rejected(Some(ErrorCode::Other(code))) => {
                Err(ResetError::ResetRejected { code })
            }
            Outcome::Rejected(None) => Err(ResetError::ResetRejected {
                code: "unknown error".to_string(),
            }),
            Outcome::Failed(err) => Err(err.into()),
        };

        inner.record(outcome)
    }

    /// Returns from `Verify` to `Email`, clearing the code, countdown, and message.
    /// The email stays filled in.
    ///
    /// # Errors
    /// Returns `Busy` while a request is in flight and `WrongStep` outside `Verify`.
    pub fn restart(&self) -> Result<(), ResetError> {
        let mut inner = self.lock();
        if inner.busy {
            return Err(ResetError::Busy);
        }
        if inner.step != Step::Verify {
            return Err(ResetError::WrongStep { actual: inner.step });
        }

        inner.step = Step::Email;
        inner.code.clear();
        inner.countdown.stop();
        inner.message = None;
        debug!("wizard restarted");

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Local gates for `send_code`, in precedence order after the busy flag.
    fn send_code_gate(&self, inner: &Inner, email: &str) -> Result<(), ResetError> {
        if inner.countdown.is_active() {
            return Err(ResetError::CountdownActive {
                remaining: inner.countdown.remaining(),
            });
        }
        if inner.step != Step::Email {
            return Err(ResetError::WrongStep { actual: inner.step });
        }
        if !self.policy.allows(email) {
            return Err(ResetError::EmailDomain {
                suffix: self.policy.suffix().to_string(),
            });
        }
        Ok(())
    }

    /// Runs the local checks of an operation and raises the busy flag if they pass.
    fn begin<T>(
        &self,
        prepare: impl FnOnce(&mut Inner) -> Result<T, ResetError>,
    ) -> Result<(BusyGuard<'_>, T), ResetError> {
        let mut inner = self.lock();
        if inner.busy {
            return Err(ResetError::Busy);
        }
        inner.message = None;

        let prepared = prepare(&mut inner);
        let value = inner.record(prepared)?;
        inner.busy = true;

        Ok((
            BusyGuard {
                inner: &self.inner,
                armed: true,
            },
            value,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;

    fn workflow() -> ResetWorkflow {
        let client = ApiClient::new(&ClientConfig::default()).unwrap();
        ResetWorkflow::new(Arc::new(client), EmailPolicy::default())
    }

    #[test]
    fn email_policy_requires_suffix_and_local_part() {
        let policy = EmailPolicy::default();
        assert_eq!(policy.suffix(), "@sch.ac.kr");
        assert!(policy.allows("a@sch.ac.kr"));
        assert!(policy.allows("  Student@SCH.ac.kr "));
        assert!(!policy.allows("@sch.ac.kr"));
        assert!(!policy.allows("a@gmail.com"));
        assert!(!policy.allows("a@sch.ac.kr.evil.com"));
        assert!(!policy.allows("a@notsch.ac.kr"));
    }

    #[test]
    fn email_policy_normalizes_domain() {
        assert_eq!(EmailPolicy::new(" @Example.EDU ").suffix(), "@example.edu");
    }

    #[test]
    fn digits_only_filters_and_caps() {
        assert_eq!(digits_only("12 34-56"), "123456");
        assert_eq!(digits_only("1234567890"), "123456");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn step_order() {
        let indexes: Vec<usize> = Step::ALL.iter().map(|step| step.index()).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
        assert_eq!(Step::Verify.to_string(), "verify");
    }

    #[test]
    fn fresh_workflow_snapshot() {
        let workflow = workflow();
        assert_eq!(
            workflow.snapshot(),
            Snapshot {
                step: Step::Email,
                email: String::new(),
                code: String::new(),
                countdown: 0,
                busy: false,
                message: None,
                has_password: false,
                has_confirmation: false,
            }
        );
    }

    #[tokio::test]
    async fn operations_outside_their_step_are_rejected_locally() {
        let workflow = workflow();

        let err = workflow.verify_code("123456").await.unwrap_err();
        assert!(matches!(err, ResetError::WrongStep { actual: Step::Email }));
        assert!(err.is_local());

        let err = workflow
            .reset_password(
                SecretString::from("Abcdefg1".to_string()),
                SecretString::from("Abcdefg1".to_string()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ResetError::WrongStep { actual: Step::Email }));

        assert!(matches!(
            workflow.restart(),
            Err(ResetError::WrongStep { actual: Step::Email })
        ));
    }

    #[tokio::test]
    async fn bad_domain_is_rejected_with_a_message() {
        let workflow = workflow();
        assert!(!workflow.can_send_code("someone@gmail.com"));

        let err = workflow.send_code(" Someone@Gmail.com ").await.unwrap_err();
        assert!(matches!(err, ResetError::EmailDomain { .. }));

        let snapshot = workflow.snapshot();
        assert_eq!(snapshot.step, Step::Email);
        assert_eq!(snapshot.email, "");
        assert_eq!(snapshot.message, Some(err.to_string()));
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn countdown_gate_applies_for_any_positive_value() {
        let workflow = workflow();
        for remaining in [1, 2, 59, 120, 600] {
            {
                let mut inner = workflow.lock();
                inner.step = Step::Verify;
                inner.email = "a@sch.ac.kr".to_string();
                inner.countdown.start(remaining);
            }
            assert!(!workflow.can_send_code("a@sch.ac.kr"));
            let err = workflow.send_code("a@sch.ac.kr").await.unwrap_err();
            assert!(matches!(err, ResetError::CountdownActive { .. }));
        }
    }

    #[test]
    fn busy_guard_clears_flag_on_drop() {
        let workflow = workflow();
        let (guard, ()) = workflow.begin(|_| Ok(())).unwrap();
        assert!(workflow.is_busy());
        assert!(matches!(workflow.begin(|_| Ok(())), Err(ResetError::Busy)));
        drop(guard);
        assert!(!workflow.is_busy());
    }

    #[tokio::test]
    async fn busy_wins_over_countdown() {
        let workflow = workflow();
        {
            let mut inner = workflow.lock();
            inner.step = Step::Verify;
            inner.email = "a@sch.ac.kr".to_string();
            inner.countdown.start(30);
        }
        let (guard, ()) = workflow.begin(|_| Ok(())).unwrap();

        let err = workflow.send_code("a@sch.ac.kr").await.unwrap_err();
        assert!(matches!(err, ResetError::Busy));
        assert!(matches!(workflow.restart(), Err(ResetError::Busy)));

        drop(guard);
        let err = workflow.send_code("a@sch.ac.kr").await.unwrap_err();
        assert!(matches!(err, ResetError::CountdownActive { .. }));
    }

    #[tokio::test]
    async fn send_code_outside_email_step_is_rejected() {
        let workflow = workflow();
        for step in [Step::Verify, Step::Reset, Step::Done] {
            {
                let mut inner = workflow.lock();
                inner.step = step;
                inner.email = "a@sch.ac.kr".to_string();
                inner.code = "111111".to_string();
            }
            assert!(!workflow.can_send_code("a@sch.ac.kr"));
            let err = workflow.send_code("a@sch.ac.kr").await.unwrap_err();
            assert!(matches!(err, ResetError::WrongStep { actual } if actual == step));

            let snapshot = workflow.snapshot();
            assert_eq!(snapshot.step, step);
            assert_eq!(snapshot.code, "111111");
            assert!(!snapshot.busy);
        }
    }
}
