//! Best-effort notification emails
//!
//! Review decisions and resubmissions notify the applicant by email. The
//! primary operation has already committed by the time a message is queued,
//! so delivery runs as a detached task with bounded retry; failures are
//! logged and never surfaced to the caller.

use std::time::Duration;

use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

/// Delivery attempts before a notification is dropped
const SEND_ATTEMPTS: u32 = 3;

/// Delay between delivery attempts
const RETRY_DELAY: Duration = Duration::from_secs(30);

/// Error type for email delivery failures
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(#[from] lettre::error::Error),
}

/// Queues notification emails after a state change has committed
#[derive(Clone)]
pub struct Notifier {
    smtp: Option<SmtpConfig>,
}

impl Notifier {
    /// Create a notifier; an empty SMTP host disables delivery entirely
    pub fn new(config: &SmtpConfig) -> Self {
        let smtp = if config.host.trim().is_empty() {
            None
        } else {
            Some(config.clone())
        };
        Self { smtp }
    }

    /// Notify the applicant that their application was approved
    pub fn notify_approved(&self, to: &str, recipient_name: &str, company_name: &str) -> bool {
        self.dispatch(
            to,
            "ผลการพิจารณาใบสมัครสมาชิก ส.อ.ท.".to_string(),
            format!(
                "เรียน คุณ{recipient_name}\n\n\
                 ใบสมัครสมาชิกของ {company_name} ได้รับการอนุมัติแล้ว\n\
                 ท่านสามารถเข้าสู่ระบบเพื่อดูรายละเอียดสมาชิกภาพได้ทันที\n\n\
                 สภาอุตสาหกรรมแห่งประเทศไทย"
            ),
        )
    }

    /// Notify the applicant that their application was rejected
    pub fn notify_rejected(
        &self,
        to: &str,
        recipient_name: &str,
        company_name: &str,
        reason: &str,
    ) -> bool {
        self.dispatch(
            to,
            "ผลการพิจารณาใบสมัครสมาชิก ส.อ.ท.".to_string(),
            format!(
                "เรียน คุณ{recipient_name}\n\n\
                 ใบสมัครสมาชิกของ {company_name} ไม่ผ่านการพิจารณา\n\
                 เหตุผล: {reason}\n\n\
                 ท่านสามารถแก้ไขข้อมูลและส่งใบสมัครใหม่ได้ผ่านระบบสมาชิก\n\n\
                 สภาอุตสาหกรรมแห่งประเทศไทย"
            ),
        )
    }

    /// Confirm that a resubmission was received
    pub fn notify_resubmitted(&self, to: &str, company_name: &str) -> bool {
        self.dispatch(
            to,
            "ได้รับข้อมูลใบสมัครที่แก้ไขแล้ว".to_string(),
            format!(
                "ใบสมัครสมาชิกของ {company_name} ที่แก้ไขแล้วถูกส่งเข้าสู่ระบบเรียบร้อย\n\
                 เจ้าหน้าที่จะพิจารณาและแจ้งผลให้ทราบอีกครั้ง\n\n\
                 สภาอุตสาหกรรมแห่งประเทศไทย"
            ),
        )
    }

    /// Notify the requester of an address-change decision
    pub fn notify_address_decision(&self, to: &str, approved: bool, reason: Option<&str>) -> bool {
        let body = if approved {
            "คำขอเปลี่ยนแปลงที่อยู่ของท่านได้รับการอนุมัติแล้ว\n\n\
             สภาอุตสาหกรรมแห่งประเทศไทย"
                .to_string()
        } else {
            format!(
                "คำขอเปลี่ยนแปลงที่อยู่ของท่านไม่ผ่านการพิจารณา\n\
                 เหตุผล: {}\n\n\
                 สภาอุตสาหกรรมแห่งประเทศไทย",
                reason.unwrap_or("-")
            )
        };
        self.dispatch(to, "ผลการพิจารณาคำขอเปลี่ยนแปลงที่อยู่".to_string(), body)
    }

    /// Queue a notification email as a detached task.
    ///
    /// Returns whether a delivery task was dispatched (mailer configured
    /// and recipient known); it says nothing about eventual SMTP success.
    pub fn dispatch(&self, to: &str, subject: String, body: String) -> bool {
        let Some(config) = self.smtp.clone() else {
            tracing::debug!("SMTP not configured, skipping notification email");
            return false;
        };
        if to.trim().is_empty() {
            tracing::warn!("no recipient address for notification email, skipping");
            return false;
        }

        let to = to.to_string();
        tokio::spawn(async move {
            for attempt in 1..=SEND_ATTEMPTS {
                match send_once(&config, &to, &subject, &body).await {
                    Ok(()) => {
                        tracing::info!(%to, attempt, "notification email sent");
                        return;
                    }
                    Err(e) => {
                        tracing::warn!(%to, attempt, error = %e, "notification email failed");
                    }
                }
                if attempt < SEND_ATTEMPTS {
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                }
            }
            tracing::error!(%to, "giving up on notification email after {} attempts", SEND_ATTEMPTS);
        });

        true
    }
}

/// Build and send one email over SMTP
async fn send_once(
    config: &SmtpConfig,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<(), EmailError> {
    let email = Message::builder()
        .from(config.from_address.parse()?)
        .to(to.parse()?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?;

    let mut builder =
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
    }

    builder.build().send(email).await?;
    Ok(())
}
