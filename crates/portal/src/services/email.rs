//! Email service for delivering password-setup links and codes.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Delivery is
//! fire-and-forget from the auth subsystem's perspective: the setup secret is
//! already persisted before a send is attempted, so a failed send leaves the
//! secret valid for a later resend.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the setup-link email.
#[derive(Template)]
#[template(path = "email/setup_link.html")]
struct SetupLinkEmailHtml<'a> {
    display_name: &'a str,
    setup_link: &'a str,
}

/// Plain text template for the setup-link email.
#[derive(Template)]
#[template(path = "email/setup_link.txt")]
struct SetupLinkEmailText<'a> {
    display_name: &'a str,
    setup_link: &'a str,
}

/// HTML template for the setup-code email.
#[derive(Template)]
#[template(path = "email/setup_code.html")]
struct SetupCodeEmailHtml<'a> {
    display_name: &'a str,
    code: &'a str,
}

/// Plain text template for the setup-code email.
#[derive(Template)]
#[template(path = "email/setup_code.txt")]
struct SetupCodeEmailText<'a> {
    display_name: &'a str,
    code: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a password-setup link to a client.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_setup_email(
        &self,
        to: &str,
        display_name: &str,
        setup_link: &str,
    ) -> Result<(), EmailError> {
        let html = SetupLinkEmailHtml {
            display_name,
            setup_link,
        }
        .render()?;
        let text = SetupLinkEmailText {
            display_name,
            setup_link,
        }
        .render()?;

        self.send_multipart_email(to, "Set up your Crestline portal password", &text, &html)
            .await
    }

    /// Send a password-setup code to a client.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or a template fails to render.
    pub async fn send_setup_code(
        &self,
        to: &str,
        display_name: &str,
        code: &str,
    ) -> Result<(), EmailError> {
        let html = SetupCodeEmailHtml { display_name, code }.render()?;
        let text = SetupCodeEmailText { display_name, code }.render()?;

        self.send_multipart_email(to, "Your Crestline portal setup code", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
