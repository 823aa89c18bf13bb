use axum::async_trait;
use tracing::info;

/// Outbound email is an external collaborator. The verification code
/// handed to it is otherwise confined to the `users` table.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(
        &self,
        email: &str,
        display_name: &str,
        code: &str,
    ) -> anyhow::Result<()>;
}

/// Logs the code instead of delivering it. Stands in until a real
/// provider is wired up.
#[derive(Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_email(
        &self,
        email: &str,
        display_name: &str,
        code: &str,
    ) -> anyhow::Result<()> {
        info!(%email, %display_name, %code, "verification email (log only)");
        Ok(())
    }
}
