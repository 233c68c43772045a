//! Construction-time credential validation shared by every AWS messenger.

use crate::error::{MessengerError, MessengerResult};
use crate::transport::{AwsIdentityCheck, IdentityCheck};
use aws_config::SdkConfig;
use tracing::{debug, warn};

/// Run one identity lookup and report any failure as
/// [`MessengerError::Credential`].
pub async fn check_credentials<C>(check: &C) -> MessengerResult<()>
where
    C: IdentityCheck + ?Sized,
{
    match check.check().await {
        Ok(()) => {
            debug!("AWS credentials verified");
            Ok(())
        }
        Err(MessengerError::Credential(err)) => {
            warn!(error = %err, "AWS credential check failed");
            Err(MessengerError::Credential(err))
        }
        Err(other) => {
            warn!(error = %other, "AWS credential check failed");
            Err(MessengerError::Credential(Box::new(other)))
        }
    }
}

/// Check the credentials resolved into `config` with STS `GetCallerIdentity`
pub async fn verify_sdk_config(config: &SdkConfig) -> MessengerResult<()> {
    check_credentials(&AwsIdentityCheck::new(config)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockIdentityCheck;

    #[tokio::test]
    async fn test_check_passes_through_success() {
        let mut check = MockIdentityCheck::new();
        check.expect_check().times(1).returning(|| Ok(()));

        assert!(check_credentials(&check).await.is_ok());
    }

    #[tokio::test]
    async fn test_any_failure_becomes_credential_error() {
        let mut check = MockIdentityCheck::new();
        check
            .expect_check()
            .times(1)
            .returning(|| Err(MessengerError::transport(std::io::Error::other("expired token"))));

        let err = check_credentials(&check).await.unwrap_err();
        assert!(matches!(err, MessengerError::Credential(_)));
        assert!(err.to_string().contains("expired token"));
    }
}
