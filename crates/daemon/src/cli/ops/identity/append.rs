use common::ledger::AppendOutcome;
use docseal_daemon::http_server::api::client::ApiError;
use docseal_daemon::http_server::api::v0::identity::AppendRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for AppendRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let outcome = ctx.client.call(self.clone()).await?;
        Ok(match outcome {
            AppendOutcome::Appended { position } => {
                format!("Appended {} at position {}", self.reference, position)
            }
            AppendOutcome::AlreadyRecorded { position } => {
                format!("{} already recorded at position {}", self.reference, position)
            }
        })
    }
}
