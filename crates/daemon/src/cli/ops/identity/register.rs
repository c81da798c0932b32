use docseal_daemon::http_server::api::client::ApiError;
use docseal_daemon::http_server::api::v0::identity::RegisterRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for RegisterRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(format!(
            "Registered {} with public key {}",
            response.identity_handle, response.public_key
        ))
    }
}
