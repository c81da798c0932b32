use docseal_daemon::http_server::api::client::ApiError;
use docseal_daemon::http_server::api::v0::identity::ShowRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for ShowRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;

        let mut lines = vec![
            format!("identity:   {}", response.identity_handle),
            format!("public key: {}", response.public_key),
        ];
        if response.transactions.is_empty() {
            lines.push("transactions: none".to_string());
        } else {
            lines.push("transactions:".to_string());
            for (position, reference) in response.transactions.iter().enumerate() {
                lines.push(format!("  {:>4}  {}", position, reference));
            }
        }
        Ok(lines.join("\n"))
    }
}
