use clap::Args;
use reqwest::Client;

use docseal_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("invalid daemon url: {0}")]
    Url(#[from] url::ParseError),
}

async fn probe(client: &Client, url: url::Url) -> String {
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => "OK".to_string(),
        Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
        Err(_) => "NOT REACHABLE".to_string(),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = vec!["Config:".to_string()];

        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.docseal_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push("  db.sqlite:    OK".to_string());
                lines.push(format!("  api_port:     {}", state.config.api_port));
                lines.push(format!("  publisher:    {:?}", state.config.publisher));
                lines.push(format!("  key_export:   {}", state.config.key_export));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", base));

        let livez = probe(client, base.join("/_status/livez")?).await;
        lines.push(format!("  livez:  {}", livez));

        let readyz = probe(client, base.join("/_status/readyz")?).await;
        lines.push(format!("  readyz: {}", readyz));

        Ok(lines.join("\n"))
    }
}
