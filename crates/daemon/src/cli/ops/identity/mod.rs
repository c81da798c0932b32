use clap::{Args, Subcommand};

pub mod append;
pub mod register;
pub mod rotate_key;
pub mod show;

use crate::cli::op::Op;
use docseal_daemon::http_server::api::v0::identity::{
    AppendRequest, RegisterRequest, RotateKeyRequest, ShowRequest,
};

crate::command_enum! {
    (Register, RegisterRequest),
    (RotateKey, RotateKeyRequest),
    (Show, ShowRequest),
    (Append, AppendRequest),
}

pub type IdentityCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Identity {
    #[command(subcommand)]
    pub command: IdentityCommand,
}

#[async_trait::async_trait]
impl Op for Identity {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
