use clap::{Args, Subcommand};

pub mod generate;

use crate::cli::op::Op;

crate::command_enum! {
    (Generate, generate::Generate),
}

pub type KeysCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Keys {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[async_trait::async_trait]
impl Op for Keys {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
