use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::commit::{CommitOptions, CommitOutcome, generate_and_commit};

#[derive(Debug, Clone)]
pub struct CommitCommandArgs {
    pub print: bool,
}

pub async fn run(ctx: &AppContext, args: CommitCommandArgs) -> AppResult<CommitOutcome> {
    generate_and_commit(
        ctx,
        CommitOptions {
            print_only: args.print,
        },
    )
    .await
}
