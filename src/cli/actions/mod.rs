pub mod server;

mod run;

/// What the process was asked to do.
#[derive(Debug)]
pub enum Action {
    /// Serve REST and gRPC until Ctrl-C.
    Server(server::Args),
}

impl Action {
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
