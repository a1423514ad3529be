use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::libris::new;
use anyhow::{anyhow, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            let dsn = Url::parse(&dsn)?;

            match dsn.scheme() {
                "postgres" | "postgresql" => (),
                scheme => return Err(anyhow!("unsupported DSN scheme: {scheme}")),
            }

            new(port, dsn.to_string(), globals).await?;
        }
    }

    Ok(())
}
