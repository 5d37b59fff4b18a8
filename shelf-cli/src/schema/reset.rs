use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use colored::Colorize;
use log::{debug, info};
use shelf_reset::SchemaResetExecutor;

use crate::Runnable;

use super::StoreArgs;

/// Drops and recreates the products table, discarding all of its rows
#[derive(Parser)]
pub struct ResetSchema {
    #[clap(flatten)]
    pub store: StoreArgs,
    /// Gives up if the reset has not committed within this many seconds
    #[clap(long)]
    pub timeout: Option<u64>,
    /// Skips checking the new table against the store's catalog
    #[clap(long)]
    pub no_verify: bool,
    /// Prints the statements for the connected store without running them
    #[clap(long)]
    pub dry_run: bool,
}

#[async_trait]
impl Runnable for ResetSchema {
    async fn run(&mut self) -> Result<()> {
        let config = self.store.config().await?;
        let mut conn = self.store.connect(&config).await?;

        let executor = SchemaResetExecutor::new()
            .verify(!self.no_verify && config.verify.unwrap_or(true))
            .timeout(self.timeout.or(config.timeout_secs).map(Duration::from_secs));

        if self.dry_run {
            print!("{}", executor.connected_plan(&mut conn).await?);
            return Ok(());
        }

        let report = executor.reset(&mut conn).await?;
        debug!("{:?}", report);
        info!(
            "{} `{}` on {}{}",
            if report.replaced_existing {
                "recreated"
            } else {
                "created"
            }
            .green(),
            executor.table().table_name,
            report.dialect,
            if report.verified { ", verified" } else { "" }
        );

        Ok(())
    }

    fn is_verbose(&self) -> bool {
        self.store.verbose
    }
}
