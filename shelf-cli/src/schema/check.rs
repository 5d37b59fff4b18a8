use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use colored::Colorize;
use log::info;
use shelf_reset::{SchemaError, SchemaResetExecutor, StoreState};

use crate::Runnable;

use super::StoreArgs;

/// Compares the products table against the expected schema without changing it
#[derive(Parser)]
pub struct CheckSchema {
    #[clap(flatten)]
    pub store: StoreArgs,
}

#[async_trait]
impl Runnable for CheckSchema {
    async fn run(&mut self) -> Result<()> {
        let config = self.store.config().await?;
        let mut conn = self.store.connect(&config).await?;

        let executor = SchemaResetExecutor::new();
        let mismatches = executor.check(&mut conn).await?;
        let table = executor.table().table_name.clone();

        if !mismatches.is_empty() {
            return Err(SchemaError::SchemaMismatch {
                table,
                mismatches,
                state: StoreState::Unchanged,
            }
            .into());
        }

        info!("`{}` {}", table, "matches".green());

        Ok(())
    }

    fn is_verbose(&self) -> bool {
        self.store.verbose
    }
}
