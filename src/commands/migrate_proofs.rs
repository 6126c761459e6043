//! Migrate-proofs command - batch move of inline proof bytes to the
//! configured storage backend.
//!
//! Idempotent by construction: only rows with non-empty inline bytes are
//! selected, and a migrated row's inline column is zeroed in the same
//! update that records its storage key. Re-running skips everything
//! already moved.

use bytes::Bytes;

use crate::cli::args::MigrateProofsArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{proof_key, select_backend, Database, Persistence, UnitOfWork};

/// Execute the migrate-proofs command
pub async fn execute(args: MigrateProofsArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let storage = select_backend(&config)?;
    let uow = Persistence::new(db.get_connection());

    let mut migrated = 0u64;
    let mut failed = 0u64;

    loop {
        let batch = uow.proofs().list_unmigrated(args.batch_size).await?;
        if batch.is_empty() {
            break;
        }

        let mut moved_this_batch = 0u64;

        for proof in batch {
            let Some(data) = proof.data else {
                continue;
            };

            if args.dry_run {
                println!("{}\t{}\t{} bytes", proof.id, proof.filename, data.len());
                migrated += 1;
                continue;
            }

            let key = proof
                .storage_key
                .clone()
                .unwrap_or_else(|| proof_key(&proof.filename));

            match storage.put(&key, Bytes::from(data)).await {
                Ok(()) => {
                    uow.proofs().mark_migrated(proof.id, key).await?;
                    migrated += 1;
                    moved_this_batch += 1;
                }
                Err(e) => {
                    // Leave the row untouched; the next run retries it
                    tracing::error!(proof = %proof.id, error = %e, "proof upload failed");
                    failed += 1;
                }
            }
        }

        if args.dry_run {
            // Dry runs never shrink the unmigrated set, one batch is enough
            break;
        }

        // A batch where nothing moved would re-select the same rows forever
        if moved_this_batch == 0 {
            tracing::warn!(failed, "stopping: nothing in the last batch could be uploaded");
            break;
        }
    }

    tracing::info!(migrated, failed, dry_run = args.dry_run, "proof migration finished");
    println!(
        "{} proof(s) {}, {} failed",
        migrated,
        if args.dry_run { "would migrate" } else { "migrated" },
        failed
    );

    Ok(())
}
