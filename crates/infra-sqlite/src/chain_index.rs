// SQLite Chain Index - Gateway implementation

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use webrpc_core::domain::{
    Address, Block, BlockSeq, BlockchainStatus, DomainError, UnspentOutput,
};
use webrpc_core::error::{AppError, Result};
use webrpc_core::port::{Gateway, TimeProvider};

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "787" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::NotFound("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// SQLite stores INTEGER as i64; values past i64::MAX never occur in the index
fn to_sql_int(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn from_sql_int(column: &str, v: i64) -> Result<u64> {
    u64::try_from(v)
        .map_err(|_| AppError::Database(format!("negative value {} in column {}", v, column)))
}

/// Read-only chain index backed by SQLite
///
/// The indexer side (`insert_block`, `insert_output`, `spend_output`) lives
/// here too so tests and tools can populate the same schema.
pub struct SqliteChainIndex {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteChainIndex {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    pub async fn insert_block(&self, block: &Block) -> Result<()> {
        let transactions = serde_json::to_string(&block.transactions)?;

        sqlx::query(
            r#"
            INSERT INTO blocks (seq, hash, prev_hash, time, fee, transactions)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(to_sql_int(block.seq))
        .bind(&block.hash)
        .bind(&block.prev_hash)
        .bind(block.time)
        .bind(to_sql_int(block.fee))
        .bind(transactions)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(seq = block.seq, hash = %block.hash, "Indexed block");
        Ok(())
    }

    pub async fn insert_output(&self, output: &UnspentOutput) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO unspent_outputs (hash, src_tx, address, coins, hours, block_seq)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&output.hash)
        .bind(&output.src_tx)
        .bind(output.address.to_base58())
        .bind(to_sql_int(output.coins))
        .bind(to_sql_int(output.hours))
        .bind(to_sql_int(output.block_seq))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    /// Remove an output from the unspent set
    ///
    /// Returns false if it was not unspent.
    pub async fn spend_output(&self, hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM unspent_outputs WHERE hash = ?")
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn head(&self) -> Result<Option<Block>> {
        let row = sqlx::query_as::<_, BlockRow>("SELECT * FROM blocks ORDER BY seq DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(BlockRow::into_block).transpose()
    }
}

#[async_trait]
impl Gateway for SqliteChainIndex {
    async fn status(&self) -> Result<BlockchainStatus> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blocks")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let Some(head) = self.head().await? else {
            return Ok(BlockchainStatus::new(0, "", Duration::ZERO));
        };

        // Clock skew can put the head in the future
        let elapsed = (self.time_provider.now_secs() - head.time).max(0);
        Ok(BlockchainStatus::new(
            from_sql_int("count", count)?,
            head.hash,
            Duration::from_secs(elapsed as u64),
        ))
    }

    async fn last_blocks(&self, num: u64) -> Result<Vec<Block>> {
        if num == 0 {
            return Ok(Vec::new());
        }

        let rows: Vec<BlockRow> = sqlx::query_as(
            r#"
            SELECT * FROM (SELECT * FROM blocks ORDER BY seq DESC LIMIT ?)
            ORDER BY seq ASC
            "#,
        )
        .bind(to_sql_int(num))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(BlockRow::into_block).collect()
    }

    async fn blocks(&self, start: BlockSeq, end: BlockSeq) -> Result<Vec<Block>> {
        if start > end {
            return Err(DomainError::InvalidBlockRange { start, end }.into());
        }

        let rows: Vec<BlockRow> =
            sqlx::query_as("SELECT * FROM blocks WHERE seq BETWEEN ? AND ? ORDER BY seq ASC")
                .bind(to_sql_int(start))
                .bind(to_sql_int(end))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter().map(BlockRow::into_block).collect()
    }

    async fn unspent_outputs(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        // One JSON array parameter, so the list length is not bounded by
        // SQLite's host parameter limit
        let encoded: Vec<String> = addresses.iter().map(Address::to_base58).collect();
        let encoded = serde_json::to_string(&encoded)?;

        let rows: Vec<OutputRow> = sqlx::query_as(
            r#"
            SELECT * FROM unspent_outputs
            WHERE address IN (SELECT value FROM json_each(?))
            ORDER BY block_seq, hash
            "#,
        )
        .bind(encoded)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(OutputRow::into_output).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BlockRow {
    seq: i64,
    hash: String,
    prev_hash: String,
    time: i64,
    fee: i64,
    transactions: String,
}

impl BlockRow {
    fn into_block(self) -> Result<Block> {
        Ok(Block {
            seq: from_sql_int("seq", self.seq)?,
            hash: self.hash,
            prev_hash: self.prev_hash,
            time: self.time,
            fee: from_sql_int("fee", self.fee)?,
            transactions: serde_json::from_str(&self.transactions)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OutputRow {
    hash: String,
    src_tx: String,
    address: String,
    coins: i64,
    hours: i64,
    block_seq: i64,
}

impl OutputRow {
    fn into_output(self) -> Result<UnspentOutput> {
        Ok(UnspentOutput {
            // A bad address here is index corruption, not a caller error
            address: Address::from_base58(&self.address).map_err(|e| {
                AppError::Database(format!("corrupt address '{}' in index: {}", self.address, e))
            })?,
            coins: from_sql_int("coins", self.coins)?,
            hours: from_sql_int("hours", self.hours)?,
            block_seq: from_sql_int("block_seq", self.block_seq)?,
            hash: self.hash,
            src_tx: self.src_tx,
        })
    }
}
