use crate::database::{parse_column, AsyncDbConnection};
use anyhow::Result;
use rusqlite::params;
use shared_types::{MonthlySummary, Transaction, TransactionType};

pub async fn insert_transaction(conn: AsyncDbConnection, transaction: &Transaction) -> Result<i64> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let id: i64 = conn.query_row(
        "INSERT INTO transactions
         (user_id, amount, transaction_type, category, transaction_date, description, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
        params![
            &transaction.user_id,
            transaction.amount,
            transaction.transaction_type.as_str(),
            &transaction.category,
            &transaction.transaction_date,
            &transaction.description,
            now,
        ],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// The user's transactions dated within `[since, until]` (inclusive, `YYYY-MM-DD`)
pub async fn list_transactions_between(
    conn: AsyncDbConnection,
    user_id: &str,
    since: &str,
    until: &str,
) -> Result<Vec<Transaction>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(
        "SELECT id, user_id, amount, transaction_type, category, transaction_date, description
         FROM transactions
         WHERE user_id = ? AND substr(transaction_date, 1, 10) BETWEEN ? AND ?
         ORDER BY transaction_date ASC",
    )?;

    let transactions = stmt
        .query_map(params![user_id, since, until], |row| {
            Ok(Transaction {
                id: row.get(0)?,
                user_id: row.get(1)?,
                amount: row.get(2)?,
                transaction_type: parse_column(3, row.get(3)?)?,
                category: row.get(4)?,
                transaction_date: row.get(5)?,
                description: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}

/// Income and expense totals per calendar month up to `until`, newest month first
pub async fn list_monthly_summaries(
    conn: AsyncDbConnection,
    user_id: &str,
    until: &str,
    limit: usize,
) -> Result<Vec<MonthlySummary>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(
        "SELECT substr(transaction_date, 1, 7) AS month,
                COALESCE(SUM(CASE WHEN transaction_type = ? THEN ABS(amount) ELSE 0.0 END), 0),
                COALESCE(SUM(CASE WHEN transaction_type = ? THEN ABS(amount) ELSE 0.0 END), 0)
         FROM transactions
         WHERE user_id = ? AND substr(transaction_date, 1, 10) <= ?
         GROUP BY month
         ORDER BY month DESC
         LIMIT ?",
    )?;

    let summaries = stmt
        .query_map(
            params![
                TransactionType::Income.as_str(),
                TransactionType::Expense.as_str(),
                user_id,
                until,
                limit as i64,
            ],
            |row| {
                let month: String = row.get(0)?;
                let income: f64 = row.get(1)?;
                let expenses: f64 = row.get(2)?;
                Ok(MonthlySummary::new(month, income, expenses))
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(summaries)
}
