//! Account operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Account, AccountType};

impl Database {
    /// Insert an account or return the existing one with the same name
    pub fn upsert_account(&self, name: &str, account_type: Option<AccountType>) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM accounts WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO accounts (name, account_type) VALUES (?, ?)",
            params![name, account_type.map(|t| t.as_str())],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all accounts
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, name, account_type, created_at FROM accounts ORDER BY name",
        )?;

        let accounts = stmt
            .query_map([], |row| {
                let type_str: Option<String> = row.get(2)?;
                let created_at_str: String = row.get(3)?;

                Ok(Account {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    account_type: type_str.and_then(|s| s.parse().ok()),
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get account by ID
    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT id, name, account_type, created_at FROM accounts WHERE id = ?",
                params![id],
                |row| {
                    let type_str: Option<String> = row.get(2)?;
                    let created_at_str: String = row.get(3)?;

                    Ok(Account {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        account_type: type_str.and_then(|s| s.parse().ok()),
                        created_at: parse_datetime(&created_at_str),
                    })
                },
            )
            .optional()?;

        Ok(result)
    }
}
