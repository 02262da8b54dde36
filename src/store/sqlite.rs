//! sqlite-backed store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};

use crate::error::{TimeLockError, TimeLockResult};

use super::{PuzzleRecord, PuzzleStore, RsaRecord, VdfRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rsa_keys (
    id   TEXT PRIMARY KEY,
    p    TEXT NOT NULL,
    q    TEXT NOT NULL,
    n    TEXT NOT NULL,
    phi  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS time_lock_puzzles (
    id         TEXT PRIMARY KEY,
    x          TEXT NOT NULL,
    y          TEXT NOT NULL,
    n          TEXT NOT NULL,
    t          TEXT NOT NULL,
    request_id TEXT,
    rsa_id     TEXT NOT NULL UNIQUE REFERENCES rsa_keys (id)
);
CREATE TABLE IF NOT EXISTS verifiable_delay_functions (
    id         TEXT PRIMARY KEY,
    request_id TEXT,
    modulus    TEXT NOT NULL,
    input      TEXT NOT NULL,
    output     TEXT NOT NULL,
    proof      TEXT NOT NULL
);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> TimeLockResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> TimeLockResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TimeLockError::StoreError(e.to_string()))
    }
}

impl PuzzleStore for SqliteStore {
    fn save_rsa(&self, record: &RsaRecord) -> TimeLockResult<()> {
        self.conn()?.execute(
            "INSERT INTO rsa_keys (id, p, q, n, phi) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![record.id, record.p, record.q, record.n, record.phi],
        )?;
        Ok(())
    }

    fn save_puzzle(&self, record: &PuzzleRecord) -> TimeLockResult<()> {
        self.conn()?.execute(
            "INSERT INTO time_lock_puzzles (id, x, y, n, t, request_id, rsa_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.x,
                record.y,
                record.n,
                record.t,
                record.request_id,
                record.rsa_id
            ],
        )?;
        Ok(())
    }

    fn save_vdf(&self, record: &VdfRecord) -> TimeLockResult<()> {
        let proof_json = serde_json::to_string(&record.proof)?;
        self.conn()?.execute(
            "INSERT INTO verifiable_delay_functions (id, request_id, modulus, input, output, proof)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.request_id,
                record.modulus,
                record.input,
                record.output,
                proof_json
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpc::mpz;
    use crate::puzzle::PuzzleBuilder;
    use crate::rsa::RsaKey;

    fn sample_records() -> (RsaRecord, PuzzleRecord, VdfRecord) {
        let key = RsaKey::from_primes(mpz(7), mpz(3));
        let puzzle = PuzzleBuilder::new()
            .x(mpz(5))
            .t(mpz(2))
            .modulus(mpz(21))
            .build()
            .unwrap();

        let rsa_record = RsaRecord::from_key(&key);
        let puzzle_record = PuzzleRecord::new(&puzzle, &mpz(16), &rsa_record.id);
        let vdf_record = VdfRecord::new(&puzzle, &mpz(16), &[mpz(16)]);
        (rsa_record, puzzle_record, vdf_record)
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puzzles.db");
        let (rsa_record, puzzle_record, vdf_record) = sample_records();

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save_rsa(&rsa_record).unwrap();
            store.save_puzzle(&puzzle_record).unwrap();
            store.save_vdf(&vdf_record).unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        let (x, t, request_id): (String, String, Option<String>) = conn
            .query_row(
                "SELECT x, t, request_id FROM time_lock_puzzles WHERE id = ?1",
                params![puzzle_record.id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(x, "5");
        assert_eq!(t, "2");
        assert!(request_id.is_none());

        let proof_json: String = conn
            .query_row(
                "SELECT proof FROM verifiable_delay_functions WHERE id = ?1",
                params![vdf_record.id],
                |row| row.get(0),
            )
            .unwrap();
        let proof: Vec<String> = serde_json::from_str(&proof_json).unwrap();
        assert_eq!(proof, vec!["10".to_string()]);
    }

    #[test]
    fn test_second_puzzle_for_same_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("puzzles.db")).unwrap();
        let (rsa_record, puzzle_record, _) = sample_records();

        store.save_rsa(&rsa_record).unwrap();
        store.save_puzzle(&puzzle_record).unwrap();

        let mut second = puzzle_record.clone();
        second.id = uuid::Uuid::new_v4().to_string();
        assert!(matches!(
            store.save_puzzle(&second),
            Err(TimeLockError::StoreError(_))
        ));
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("puzzles.db");
        SqliteStore::open(&path).unwrap();
        SqliteStore::open(&path).unwrap();
    }
}
