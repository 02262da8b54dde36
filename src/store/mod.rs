//! Persistence boundary.
//!
//! The engine hands finished values over as plain records: big integers
//! as lower-case unprefixed hex, the timing parameter as a decimal
//! string, ids as UUIDs. Stores are thread-safe by contract; the engine
//! serialises writes after parallel work completes.

mod sqlite;

pub use sqlite::SqliteStore;

use std::sync::Mutex;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, DatabaseKind};
use crate::error::{TimeLockError, TimeLockResult};
use crate::mpc::to_hex;
use crate::puzzle::Puzzle;
use crate::rsa::RsaKey;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaRecord {
    pub id: String,
    pub p: String,
    pub q: String,
    #[serde(rename = "N")]
    pub n: String,
    pub phi: String,
}

impl RsaRecord {
    pub fn from_key(key: &RsaKey) -> Self {
        RsaRecord {
            id: Uuid::new_v4().to_string(),
            p: to_hex(key.p()),
            q: to_hex(key.q()),
            n: to_hex(key.modulus()),
            phi: to_hex(key.phi()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub id: String,
    pub x: String,
    pub y: String,
    /// Base-10, since t counts squarings rather than naming a group
    /// element.
    pub t: String,
    #[serde(rename = "N")]
    pub n: String,
    /// Filled in by the downstream consumer, never by the engine.
    pub request_id: Option<String>,
    pub rsa_id: String,
}

impl PuzzleRecord {
    pub fn new(puzzle: &Puzzle, y: &BigUint, rsa_id: &str) -> Self {
        PuzzleRecord {
            id: Uuid::new_v4().to_string(),
            x: to_hex(puzzle.x()),
            y: to_hex(y),
            t: puzzle.t().to_string(),
            n: to_hex(puzzle.modulus()),
            request_id: None,
            rsa_id: rsa_id.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VdfRecord {
    pub id: String,
    pub request_id: Option<String>,
    pub modulus: String,
    pub input: String,
    pub output: String,
    /// Checkpoints in segment order, hex-encoded.
    pub proof: Vec<String>,
}

impl VdfRecord {
    pub fn new(puzzle: &Puzzle, y: &BigUint, proof: &[BigUint]) -> Self {
        VdfRecord {
            id: Uuid::new_v4().to_string(),
            request_id: None,
            modulus: to_hex(puzzle.modulus()),
            input: to_hex(puzzle.x()),
            output: to_hex(y),
            proof: proof.iter().map(to_hex).collect(),
        }
    }
}

pub trait PuzzleStore: Send + Sync {
    fn save_rsa(&self, record: &RsaRecord) -> TimeLockResult<()>;
    fn save_puzzle(&self, record: &PuzzleRecord) -> TimeLockResult<()>;
    fn save_vdf(&self, record: &VdfRecord) -> TimeLockResult<()>;
}

/// Open the store selected by configuration.
pub fn open_store(config: &Config) -> TimeLockResult<Box<dyn PuzzleStore>> {
    match config.database.kind {
        DatabaseKind::Sqlite => Ok(Box::new(SqliteStore::open(&config.database.name)?)),
        DatabaseKind::Postgresql => Err(TimeLockError::StoreError(
            "postgresql backend is not available in this build; set DATABASE_TYPE=sqlite"
                .to_string(),
        )),
    }
}

/// In-memory store, mainly for tests. Enforces the same one-key-per-
/// puzzle constraint as the schema.
#[derive(Default)]
pub struct MemoryStore {
    rsa_keys: Mutex<Vec<RsaRecord>>,
    puzzles: Mutex<Vec<PuzzleRecord>>,
    vdfs: Mutex<Vec<VdfRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rsa_keys(&self) -> Vec<RsaRecord> {
        self.rsa_keys.lock().expect("store mutex poisoned").clone()
    }

    pub fn puzzles(&self) -> Vec<PuzzleRecord> {
        self.puzzles.lock().expect("store mutex poisoned").clone()
    }

    pub fn vdfs(&self) -> Vec<VdfRecord> {
        self.vdfs.lock().expect("store mutex poisoned").clone()
    }
}

impl PuzzleStore for MemoryStore {
    fn save_rsa(&self, record: &RsaRecord) -> TimeLockResult<()> {
        let mut keys = self
            .rsa_keys
            .lock()
            .map_err(|e| TimeLockError::StoreError(e.to_string()))?;
        keys.push(record.clone());
        Ok(())
    }

    fn save_puzzle(&self, record: &PuzzleRecord) -> TimeLockResult<()> {
        let mut puzzles = self
            .puzzles
            .lock()
            .map_err(|e| TimeLockError::StoreError(e.to_string()))?;
        if puzzles.iter().any(|p| p.rsa_id == record.rsa_id) {
            return Err(TimeLockError::StoreError(format!(
                "rsa key {} already has a puzzle",
                record.rsa_id
            )));
        }
        puzzles.push(record.clone());
        Ok(())
    }

    fn save_vdf(&self, record: &VdfRecord) -> TimeLockResult<()> {
        let mut vdfs = self
            .vdfs
            .lock()
            .map_err(|e| TimeLockError::StoreError(e.to_string()))?;
        vdfs.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpc::{from_dec, from_hex, mpz};
    use crate::puzzle::PuzzleBuilder;

    fn sample() -> (Puzzle, RsaKey, BigUint) {
        let key = RsaKey::from_primes(mpz(7), mpz(3));
        let puzzle = PuzzleBuilder::new()
            .x(mpz(5))
            .t(mpz(2))
            .modulus(mpz(21))
            .build()
            .unwrap();
        (puzzle, key, mpz(16))
    }

    #[test]
    fn test_records_use_canonical_encodings() {
        let (puzzle, key, y) = sample();
        let rsa_record = RsaRecord::from_key(&key);
        let puzzle_record = PuzzleRecord::new(&puzzle, &y, &rsa_record.id);

        assert_eq!(rsa_record.p, "7");
        assert_eq!(rsa_record.n, "15"); // 21 = 0x15
        assert_eq!(rsa_record.phi, "c"); // 12 = 0xc
        assert_eq!(puzzle_record.t, "2");
        assert_eq!(puzzle_record.y, "10"); // 16 = 0x10
        assert!(puzzle_record.request_id.is_none());

        // Values survive the boundary numerically
        assert_eq!(from_hex(&puzzle_record.n).unwrap(), mpz(21));
        assert_eq!(from_dec(&puzzle_record.t).unwrap(), mpz(2));
    }

    #[test]
    fn test_record_ids_are_unique() {
        let (_, key, _) = sample();
        let a = RsaRecord::from_key(&key);
        let b = RsaRecord::from_key(&key);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let (puzzle, key, y) = sample();
        let store = MemoryStore::new();

        let rsa_record = RsaRecord::from_key(&key);
        let puzzle_record = PuzzleRecord::new(&puzzle, &y, &rsa_record.id);
        store.save_rsa(&rsa_record).unwrap();
        store.save_puzzle(&puzzle_record).unwrap();

        assert_eq!(store.rsa_keys(), vec![rsa_record]);
        assert_eq!(store.puzzles(), vec![puzzle_record]);
    }

    #[test]
    fn test_memory_store_rejects_second_puzzle_for_key() {
        let (puzzle, key, y) = sample();
        let store = MemoryStore::new();

        let rsa_record = RsaRecord::from_key(&key);
        store.save_rsa(&rsa_record).unwrap();
        store
            .save_puzzle(&PuzzleRecord::new(&puzzle, &y, &rsa_record.id))
            .unwrap();

        let second = PuzzleRecord::new(&puzzle, &y, &rsa_record.id);
        assert!(matches!(
            store.save_puzzle(&second),
            Err(TimeLockError::StoreError(_))
        ));
    }

    #[test]
    fn test_vdf_record_carries_proof_in_order() {
        let (puzzle, _, y) = sample();
        let record = VdfRecord::new(&puzzle, &y, &[mpz(4), mpz(16)]);
        assert_eq!(record.proof, vec!["4".to_string(), "10".to_string()]);
        assert!(record.request_id.is_none());
    }
}
