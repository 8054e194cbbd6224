#![allow(dead_code)]

use layout_consensus::Layout;
use serde_derive::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestLayout {
    pub epoch: u64,
    pub servers: Vec<String>,
}

impl TestLayout {
    pub fn single(port: u16) -> Self {
        TestLayout {
            epoch: 0,
            servers: vec![format!("localhost:{}", port)],
        }
    }

    pub fn at(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }
}

impl Layout for TestLayout {
    fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Deterministic proposer IDs, ordered by `byte`.
pub fn proposer(byte: u8) -> Uuid {
    Uuid::from_bytes([byte; 16])
}

