//! Wire packets exchanged between nodes.
//!
//! Payloads are opaque bytes; only the receive path re-interprets them, and
//! only for `EncryptedData`. Everything here serializes cleanly so the API
//! layer can hand packets to clients as JSON.

use std::fmt;

use qnet_core::PairId;
use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// What a packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    Entanglement,
    KeyExchange,
    EncryptedData,
    ErrorCorrection,
}

impl PacketKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Entanglement => "entanglement",
            Self::KeyExchange => "key_exchange",
            Self::EncryptedData => "encrypted_data",
            Self::ErrorCorrection => "error_correction",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of simulated network traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub kind: PacketKind,
    pub sender: NodeId,
    pub receiver: NodeId,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Announces a freshly registered pair; the payload is the pair id.
    pub fn entanglement(sender: NodeId, receiver: NodeId, pair: PairId) -> Self {
        Self {
            kind: PacketKind::Entanglement,
            sender,
            receiver,
            payload: pair.0.to_le_bytes().to_vec(),
        }
    }

    /// Announces an agreed key; the payload is the key length in bytes.
    pub fn key_exchange(sender: NodeId, receiver: NodeId, key_len: usize) -> Self {
        Self {
            kind: PacketKind::KeyExchange,
            sender,
            receiver,
            payload: (key_len as u32).to_le_bytes().to_vec(),
        }
    }

    /// Carries XOR-encrypted message bytes.
    pub fn encrypted(sender: NodeId, receiver: NodeId, ciphertext: Vec<u8>) -> Self {
        Self {
            kind: PacketKind::EncryptedData,
            sender,
            receiver,
            payload: ciphertext,
        }
    }

    /// Carries repetition-coded logical bits.
    pub fn error_correction(sender: NodeId, receiver: NodeId, coded: Vec<u8>) -> Self {
        Self {
            kind: PacketKind::ErrorCorrection,
            sender,
            receiver,
            payload: coded,
        }
    }
}
