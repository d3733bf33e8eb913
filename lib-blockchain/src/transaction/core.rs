//! Core transaction structures

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use lib_types::{Address, Amount, TxHash};

use crate::script::Script;
use crate::transaction::asset::{AssetDetail, AssetTransfer};
use crate::transaction::attachment::{Attachment, AttachmentPayload};
use crate::transaction::cert::{AssetCert, CertStatus};
use crate::transaction::did::{DidDetail, DidStatus};
use crate::transaction::mit::{Mit, MitStatus};

/// Reference to a specific output of a previous transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Transaction containing the output
    pub tx_hash: TxHash,
    /// Index of the output in that transaction
    pub index: u32,
}

impl OutPoint {
    /// Create a new OutPoint
    pub const fn new(tx_hash: TxHash, index: u32) -> Self {
        Self { tx_hash, index }
    }

    /// The null outpoint a coinbase input carries
    pub const fn null() -> Self {
        Self {
            tx_hash: TxHash::zero(),
            index: u32::MAX,
        }
    }

    /// Check for the coinbase null marker
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX && self.tx_hash.is_zero()
    }
}

/// Transaction input: a previous output reference plus its unlocking script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub previous_output: OutPoint,
    pub script: Script,
}

/// Transaction output: native-coin value, locking script and typed payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Amount,
    pub script: Script,
    pub attachment: Attachment,
}

impl TxOutput {
    // ------------------------------------------------------------------
    // Kind predicates. Exactly one of the twelve leaf kinds holds for any
    // output; the grouped predicates (is_asset, is_did, is_asset_mit) are
    // unions over them.
    // ------------------------------------------------------------------

    pub fn is_etp(&self) -> bool {
        matches!(self.attachment.payload, AttachmentPayload::Etp)
    }

    pub fn is_message(&self) -> bool {
        matches!(self.attachment.payload, AttachmentPayload::Message(_))
    }

    pub fn is_asset(&self) -> bool {
        matches!(
            self.attachment.payload,
            AttachmentPayload::AssetIssue(_)
                | AttachmentPayload::AssetSecondaryIssue(_)
                | AttachmentPayload::AssetTransfer(_)
        )
    }

    pub fn is_asset_issue(&self) -> bool {
        matches!(self.attachment.payload, AttachmentPayload::AssetIssue(_))
    }

    pub fn is_asset_secondaryissue(&self) -> bool {
        matches!(
            self.attachment.payload,
            AttachmentPayload::AssetSecondaryIssue(_)
        )
    }

    pub fn is_asset_transfer(&self) -> bool {
        matches!(self.attachment.payload, AttachmentPayload::AssetTransfer(_))
    }

    pub fn is_asset_cert(&self) -> bool {
        matches!(self.attachment.payload, AttachmentPayload::AssetCert(_))
    }

    /// A certificate output that creates its certificate
    pub fn is_asset_cert_issue(&self) -> bool {
        matches!(
            &self.attachment.payload,
            AttachmentPayload::AssetCert(cert) if cert.status == CertStatus::Issue
        )
    }

    pub fn is_asset_mit(&self) -> bool {
        matches!(self.attachment.payload, AttachmentPayload::Mit(_))
    }

    pub fn is_asset_mit_register(&self) -> bool {
        matches!(
            &self.attachment.payload,
            AttachmentPayload::Mit(mit) if mit.status == MitStatus::Register
        )
    }

    pub fn is_asset_mit_transfer(&self) -> bool {
        matches!(
            &self.attachment.payload,
            AttachmentPayload::Mit(mit) if mit.status == MitStatus::Transfer
        )
    }

    pub fn is_did(&self) -> bool {
        matches!(self.attachment.payload, AttachmentPayload::Did(_))
    }

    pub fn is_did_register(&self) -> bool {
        matches!(
            &self.attachment.payload,
            AttachmentPayload::Did(did) if did.status == DidStatus::Detail
        )
    }

    pub fn is_did_transfer(&self) -> bool {
        matches!(
            &self.attachment.payload,
            AttachmentPayload::Did(did) if did.status == DidStatus::Transferable
        )
    }

    // ------------------------------------------------------------------
    // Accessors. Each yields a value only for its matching kind.
    // ------------------------------------------------------------------

    /// The embedded detail of an issue or secondary-issue output
    pub fn asset_detail(&self) -> Option<&AssetDetail> {
        match &self.attachment.payload {
            AttachmentPayload::AssetIssue(detail)
            | AttachmentPayload::AssetSecondaryIssue(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn asset_issue_detail(&self) -> Option<&AssetDetail> {
        match &self.attachment.payload {
            AttachmentPayload::AssetIssue(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn asset_secondaryissue_detail(&self) -> Option<&AssetDetail> {
        match &self.attachment.payload {
            AttachmentPayload::AssetSecondaryIssue(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn asset_transfer(&self) -> Option<&AssetTransfer> {
        match &self.attachment.payload {
            AttachmentPayload::AssetTransfer(transfer) => Some(transfer),
            _ => None,
        }
    }

    pub fn asset_cert(&self) -> Option<&AssetCert> {
        match &self.attachment.payload {
            AttachmentPayload::AssetCert(cert) => Some(cert),
            _ => None,
        }
    }

    pub fn mit(&self) -> Option<&Mit> {
        match &self.attachment.payload {
            AttachmentPayload::Mit(mit) => Some(mit),
            _ => None,
        }
    }

    pub fn did(&self) -> Option<&DidDetail> {
        match &self.attachment.payload {
            AttachmentPayload::Did(did) => Some(did),
            _ => None,
        }
    }

    /// Symbol of any asset-family payload (asset, certificate, MIT)
    pub fn asset_symbol(&self) -> Option<&str> {
        self.attachment.asset_symbol()
    }

    /// Certificate symbol, for certificate outputs
    pub fn cert_symbol(&self) -> Option<&str> {
        self.asset_cert().map(|cert| cert.symbol.as_str())
    }

    /// DID symbol, for DID outputs
    pub fn did_symbol(&self) -> Option<&str> {
        self.did().map(|did| did.symbol.as_str())
    }

    /// Asset quantity this output moves or creates
    pub fn asset_amount(&self) -> Amount {
        self.attachment.asset_amount()
    }

    /// Destination address of the locking script
    pub fn script_address(&self) -> Option<&Address> {
        self.script.address()
    }
}

/// An ordered sequence of inputs and outputs plus a format version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Double SHA-256 over the canonical encoding
    pub fn hash(&self) -> TxHash {
        let bytes = bincode::serialize(self).unwrap_or_default();
        let first = Sha256::digest(&bytes);
        let second = Sha256::digest(first);
        TxHash::new(second.into())
    }

    /// Canonical encoded size in bytes
    pub fn serialized_size(&self) -> u64 {
        bincode::serialized_size(self).unwrap_or(u64::MAX)
    }

    /// Coinbase: the single input references the null outpoint
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
    }

    /// Sum of native-coin output values
    pub fn total_output_value(&self) -> Amount {
        self.outputs
            .iter()
            .fold(0u64, |sum, output| sum.saturating_add(output.value))
    }

    /// Sum of asset quantities moved or created across outputs
    pub fn total_output_transfer_amount(&self) -> Amount {
        self.outputs
            .iter()
            .fold(0u64, |sum, output| sum.saturating_add(output.asset_amount()))
    }

    pub fn has_asset_transfer(&self) -> bool {
        self.outputs.iter().any(TxOutput::is_asset_transfer)
    }

    pub fn has_did_transfer(&self) -> bool {
        self.outputs.iter().any(TxOutput::is_did_transfer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn etp_output(value: Amount) -> TxOutput {
        TxOutput {
            value,
            script: Script::PayKeyHash {
                address: Address::new("MAhmHtMoLM4GTDBmqqqvRjLPCGCpMgEUDE"),
            },
            attachment: Attachment::new(AttachmentPayload::Etp),
        }
    }

    fn coinbase_tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TxInput {
                previous_output: OutPoint::null(),
                script: Script::Coinbase { data: vec![0u8; 8] },
            }],
            outputs: vec![etp_output(5_000_000_000)],
            lock_time: 0,
        }
    }

    #[test]
    fn test_null_outpoint() {
        assert!(OutPoint::null().is_null());
        assert!(!OutPoint::new(TxHash::new([1u8; 32]), 0).is_null());
        // zero hash alone is not the null marker
        assert!(!OutPoint::new(TxHash::zero(), 0).is_null());
    }

    #[test]
    fn test_coinbase_detection() {
        assert!(coinbase_tx().is_coinbase());

        let mut tx = coinbase_tx();
        tx.inputs[0].previous_output = OutPoint::new(TxHash::new([1u8; 32]), 0);
        assert!(!tx.is_coinbase());
    }

    #[test]
    fn test_total_output_value() {
        let tx = Transaction {
            version: 1,
            inputs: vec![],
            outputs: vec![etp_output(100), etp_output(250)],
            lock_time: 0,
        };
        assert_eq!(tx.total_output_value(), 350);
    }

    #[test]
    fn test_hash_is_stable_and_distinct() {
        let tx = coinbase_tx();
        assert_eq!(tx.hash(), tx.hash());

        let mut other = coinbase_tx();
        other.outputs[0].value += 1;
        assert_ne!(tx.hash(), other.hash());
    }

    #[test]
    fn test_output_kind_partition() {
        let output = etp_output(100);
        assert!(output.is_etp());
        assert!(!output.is_asset());
        assert!(!output.is_asset_cert());
        assert!(!output.is_did());
        assert!(output.asset_detail().is_none());
        assert_eq!(output.asset_amount(), 0);
    }
}
