//! Output Attachments
//!
//! Every output carries an attachment selecting exactly one payload kind.
//! Kind predicates are pattern matches and accessors return `Option`, so an
//! access for the wrong kind cannot produce a value.

use serde::{Deserialize, Serialize};

use lib_types::Amount;

use crate::constants::{ATTACH_INIT_VERSION, DID_ATTACH_VERIFY_VERSION};
use crate::transaction::asset::{AssetDetail, AssetTransfer};
use crate::transaction::cert::AssetCert;
use crate::transaction::did::DidDetail;
use crate::transaction::mit::Mit;

/// The business a transaction's inputs were engaged in, latched while
/// resolving them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BusinessKind {
    #[default]
    Etp,
    AssetIssue,
    AssetTransfer,
    AssetCert,
    AssetMit,
    DidRegister,
    DidTransfer,
}

/// The typed payload of an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentPayload {
    /// Plain native-coin value
    Etp,
    /// Free-form on-chain note
    Message(String),
    /// Creation of a new asset
    AssetIssue(AssetDetail),
    /// Additional issuance of an existing asset
    AssetSecondaryIssue(AssetDetail),
    /// Asset movement
    AssetTransfer(AssetTransfer),
    /// Certificate carry, issuance or hand-over (see its status)
    AssetCert(AssetCert),
    /// MIT registration or transfer (see its status)
    Mit(Mit),
    /// DID registration or transfer (see its status)
    Did(DidDetail),
}

/// Typed payload plus the DID envelope shared by every kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment format version
    pub version: u32,
    /// Sender DID; empty when unset
    pub from_did: String,
    /// Receiver DID; empty when unset
    pub to_did: String,
    pub payload: AttachmentPayload,
}

impl Attachment {
    /// Attachment with no DID envelope
    pub fn new(payload: AttachmentPayload) -> Self {
        Self {
            version: ATTACH_INIT_VERSION,
            from_did: String::new(),
            to_did: String::new(),
            payload,
        }
    }

    /// Attachment in DID-verify form: the validator will check the DID
    /// bindings against the chain
    pub fn with_dids(
        payload: AttachmentPayload,
        from_did: impl Into<String>,
        to_did: impl Into<String>,
    ) -> Self {
        Self {
            version: DID_ATTACH_VERIFY_VERSION,
            from_did: from_did.into(),
            to_did: to_did.into(),
            payload,
        }
    }

    /// Structural validity of the attachment itself, independent of chain
    /// state. Nova-version transactions require this of every output.
    pub fn is_valid(&self) -> bool {
        if self.version != ATTACH_INIT_VERSION && self.version != DID_ATTACH_VERIFY_VERSION {
            return false;
        }
        if self.version == DID_ATTACH_VERIFY_VERSION && self.to_did.is_empty() {
            return false;
        }
        match &self.payload {
            AttachmentPayload::Etp => true,
            AttachmentPayload::Message(_) => true,
            AttachmentPayload::AssetIssue(detail)
            | AttachmentPayload::AssetSecondaryIssue(detail) => {
                !detail.symbol.is_empty() && detail.maximum_supply > 0 && !detail.address.is_empty()
            }
            AttachmentPayload::AssetTransfer(transfer) => {
                !transfer.symbol.is_empty() && transfer.quantity > 0
            }
            AttachmentPayload::AssetCert(cert) => {
                !cert.symbol.is_empty() && !cert.owner.is_empty() && !cert.address.is_empty()
            }
            AttachmentPayload::Mit(mit) => !mit.symbol.is_empty() && !mit.address.is_empty(),
            AttachmentPayload::Did(did) => !did.symbol.is_empty() && !did.address.is_empty(),
        }
    }

    /// Asset quantity this attachment moves or creates
    pub fn asset_amount(&self) -> Amount {
        match &self.payload {
            AttachmentPayload::AssetIssue(detail)
            | AttachmentPayload::AssetSecondaryIssue(detail) => detail.maximum_supply,
            AttachmentPayload::AssetTransfer(transfer) => transfer.quantity,
            _ => 0,
        }
    }

    /// Symbol of the asset-family payloads (asset, certificate, MIT)
    pub fn asset_symbol(&self) -> Option<&str> {
        match &self.payload {
            AttachmentPayload::AssetIssue(detail)
            | AttachmentPayload::AssetSecondaryIssue(detail) => Some(&detail.symbol),
            AttachmentPayload::AssetTransfer(transfer) => Some(&transfer.symbol),
            AttachmentPayload::AssetCert(cert) => Some(&cert.symbol),
            AttachmentPayload::Mit(mit) => Some(&mit.symbol),
            _ => None,
        }
    }
}
