//! Transaction management module
//!
//! Transaction structures, output attachments and the asset-family records
//! they embed.

pub mod asset;
pub mod attachment;
pub mod cert;
pub mod core;
pub mod did;
pub mod mit;

pub use asset::{
    is_secondary_issue_owns_enough, AssetDetail, AssetTransfer, THRESHOLD_FORBIDDEN,
    THRESHOLD_FREELY_ISSUABLE,
};
pub use attachment::{Attachment, AttachmentPayload, BusinessKind};
pub use cert::{has_cert, test_certs, AssetCert, CertStatus, CertType};
pub use core::{OutPoint, Transaction, TxInput, TxOutput};
pub use did::{DidDetail, DidStatus};
pub use mit::{Mit, MitStatus};
