//! Chain Data Model
//!
//! Core transaction structures for a UTXO chain extended with four asset
//! primitives: fungible assets, asset certificates, MIT identifier tokens
//! and decentralized identifiers (DIDs). Focuses on the data model while
//! delegating admission validation to `lib-mempool`.

pub mod attenuation;
pub mod constants;
pub mod script;
pub mod symbol;
pub mod transaction;

pub use attenuation::AttenuationModel;
pub use script::{Script, ScriptFlags, ScriptPattern, ScriptVerifier};
pub use transaction::{
    AssetCert, AssetDetail, AssetTransfer, Attachment, AttachmentPayload, BusinessKind,
    CertStatus, CertType, DidDetail, DidStatus, Mit, MitStatus, OutPoint, Transaction, TxInput,
    TxOutput,
};
