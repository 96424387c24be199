use crate::error::{Error, Result};
use crate::protocol::transaction::contract::ContractType;
use crate::protocol::transaction::{Contract, Raw};
use crate::protocol::{Transaction, TransactionExtention};
use crate::wallet::Signer;
use prost::Message;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// `sha256(raw_data_bytes)`.
pub type TxId = [u8; 32];

/// Transaction handed to the broadcast workflow, either bare or as returned by a build RPC.
#[derive(Debug, Clone)]
pub enum TxInput {
    Raw(Transaction),
    Extended(TransactionExtention),
}

impl TxInput {
    /// Normalizes to the bare transaction.
    pub fn into_transaction(self) -> Result<Transaction> {
        match self {
            TxInput::Raw(tx) => Ok(tx),
            TxInput::Extended(ext) => ext.transaction.ok_or_else(|| {
                Error::InvalidParameter("transaction extension carries no transaction".into())
            }),
        }
    }
}

impl From<Transaction> for TxInput {
    fn from(tx: Transaction) -> Self {
        TxInput::Raw(tx)
    }
}

impl From<TransactionExtention> for TxInput {
    fn from(ext: TransactionExtention) -> Self {
        TxInput::Extended(ext)
    }
}

/// Computes the id of a transaction body. Signatures never contribute.
pub fn txid(raw: &Raw) -> TxId {
    Sha256::digest(raw.encode_to_vec()).into()
}

/// [`txid`] of `tx.raw_data`.
pub fn transaction_id(tx: &Transaction) -> Result<TxId> {
    tx.raw_data
        .as_ref()
        .map(txid)
        .ok_or_else(|| Error::InvalidParameter("transaction has no raw_data".into()))
}

pub fn txid_hex(id: &TxId) -> String {
    hex::encode(id)
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// Checks the shape the workflow needs: one contract and an expiration in the future.
pub fn validate(tx: &Transaction) -> Result<&Raw> {
    let raw = tx
        .raw_data
        .as_ref()
        .ok_or_else(|| Error::InvalidParameter("transaction has no raw_data".into()))?;
    if raw.contract.len() != 1 {
        return Err(Error::InvalidParameter(format!(
            "transaction must carry exactly one contract, got {}",
            raw.contract.len()
        )));
    }
    let now = now_millis();
    if raw.expiration <= now {
        return Err(Error::InvalidParameter(format!(
            "transaction expired: expiration={} now={now}",
            raw.expiration
        )));
    }
    Ok(raw)
}

/// The single contract of a validated transaction.
pub fn contract(tx: &Transaction) -> Result<&Contract> {
    validate(tx)?
        .contract
        .first()
        .ok_or_else(|| Error::InvalidParameter("transaction has no contract".into()))
}

pub fn contract_type(c: &Contract) -> Option<ContractType> {
    ContractType::try_from(c.r#type).ok()
}

/// Writes `permission_id` on every contract of the body. Invalidates previous txids.
pub fn set_permission_id(tx: &mut Transaction, permission_id: i32) -> Result<()> {
    let raw = raw_mut(tx)?;
    for c in &mut raw.contract {
        c.permission_id = permission_id;
    }
    Ok(())
}

/// Invalidates previous txids.
pub fn set_fee_limit(tx: &mut Transaction, fee_limit_sun: i64) -> Result<()> {
    raw_mut(tx)?.fee_limit = fee_limit_sun.max(0);
    Ok(())
}

fn raw_mut(tx: &mut Transaction) -> Result<&mut Raw> {
    tx.raw_data
        .as_mut()
        .ok_or_else(|| Error::InvalidParameter("transaction has no raw_data".into()))
}

/// Recomputes the txid, signs it, and appends the signature. Returns the signed txid.
pub fn sign_transaction(tx: &mut Transaction, signer: &dyn Signer) -> Result<TxId> {
    let id = transaction_id(tx)?;
    let sig = signer.sign(&id)?;
    tx.signature.push(sig.to_vec());
    Ok(id)
}

/// Signs with each signer in order. Every signature covers the same txid.
pub fn multi_sign(tx: &mut Transaction, signers: &[&dyn Signer]) -> Result<TxId> {
    let id = transaction_id(tx)?;
    for signer in signers {
        let sig = signer.sign(&id)?;
        tx.signature.push(sig.to_vec());
    }
    Ok(id)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::TriggerSmartContract;
    use crate::wallet::{TronWallet, recover_address};

    pub(crate) fn trigger_tx(expiration: i64) -> Transaction {
        let msg = TriggerSmartContract {
            owner_address: vec![0x41; 21],
            contract_address: vec![0x41; 21],
            data: vec![0xa9, 0x05, 0x9c, 0xbb],
            ..Default::default()
        };
        Transaction {
            raw_data: Some(Raw {
                ref_block_bytes: vec![0x12, 0x34],
                ref_block_hash: vec![0xaa; 8],
                expiration,
                timestamp: expiration - 60_000,
                contract: vec![Contract::pack(
                    ContractType::TriggerSmartContract,
                    "TriggerSmartContract",
                    &msg,
                )],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn wallet(byte: u8) -> TronWallet {
        TronWallet::new([byte; 32]).unwrap()
    }

    #[test]
    fn txid_is_sha256_of_raw_bytes() {
        let tx = trigger_tx(now_millis() + 60_000);
        let raw = tx.raw_data.as_ref().unwrap();
        let expected: [u8; 32] = Sha256::digest(raw.encode_to_vec()).into();
        assert_eq!(txid(raw), expected);

        // Re-serialization through the wire format keeps the id.
        let decoded = Transaction::decode(tx.encode_to_vec().as_slice()).unwrap();
        assert_eq!(transaction_id(&decoded).unwrap(), expected);
    }

    #[test]
    fn authorities_survive_decode_and_keep_the_txid() {
        use crate::protocol::{AccountId, Authority};

        let mut tx = trigger_tx(now_millis() + 60_000);
        raw_mut(&mut tx).unwrap().auths = vec![Authority {
            account: Some(AccountId {
                name: b"ops".to_vec(),
                address: vec![0x41; 21],
            }),
            permission_name: b"active".to_vec(),
        }];
        let wire = tx.raw_data.as_ref().unwrap().encode_to_vec();

        let decoded = Raw::decode(wire.as_slice()).unwrap();
        assert_eq!(decoded.auths.len(), 1);
        assert_eq!(decoded.encode_to_vec(), wire);
        assert_eq!(txid(&decoded), <[u8; 32]>::from(Sha256::digest(&wire)));
    }

    #[test]
    fn signatures_do_not_change_txid() {
        let mut tx = trigger_tx(now_millis() + 60_000);
        let before = transaction_id(&tx).unwrap();
        let signed = sign_transaction(&mut tx, &wallet(7)).unwrap();
        assert_eq!(before, signed);
        assert_eq!(transaction_id(&tx).unwrap(), before);
    }

    #[test]
    fn mutating_body_changes_txid() {
        let mut tx = trigger_tx(now_millis() + 60_000);
        let before = transaction_id(&tx).unwrap();
        set_fee_limit(&mut tx, 1_000).unwrap();
        assert_ne!(transaction_id(&tx).unwrap(), before);
    }

    #[test]
    fn multi_sign_preserves_order_and_recovers_each_signer() {
        let mut tx = trigger_tx(now_millis() + 60_000);
        set_permission_id(&mut tx, 2).unwrap();
        let (a, b) = (wallet(1), wallet(2));
        let id = multi_sign(&mut tx, &[&a, &b]).unwrap();

        assert_eq!(tx.signature.len(), 2);
        assert_eq!(recover_address(&id, &tx.signature[0]).unwrap(), a.address());
        assert_eq!(recover_address(&id, &tx.signature[1]).unwrap(), b.address());
        assert_eq!(tx.raw_data.as_ref().unwrap().contract[0].permission_id, 2);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let future = now_millis() + 60_000;
        assert!(validate(&trigger_tx(future)).is_ok());

        let expired = trigger_tx(now_millis() - 1);
        assert!(matches!(validate(&expired), Err(Error::InvalidParameter(_))));

        let mut empty = trigger_tx(future);
        empty.raw_data.as_mut().unwrap().contract.clear();
        assert!(matches!(validate(&empty), Err(Error::InvalidParameter(_))));

        let mut two = trigger_tx(future);
        let c = two.raw_data.as_ref().unwrap().contract[0].clone();
        two.raw_data.as_mut().unwrap().contract.push(c);
        assert!(matches!(validate(&two), Err(Error::InvalidParameter(_))));

        assert!(validate(&Transaction::default()).is_err());
    }

    #[test]
    fn extension_without_transaction_is_rejected() {
        let input = TxInput::from(TransactionExtention::default());
        assert!(input.into_transaction().is_err());
    }
}
