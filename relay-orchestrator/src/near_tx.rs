//! Minimal native NEAR transaction/signing types, ported from the signer
//! worker's hand-rolled BORSH primitives and scoped down to the actions the
//! relayer itself issues: `CreateAccount`, `Transfer`, `AddKey` (full access
//! only — the relayer never mints function-call-restricted keys), and
//! `FunctionCall` (for `registerUser`/`verifyAuthenticationResponse`
//! contract calls). `Stake`/`DeleteKey`/`DeleteAccount`/`SignedDelegate` and
//! the NEP-591 global-contract actions stay out of scope: those are
//! user-signing concerns that belong to the signer worker, not the relayer.

use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type Nonce = u64;
pub type Gas = u64;
pub type Balance = u128;

mod serde_balance_as_dec_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(account_id: impl Into<String>) -> Result<Self, String> {
        let account_id = account_id.into();
        if account_id.is_empty() {
            return Err("account id cannot be empty".into());
        }
        Ok(AccountId(account_id))
    }
}

impl std::str::FromStr for AccountId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountId::new(s)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKey {
    pub key_type: u8,
    pub key_data: [u8; 32],
}

impl PublicKey {
    pub fn from_ed25519_bytes(bytes: &[u8; 32]) -> Self {
        PublicKey {
            key_type: 0,
            key_data: *bytes,
        }
    }

    /// Parses a NEAR `ed25519:<base58>` public key string.
    pub fn from_near_str(s: &str) -> Result<Self, String> {
        let encoded = s.strip_prefix("ed25519:").unwrap_or(s);
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| format!("invalid base58 public key: {e}"))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| "public key must be 32 bytes".to_string())?;
        Ok(PublicKey::from_ed25519_bytes(&array))
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub key_type: u8,
    pub signature_data: [u8; 64],
}

impl Signature {
    pub fn from_ed25519_bytes(bytes: &[u8; 64]) -> Self {
        Signature {
            key_type: 0,
            signature_data: *bytes,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoHash(pub [u8; 32]);

impl CryptoHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        CryptoHash(bytes)
    }

    pub fn from_base58(s: &str) -> Result<Self, String> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| format!("invalid base58 block hash: {e}"))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| "block hash must be 32 bytes".to_string())?;
        Ok(CryptoHash(array))
    }

    pub fn to_vec(self) -> Vec<u8> {
        self.0.to_vec()
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallAction {
    pub method_name: String,
    pub args: Vec<u8>,
    pub gas: Gas,
    #[serde(with = "serde_balance_as_dec_str")]
    pub deposit: Balance,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKey {
    pub nonce: Nonce,
    pub permission: AccessKeyPermission,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessKeyPermission {
    FullAccess,
}

/// The relay's own action set. Named `Action` (not `NearAction`) since this
/// crate only ever builds its own transactions, never deserializes an
/// arbitrary NEAR action off the wire.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    CreateAccount,
    Transfer {
        #[serde(with = "serde_balance_as_dec_str")]
        deposit: Balance,
    },
    AddKey {
        public_key: PublicKey,
        access_key: AccessKey,
    },
    FunctionCall(Box<FunctionCallAction>),
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub signer_id: AccountId,
    pub public_key: PublicKey,
    pub nonce: Nonce,
    pub receiver_id: AccountId,
    pub block_hash: CryptoHash,
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Mirrors `near-primitives`' `Transaction::get_hash_and_size`: BORSH
    /// bytes, then SHA-256 over those bytes.
    pub fn get_hash_and_size(&self) -> (CryptoHash, u64) {
        let bytes = borsh::to_vec(self).expect("transaction is always borsh-serializable");
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        (CryptoHash(hash), bytes.len() as u64)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Signature,
}

impl SignedTransaction {
    pub fn to_borsh_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).expect("signed transaction is always borsh-serializable")
    }
}

/// Signs `transaction` with the relayer's ed25519 key, returning the
/// complete `SignedTransaction` ready for `send_tx`.
pub fn sign_transaction(transaction: Transaction, signing_key: &SigningKey) -> SignedTransaction {
    let (hash, _size) = transaction.get_hash_and_size();
    let signature = signing_key.sign(&hash.0);
    SignedTransaction {
        transaction,
        signature: Signature::from_ed25519_bytes(&signature.to_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_rejects_empty() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("alice.near").is_ok());
    }

    #[test]
    fn public_key_round_trips_through_near_str() {
        let key = PublicKey::from_ed25519_bytes(&[7u8; 32]);
        let encoded = format!("ed25519:{}", bs58::encode(key.key_data).into_string());
        let parsed = PublicKey::from_near_str(&encoded).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn signed_transaction_has_a_valid_signature() {
        let signing_key = SigningKey::from_bytes(&[9u8; 32]);
        let tx = Transaction {
            signer_id: AccountId::new("relayer.near").unwrap(),
            public_key: PublicKey::from_ed25519_bytes(
                signing_key.verifying_key().as_bytes(),
            ),
            nonce: 1,
            receiver_id: AccountId::new("alice.near").unwrap(),
            block_hash: CryptoHash::from_bytes([1u8; 32]),
            actions: vec![Action::CreateAccount, Action::Transfer { deposit: 0 }],
        };
        let signed = sign_transaction(tx.clone(), &signing_key);
        let (hash, _) = tx.get_hash_and_size();
        use ed25519_dalek::Verifier;
        let signature = ed25519_dalek::Signature::from_bytes(&signed.signature.signature_data);
        assert!(signing_key.verifying_key().verify(&hash.0, &signature).is_ok());
    }
}
