//! Shamir 3-pass commutative encryption, the relayer's half of the
//! protocol. Ported from the VRF worker's `shamir3pass` module rather than
//! depended on directly: that module lives in a crate built for wasm32 and
//! pulls in `wasm-bindgen`/`web-sys` across most of its other files, so this
//! is a from-scratch native copy of the same commutative-exponentiation math
//! against the same cross-platform crates (`chacha20poly1305`, `hkdf`,
//! `num-bigint`).
//!
//! Registration: client adds a temporary lock to its KEK (`KEK_c`), the
//! relayer adds its own lock (`KEK_cs`) via [`Shamir3Pass::add_lock`], the
//! client removes its lock and stores `KEK_s`. Login: client re-locks
//! `KEK_s` as `KEK_st`, the relayer removes its lock via
//! [`Shamir3Pass::remove_lock`] to get `KEK_t`, and the client removes its
//! own lock to recover the original KEK.

use chacha20poly1305::aead::{generic_array::GenericArray, Aead};
use chacha20poly1305::{ChaCha20Poly1305, KeyInit};
use getrandom::getrandom;
use hkdf::Hkdf;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use sha2::Sha256;

const AEAD_HKDF_INFO: &[u8] = b"web3authn-shamir3pass-aead-v1";
const MIN_PRIME_BITS: u64 = 256;
const RANDOM_BYTES_OVERHEAD: usize = 64;
const REJECTION_SAMPLING_MAX_ATTEMPTS: usize = 10;

/// The deployment's default prime, matching the wallet's client-side default
/// so the two halves of the protocol agree on `p` without an extra round
/// trip. Operators may override via config with their own prime.
pub const DEFAULT_SHAMIR_P_B64U: &str = "3N5w46AIGjGT2v5Vua_TMD5Ywfa9U2F7-WzW8SNDsIM";

#[derive(Debug, thiserror::Error)]
pub enum ShamirError {
    #[error("invalid prime encoding: {0}")]
    InvalidPrime(String),
    #[error("prime is too small: {bits} bits, need at least {min_bits}")]
    PrimeTooSmall { bits: u64, min_bits: u64 },
    #[error("no modular inverse exists for the given exponent")]
    ModularInverseNotFound,
    #[error("failed to generate randomness")]
    RandomGenerationFailed,
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("input must be a non-empty base64url string")]
    EmptyInput,
}

#[derive(Clone, Debug)]
pub struct ClientLockKeys {
    pub e: BigUint,
    pub d: BigUint,
}

#[derive(Clone, Debug)]
pub struct Shamir3Pass {
    p: BigUint,
    p_minus_1: BigUint,
    min_k: BigUint,
    max_k: BigUint,
}

impl Shamir3Pass {
    pub fn new(p_b64u: &str) -> Result<Self, ShamirError> {
        let p = wallet_codec::decode_biguint_b64u(p_b64u)
            .map_err(|e| ShamirError::InvalidPrime(e.to_string()))?;
        Self::from_prime(p)
    }

    pub fn new_default() -> Self {
        let p = wallet_codec::decode_biguint_b64u(DEFAULT_SHAMIR_P_B64U)
            .expect("default shamir prime is well-formed");
        Self::from_prime_unchecked(p)
    }

    fn from_prime(p: BigUint) -> Result<Self, ShamirError> {
        let bits = p.bits();
        if bits < MIN_PRIME_BITS {
            return Err(ShamirError::PrimeTooSmall {
                bits,
                min_bits: MIN_PRIME_BITS,
            });
        }
        Ok(Self::from_prime_unchecked(p))
    }

    fn from_prime_unchecked(p: BigUint) -> Self {
        let one = BigUint::one();
        let two = &one + &one;
        let p_minus_1 = &p - &one;
        let p_minus_2 = &p - &two;

        let min_k = if p.bits() >= 1024 {
            BigUint::from(1u128 << 64)
        } else {
            BigUint::from(1u64 << 32)
        };

        Shamir3Pass {
            p,
            p_minus_1,
            min_k,
            max_k: p_minus_2,
        }
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn p_b64u(&self) -> String {
        wallet_codec::encode_biguint_b64u(&self.p)
    }

    fn modexp(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        base.modpow(exp, &self.p)
    }

    fn modinv(&self, a: &BigUint) -> Option<BigUint> {
        let a_bigint = BigInt::from_biguint(Sign::Plus, a.clone());
        let m_bigint = BigInt::from_biguint(Sign::Plus, self.p_minus_1.clone());

        let (gcd, x, _) = extended_gcd(a_bigint, m_bigint.clone());
        if gcd != BigInt::one() {
            return None;
        }

        let mut x_mod = x % &m_bigint;
        if x_mod.sign() == Sign::Minus {
            x_mod += &m_bigint;
        }
        Some(x_mod.to_biguint().expect("non-negative by construction"))
    }

    /// Rejection-samples a random exponent `k` in `[min_k, p-2]` with
    /// `gcd(k, p-1) = 1`, so it always has a modular inverse mod `p-1`.
    pub fn random_k(&self) -> Result<BigUint, ShamirError> {
        let range = &self.max_k - &self.min_k;
        let bytes_needed = (range.bits() as usize + 7) / 8 + RANDOM_BYTES_OVERHEAD;

        for _ in 0..REJECTION_SAMPLING_MAX_ATTEMPTS {
            let mut buf = vec![0u8; bytes_needed];
            getrandom(&mut buf).map_err(|_| ShamirError::RandomGenerationFailed)?;

            let candidate = BigUint::from_bytes_be(&buf) % &range;
            let k = &self.min_k + candidate;

            if k.gcd(&self.p_minus_1) == BigUint::one() {
                return Ok(k);
            }
        }

        Err(ShamirError::RandomGenerationFailed)
    }

    pub fn generate_lock_keys(&self) -> Result<ClientLockKeys, ShamirError> {
        let e = self.random_k()?;
        let d = self.modinv(&e).ok_or(ShamirError::ModularInverseNotFound)?;
        Ok(ClientLockKeys { e, d })
    }

    /// Adds the relayer's lock: `base^exponent mod p`.
    pub fn add_lock(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        self.modexp(base, exponent)
    }

    /// Removes the relayer's lock. Same operation as `add_lock` — the
    /// commutativity of modular exponentiation is what makes the 3-pass
    /// protocol work.
    pub fn remove_lock(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        self.modexp(base, exponent)
    }

    fn derive_aead_key(&self, kek_bytes: &[u8]) -> Result<[u8; 32], ShamirError> {
        let hkdf = Hkdf::<Sha256>::new(None, kek_bytes);
        let mut key = [0u8; 32];
        hkdf.expand(AEAD_HKDF_INFO, &mut key)
            .map_err(|_| ShamirError::EncryptionFailed("hkdf expansion failed".into()))?;
        Ok(key)
    }

    pub fn encrypt_with_kek(&self, kek: &BigUint, plaintext: &[u8]) -> Result<Vec<u8>, ShamirError> {
        let key_bytes = self.derive_aead_key(&kek.to_bytes_be())?;
        let cipher = ChaCha20Poly1305::new(GenericArray::from_slice(&key_bytes));

        let mut nonce = [0u8; 12];
        getrandom(&mut nonce).map_err(|_| ShamirError::RandomGenerationFailed)?;

        let ciphertext = cipher
            .encrypt(GenericArray::from_slice(&nonce), plaintext)
            .map_err(|e| ShamirError::EncryptionFailed(e.to_string()))?;

        let mut result = nonce.to_vec();
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    pub fn decrypt_with_kek(&self, kek: &BigUint, ciphertext: &[u8]) -> Result<Vec<u8>, ShamirError> {
        if ciphertext.len() < 12 {
            return Err(ShamirError::DecryptionFailed("ciphertext too short".into()));
        }
        let (nonce_bytes, ct) = ciphertext.split_at(12);
        let key_bytes = self.derive_aead_key(&kek.to_bytes_be())?;
        let cipher = ChaCha20Poly1305::new(GenericArray::from_slice(&key_bytes));
        cipher
            .decrypt(GenericArray::from_slice(nonce_bytes), ct)
            .map_err(|e| ShamirError::DecryptionFailed(e.to_string()))
    }
}

fn extended_gcd(a: BigInt, b: BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        return (a, BigInt::one(), BigInt::zero());
    }
    let (gcd, x1, y1) = extended_gcd(b.clone(), &a % &b);
    let x = y1.clone();
    let y = x1 - (&a / &b) * y1;
    (gcd, x, y)
}

/// Applies the relayer's lock to a client-submitted base64url `KEK_c`,
/// returning `KEK_cs` as base64url. Validates the input is non-empty before
/// attempting to decode it, per the server endpoint's input contract.
pub fn apply_server_lock(shamir: &Shamir3Pass, exponent: &BigUint, kek_b64u: &str) -> Result<String, ShamirError> {
    if kek_b64u.is_empty() {
        return Err(ShamirError::EmptyInput);
    }
    let base = wallet_codec::decode_biguint_b64u(kek_b64u)
        .map_err(|e| ShamirError::InvalidPrime(e.to_string()))?;
    let locked = shamir.add_lock(&base, exponent);
    Ok(wallet_codec::encode_biguint_b64u(&locked))
}

/// Removes the relayer's lock from a client-submitted base64url `KEK_st`,
/// returning `KEK_t` as base64url.
pub fn remove_server_lock(shamir: &Shamir3Pass, exponent: &BigUint, kek_b64u: &str) -> Result<String, ShamirError> {
    if kek_b64u.is_empty() {
        return Err(ShamirError::EmptyInput);
    }
    let base = wallet_codec::decode_biguint_b64u(kek_b64u)
        .map_err(|e| ShamirError::InvalidPrime(e.to_string()))?;
    let unlocked = shamir.remove_lock(&base, exponent);
    Ok(wallet_codec::encode_biguint_b64u(&unlocked))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove_lock_is_the_identity() {
        let shamir = Shamir3Pass::new_default();
        let keys = shamir.generate_lock_keys().unwrap();
        let base = shamir.random_k().unwrap();

        let locked = shamir.add_lock(&base, &keys.e);
        let unlocked = shamir.remove_lock(&locked, &keys.d);
        assert_eq!(unlocked, base);
    }

    #[test]
    fn locks_commute_across_two_parties() {
        let shamir = Shamir3Pass::new_default();
        let client_keys = shamir.generate_lock_keys().unwrap();
        let server_keys = shamir.generate_lock_keys().unwrap();
        let base = shamir.random_k().unwrap();

        // client locks, server locks, client unlocks, server unlocks: order
        // of removal need not match order of application.
        let kek_c = shamir.add_lock(&base, &client_keys.e);
        let kek_cs = shamir.add_lock(&kek_c, &server_keys.e);
        let kek_s = shamir.remove_lock(&kek_cs, &client_keys.d);
        let recovered = shamir.remove_lock(&kek_s, &server_keys.d);
        assert_eq!(recovered, base);
    }

    #[test]
    fn encrypt_decrypt_round_trips_under_a_kek() {
        let shamir = Shamir3Pass::new_default();
        let kek = shamir.random_k().unwrap();
        let plaintext = b"vrf keypair bytes go here";

        let ciphertext = shamir.encrypt_with_kek(&kek, plaintext).unwrap();
        assert_ne!(ciphertext, plaintext);
        let decrypted = shamir.decrypt_with_kek(&kek, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn apply_server_lock_rejects_empty_input() {
        let shamir = Shamir3Pass::new_default();
        let keys = shamir.generate_lock_keys().unwrap();
        assert!(matches!(
            apply_server_lock(&shamir, &keys.e, ""),
            Err(ShamirError::EmptyInput)
        ));
    }

    #[test]
    fn apply_then_remove_server_lock_round_trips() {
        let shamir = Shamir3Pass::new_default();
        let keys = shamir.generate_lock_keys().unwrap();
        let base = shamir.random_k().unwrap();
        let kek_c_b64u = wallet_codec::encode_biguint_b64u(&base);

        let kek_cs_b64u = apply_server_lock(&shamir, &keys.e, &kek_c_b64u).unwrap();
        let recovered_b64u = remove_server_lock(&shamir, &keys.d, &kek_cs_b64u).unwrap();
        assert_eq!(recovered_b64u, kek_c_b64u);
    }
}
