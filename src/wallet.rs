use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes};

use crate::error::WalletError;

/// Signing key bound to one network's chain id.
///
/// The same key is shared by every network, but each monitor derives its own
/// identity on every start so that a restart never reuses a stale binding.
#[derive(Debug, Clone)]
pub struct WalletIdentity {
    signer: LocalWallet,
}

impl WalletIdentity {
    /// Derive a wallet from a hex private key (with or without `0x`)
    pub fn from_private_key(private_key: &str) -> Result<Self, WalletError> {
        let signer = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| WalletError::MalformedKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Bind the wallet to the chain it will sign for (EIP-155)
    pub fn bind_to_chain(self, chain_id: u64) -> Self {
        Self {
            signer: self.signer.with_chain_id(chain_id),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.signer.chain_id()
    }

    /// Sign a transaction and return its RLP encoding, ready for `eth_sendRawTransaction`
    pub async fn sign_transaction(&self, tx: TypedTransaction) -> Result<Bytes, WalletError> {
        let signature = self
            .signer
            .sign_transaction(&tx)
            .await
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(tx.rlp_signed(&signature))
    }
}
