//! Named CKB network definitions.

use core::fmt;

/// A named CKB network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(strum::IntoStaticStr)]
#[derive(strum::VariantNames)]
#[derive(strum::VariantArray)]
#[derive(strum::EnumString)]
#[derive(strum::EnumIter)]
#[derive(strum::EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum NamedNetwork {
    /// Lina, the public mainnet.
    Mainnet,

    /// Pudge, the public testnet.
    Testnet,

    /// A local development chain.
    Devnet,
}

impl Default for NamedNetwork {
    #[inline]
    fn default() -> Self {
        Self::Testnet
    }
}

impl fmt::Display for NamedNetwork {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl AsRef<str> for NamedNetwork {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for NamedNetwork {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_ref())
    }
}

impl NamedNetwork {
    /// Returns the string representation of the network.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Returns true if this is the mainnet.
    #[inline]
    pub const fn is_mainnet(&self) -> bool {
        matches!(self, Self::Mainnet)
    }

    /// Returns true if this is the testnet.
    #[inline]
    pub const fn is_testnet(&self) -> bool {
        matches!(self, Self::Testnet)
    }

    /// Public node RPC endpoint.
    #[inline]
    pub const fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet.ckb.dev/rpc",
            Self::Testnet => "https://testnet.ckb.dev/rpc",
            Self::Devnet => "http://127.0.0.1:8114",
        }
    }

    /// Public indexer endpoint. A local node serves the indexer itself.
    #[inline]
    pub const fn default_indexer_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet.ckb.dev/indexer",
            Self::Testnet => "https://testnet.ckb.dev/indexer",
            Self::Devnet => "http://127.0.0.1:8114",
        }
    }

    /// Block explorer base URL, if the network has a public explorer.
    #[inline]
    pub const fn explorer_url(&self) -> Option<&'static str> {
        match self {
            Self::Mainnet => Some("https://explorer.nervos.org"),
            Self::Testnet => Some("https://pudge.explorer.nervos.org"),
            Self::Devnet => None,
        }
    }

    /// Explorer link for a transaction, if the network has an explorer.
    pub fn transaction_url(&self, tx_hash: impl fmt::Display) -> Option<String> {
        self.explorer_url()
            .map(|base| format!("{base}/transaction/{tx_hash}"))
    }
}
