use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Balance snapshot for one address. Amounts are in nanos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    pub available: u64,
    pub locked: u64,
    /// Nonce the next outgoing transfer from this address must carry.
    pub nonce: u64,
}

impl Account {
    /// Available plus locked, computed on demand.
    pub fn total(&self) -> u64 {
        self.available.saturating_add(self.locked)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionType {
    Coinbase,
    Transfer,
    Delegate,
    Vote,
    Unvote,
    Create,
    Call,
    Unknown(String),
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coinbase => write!(f, "COINBASE"),
            Self::Transfer => write!(f, "TRANSFER"),
            Self::Delegate => write!(f, "DELEGATE"),
            Self::Vote => write!(f, "VOTE"),
            Self::Unvote => write!(f, "UNVOTE"),
            Self::Create => write!(f, "CREATE"),
            Self::Call => write!(f, "CALL"),
            Self::Unknown(other) => write!(f, "{other}"),
        }
    }
}

impl From<&str> for TransactionType {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "COINBASE" => Self::Coinbase,
            "TRANSFER" => Self::Transfer,
            "DELEGATE" => Self::Delegate,
            "VOTE" => Self::Vote,
            "UNVOTE" => Self::Unvote,
            "CREATE" => Self::Create,
            "CALL" => Self::Call,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: String,
    pub kind: TransactionType,
    pub from: String,
    pub to: String,
    pub value: u64,
    pub fee: u64,
    pub nonce: u64,
    pub timestamp: DateTime<Utc>,
    /// Attached data decoded as UTF-8 (lossy).
    pub memo: String,
}

/// Node acknowledgment for an accepted broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastAck {
    pub hash: String,
}

// -- Wire format --

/// Envelope every node endpoint answers with.
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse<T> {
    pub(super) success: bool,
    #[serde(default)]
    pub(super) message: Option<String>,
    pub(super) result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountDto {
    pub(super) address: String,
    #[serde(deserialize_with = "de_u64")]
    pub(super) available: u64,
    #[serde(deserialize_with = "de_u64")]
    pub(super) locked: u64,
    #[serde(deserialize_with = "de_u64")]
    pub(super) nonce: u64,
}

impl From<AccountDto> for Account {
    fn from(dto: AccountDto) -> Self {
        Self {
            address: dto.address,
            available: dto.available,
            locked: dto.locked,
            nonce: dto.nonce,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TransactionDto {
    #[serde(default)]
    pub(super) hash: String,
    #[serde(rename = "type")]
    pub(super) kind: String,
    pub(super) from: String,
    pub(super) to: String,
    #[serde(deserialize_with = "de_u64")]
    pub(super) value: u64,
    #[serde(default, deserialize_with = "de_u64")]
    pub(super) fee: u64,
    #[serde(default, deserialize_with = "de_u64")]
    pub(super) nonce: u64,
    #[serde(deserialize_with = "de_u64")]
    pub(super) timestamp: u64,
    #[serde(default)]
    pub(super) data: String,
}

impl TryFrom<TransactionDto> for Transaction {
    type Error = String;

    fn try_from(dto: TransactionDto) -> Result<Self, Self::Error> {
        let millis = i64::try_from(dto.timestamp)
            .map_err(|_| format!("Timestamp out of range: {}", dto.timestamp))?;
        let timestamp = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| format!("Timestamp out of range: {}", dto.timestamp))?;
        Ok(Self {
            hash: dto.hash,
            kind: TransactionType::from(dto.kind.as_str()),
            from: dto.from,
            to: dto.to,
            value: dto.value,
            fee: dto.fee,
            nonce: dto.nonce,
            timestamp,
            memo: decode_memo(&dto.data),
        })
    }
}

fn decode_memo(data: &str) -> String {
    let raw = data.strip_prefix("0x").unwrap_or(data);
    match hex::decode(raw) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

/// Nodes send amounts as decimal strings so they survive JSON number limits;
/// accept plain numbers too.
fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
