//! JSON forms of ledger types.
//!
//! The node encodes integers as `0x`-prefixed hex quantities and byte
//! strings as `0x`-prefixed hex. These mirror types carry that encoding and
//! convert to and from the molecule-level types in `spore-primitives`.

use alloy_primitives::{B256, Bytes as HexBytes};
use serde::{Deserialize, Serialize};
use spore_mint::TxStatus;
use spore_primitives::{
    Capacity, Cell, CellDep, CellInput, CellOutput, DepType, LiveCell, OutPoint, Script,
    ScriptHashType, Transaction,
};

/// Hex quantity encoding, `0x0`, `0x1a`.
pub(crate) mod quantity {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(D::Error::custom)
    }

    pub(crate) fn parse(text: &str) -> Result<u64, String> {
        let digits = text
            .strip_prefix("0x")
            .ok_or_else(|| format!("quantity without 0x prefix: {text}"))?;
        u64::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity {text}: {e}"))
    }

    pub(crate) fn format(value: u64) -> String {
        format!("{value:#x}")
    }
}

/// A script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonScript {
    /// Code hash.
    pub code_hash: B256,
    /// How the code hash is matched.
    pub hash_type: ScriptHashType,
    /// Script arguments.
    pub args: HexBytes,
}

impl From<&Script> for JsonScript {
    fn from(script: &Script) -> Self {
        Self {
            code_hash: script.code_hash(),
            hash_type: script.hash_type(),
            args: script.args().clone().into(),
        }
    }
}

impl From<JsonScript> for Script {
    fn from(json: JsonScript) -> Self {
        Self::new(json.code_hash, json.hash_type, json.args.0)
    }
}

/// An out point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOutPoint {
    /// Creating transaction.
    pub tx_hash: B256,
    /// Output index.
    #[serde(with = "quantity")]
    pub index: u64,
}

impl From<OutPoint> for JsonOutPoint {
    fn from(out_point: OutPoint) -> Self {
        Self {
            tx_hash: out_point.tx_hash,
            index: out_point.index.into(),
        }
    }
}

impl TryFrom<JsonOutPoint> for OutPoint {
    type Error = String;

    fn try_from(json: JsonOutPoint) -> Result<Self, Self::Error> {
        let index = u32::try_from(json.index).map_err(|_| quantity::format(json.index))?;
        Ok(Self::new(json.tx_hash, index))
    }
}

/// A cell output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCellOutput {
    /// Capacity in shannons.
    #[serde(with = "quantity")]
    pub capacity: u64,
    /// Lock script.
    pub lock: JsonScript,
    /// Type script.
    #[serde(rename = "type")]
    pub type_: Option<JsonScript>,
}

impl From<&CellOutput> for JsonCellOutput {
    fn from(output: &CellOutput) -> Self {
        Self {
            capacity: output.capacity().as_u64(),
            lock: output.lock().into(),
            type_: output.type_().map(JsonScript::from),
        }
    }
}

impl From<JsonCellOutput> for CellOutput {
    fn from(json: JsonCellOutput) -> Self {
        Self::new(
            Capacity::shannons(json.capacity),
            json.lock.into(),
            json.type_.map(Script::from),
        )
    }
}

/// A cell dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCellDep {
    /// Referenced cell.
    pub out_point: JsonOutPoint,
    /// How the cell is loaded.
    pub dep_type: DepType,
}

impl From<&CellDep> for JsonCellDep {
    fn from(dep: &CellDep) -> Self {
        Self {
            out_point: dep.out_point.into(),
            dep_type: dep.dep_type,
        }
    }
}

/// A transaction input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCellInput {
    /// Since constraint.
    #[serde(with = "quantity")]
    pub since: u64,
    /// Consumed cell.
    pub previous_output: JsonOutPoint,
}

impl From<&CellInput> for JsonCellInput {
    fn from(input: &CellInput) -> Self {
        Self {
            since: input.since,
            previous_output: input.previous_output.into(),
        }
    }
}

/// A signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonTransaction {
    /// Format version.
    #[serde(with = "quantity")]
    pub version: u64,
    /// Cell dependencies.
    pub cell_deps: Vec<JsonCellDep>,
    /// Header dependencies.
    pub header_deps: Vec<B256>,
    /// Inputs.
    pub inputs: Vec<JsonCellInput>,
    /// Outputs.
    pub outputs: Vec<JsonCellOutput>,
    /// Output data.
    pub outputs_data: Vec<HexBytes>,
    /// Witnesses.
    pub witnesses: Vec<HexBytes>,
}

impl From<&Transaction> for JsonTransaction {
    fn from(tx: &Transaction) -> Self {
        let raw = tx.raw();
        Self {
            version: raw.version.into(),
            cell_deps: raw.cell_deps.iter().map(JsonCellDep::from).collect(),
            header_deps: raw.header_deps.clone(),
            inputs: raw.inputs.iter().map(JsonCellInput::from).collect(),
            outputs: raw.outputs.iter().map(JsonCellOutput::from).collect(),
            outputs_data: raw.outputs_data.iter().cloned().map(HexBytes::from).collect(),
            witnesses: tx.witnesses().iter().cloned().map(HexBytes::from).collect(),
        }
    }
}

/// Which script of a cell an indexer search matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    /// Match the lock script.
    Lock,
    /// Match the type script.
    Type,
}

/// Extra conditions on an indexer search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKeyFilter {
    /// Half-open range of type script lengths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_len_range: Option<[String; 2]>,
    /// Half-open range of output data lengths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_data_len_range: Option<[String; 2]>,
}

/// An indexer search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchKey {
    /// Script to match.
    pub script: JsonScript,
    /// Which script it must match.
    pub script_type: ScriptType,
    /// Extra conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchKeyFilter>,
}

impl SearchKey {
    /// Cells locked by `lock` with no type script and empty data.
    pub fn plain_cells(lock: &Script) -> Self {
        let empty = || [quantity::format(0), quantity::format(1)];
        Self {
            script: lock.into(),
            script_type: ScriptType::Lock,
            filter: Some(SearchKeyFilter {
                script_len_range: Some(empty()),
                output_data_len_range: Some(empty()),
            }),
        }
    }
}

/// Search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

/// A cell returned by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerCell {
    /// The output.
    pub output: JsonCellOutput,
    /// The output data.
    pub output_data: Option<HexBytes>,
    /// Where the cell lives.
    pub out_point: JsonOutPoint,
    /// Block that created the cell.
    #[serde(with = "quantity")]
    pub block_number: u64,
}

impl TryFrom<IndexerCell> for LiveCell {
    type Error = String;

    fn try_from(cell: IndexerCell) -> Result<Self, Self::Error> {
        let data = cell.output_data.map(|data| data.0).unwrap_or_default();
        Ok(Self::new(
            cell.out_point.try_into()?,
            Cell::new(cell.output.into(), data),
        ))
    }
}

/// A page of indexer results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination<T> {
    /// Results on this page.
    pub objects: Vec<T>,
    /// Cursor for the next page.
    pub last_cursor: HexBytes,
}

/// Status of a transaction as the node reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonTxStatus {
    /// `pending`, `proposed`, `committed`, `unknown` or `rejected`.
    pub status: String,
    /// Block that committed the transaction.
    #[serde(default)]
    pub block_hash: Option<B256>,
    /// Why the transaction was rejected.
    #[serde(default)]
    pub reason: Option<String>,
}

impl TryFrom<JsonTxStatus> for TxStatus {
    type Error = String;

    fn try_from(json: JsonTxStatus) -> Result<Self, Self::Error> {
        match json.status.as_str() {
            "pending" => Ok(Self::Pending),
            "proposed" => Ok(Self::Proposed),
            "committed" => Ok(Self::Committed),
            "unknown" => Ok(Self::Unknown),
            "rejected" => Ok(Self::Rejected(json.reason.unwrap_or_default())),
            _ => Err(json.status),
        }
    }
}

/// A transaction together with its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithStatus {
    /// The transaction, absent if the node only knows its status.
    #[serde(default)]
    pub transaction: Option<serde_json::Value>,
    /// Its status.
    pub tx_status: JsonTxStatus,
}
