//! Unsigned transaction intent and its building blocks.
//!
//! The types below mirror the chain's programmable transaction layout field
//! for field, so `bcs` produces the exact transaction-kind bytes a sponsor
//! expects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::transaction::object::{ObjectArg, ObjectResolver};
use crate::transaction::type_tag::TypeTag;

/// Errors raised while building or serializing an intent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// The intent has no commands.
    #[error("transaction has no commands")]
    EmptyTransaction,

    /// Too many commands in a single intent.
    #[error("transaction has {0} commands, maximum is {max}", max = MAX_COMMANDS)]
    TooManyCommands(usize),

    /// Call target is not `package::module::function`.
    #[error("invalid call target '{0}'")]
    InvalidTarget(String),

    /// Type argument is not a Move type.
    #[error("invalid type argument '{0}'")]
    InvalidTypeTag(String),

    /// Address or object id is not hex or too long.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid object digest: {0}")]
    InvalidDigest(String),

    /// Argument references an input or result that does not exist.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Textual input spec could not be parsed.
    #[error("invalid input '{0}'")]
    InvalidInput(String),

    /// Sender was already assigned to a different address.
    #[error("sender already set to {current}, refusing to change it to {requested}")]
    SenderAlreadySet { current: String, requested: String },

    /// An object input still needs its version and digest.
    #[error("object {0} is not resolved")]
    UnresolvedObject(String),

    /// Looking up an object reference failed.
    #[error("could not resolve object {id}: {reason}")]
    ObjectResolution { id: String, reason: String },

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Result type for transaction building.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Upper bound on commands per intent.
pub const MAX_COMMANDS: usize = 1024;

/// Address length in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Normalize a hex address to `0x` + 64 lowercase hex digits.
pub fn normalize_address(addr: &str) -> TransactionResult<String> {
    let trimmed = addr.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.is_empty() || hex.len() > 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TransactionError::InvalidAddress(addr.to_string()));
    }

    Ok(format!("0x{:0>64}", hex.to_ascii_lowercase()))
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A 32-byte account address or object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = TransactionError;

    /// Accepts short forms (`0x2`); they are left-padded with zeros.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_address(s)?;
        let decoded = alloy::hex::decode(&normalized[2..])
            .map_err(|e| TransactionError::InvalidAddress(format!("{s}: {e}")))?;

        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", alloy::hex::encode(self.0))
    }
}

/// A callable on-chain entry point, `package::module::function`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallTarget {
    package: Address,
    module: String,
    function: String,
}

impl CallTarget {
    pub fn package(&self) -> &Address {
        &self.package
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// Compare against a textual target, tolerating short package ids.
    pub fn matches(&self, other: &str) -> bool {
        other
            .parse::<CallTarget>()
            .map(|t| &t == self)
            .unwrap_or(false)
    }
}

impl FromStr for CallTarget {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split("::").collect();
        let [package, module, function] = parts.as_slice() else {
            return Err(TransactionError::InvalidTarget(s.to_string()));
        };

        if !is_identifier(module) || !is_identifier(function) {
            return Err(TransactionError::InvalidTarget(s.to_string()));
        }

        let package = package
            .parse::<Address>()
            .map_err(|_| TransactionError::InvalidTarget(s.to_string()))?;

        Ok(Self {
            package,
            module: module.to_string(),
            function: function.to_string(),
        })
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

/// A resolved transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// Pre-encoded value.
    Pure(Vec<u8>),
    Object(ObjectArg),
}

/// Reference to a value available to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    /// The gas coin. Under sponsorship this is the sponsor's coin.
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: Address,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    pub fn target(&self) -> CallTarget {
        CallTarget {
            package: self.package,
            module: self.module.clone(),
            function: self.function.clone(),
        }
    }
}

/// One operation of a programmable transaction.
///
/// Variant order is part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(Box<MoveCall>),
    TransferObjects(Vec<Argument>, Argument),
    SplitCoins(Argument, Vec<Argument>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

/// The operations of a transaction, without sender or gas metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

impl TransactionKind {
    /// BCS encoding, as sent for sponsorship.
    pub fn to_bcs(&self) -> TransactionResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    pub fn from_bcs(bytes: &[u8]) -> TransactionResult<Self> {
        bcs::from_bytes(bytes).map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    pub fn commands(&self) -> &[Command] {
        match self {
            TransactionKind::ProgrammableTransaction(pt) => &pt.commands,
        }
    }
}

/// An input slot of an intent. Objects added by id alone are resolved
/// before serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Resolved(CallArg),
    UnresolvedObject(Address),
}

impl Input {
    /// The object id, for object inputs.
    pub fn object_id(&self) -> Option<&Address> {
        match self {
            Input::Resolved(CallArg::Object(arg)) => Some(arg.id()),
            Input::UnresolvedObject(id) => Some(id),
            Input::Resolved(CallArg::Pure(_)) => None,
        }
    }
}

/// An unsigned description of on-chain operations plus a sender slot.
///
/// The sender may be assigned once; re-assigning the same address is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransactionIntent {
    sender: Option<Address>,
    inputs: Vec<Input>,
    commands: Vec<Command>,
}

impl UnsignedTransactionIntent {
    pub(crate) fn new(inputs: Vec<Input>, commands: Vec<Command>) -> TransactionResult<Self> {
        if commands.is_empty() {
            return Err(TransactionError::EmptyTransaction);
        }
        if commands.len() > MAX_COMMANDS {
            return Err(TransactionError::TooManyCommands(commands.len()));
        }
        Ok(Self {
            sender: None,
            inputs,
            commands,
        })
    }

    pub fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    /// Assign the sender address. Short and long forms of one address are equal.
    pub fn set_sender(&mut self, sender: &str) -> TransactionResult<()> {
        let requested: Address = sender.parse()?;
        match self.sender {
            Some(current) if current != requested => Err(TransactionError::SenderAlreadySet {
                current: current.to_string(),
                requested: requested.to_string(),
            }),
            _ => {
                self.sender = Some(requested);
                Ok(())
            }
        }
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Targets of every move call in command order.
    pub fn call_targets(&self) -> impl Iterator<Item = CallTarget> + '_ {
        self.commands.iter().filter_map(|c| match c {
            Command::MoveCall(call) => Some(call.target()),
            _ => None,
        })
    }

    pub fn has_unresolved_objects(&self) -> bool {
        self.inputs
            .iter()
            .any(|input| matches!(input, Input::UnresolvedObject(_)))
    }

    /// Look up version and digest (or shared metadata) for every object added by id.
    pub async fn resolve_objects(&mut self, resolver: &dyn ObjectResolver) -> TransactionResult<()> {
        for input in self.inputs.iter_mut() {
            if let Input::UnresolvedObject(id) = *input {
                let arg = resolver.resolve_object(&id).await?;
                if *arg.id() != id {
                    return Err(TransactionError::ObjectResolution {
                        id: id.to_string(),
                        reason: format!("resolver answered for {}", arg.id()),
                    });
                }
                *input = Input::Resolved(CallArg::Object(arg));
            }
        }
        Ok(())
    }

    /// The transaction kind. Fails while any object is unresolved.
    pub fn to_kind(&self) -> TransactionResult<TransactionKind> {
        let inputs = self
            .inputs
            .iter()
            .map(|input| match input {
                Input::Resolved(arg) => Ok(arg.clone()),
                Input::UnresolvedObject(id) => Err(TransactionError::UnresolvedObject(id.to_string())),
            })
            .collect::<TransactionResult<Vec<_>>>()?;

        Ok(TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
            inputs,
            commands: self.commands.clone(),
        }))
    }

    /// BCS transaction-kind bytes (the sponsor supplies sender and gas data).
    pub fn kind_bytes(&self) -> TransactionResult<Vec<u8>> {
        self.to_kind()?.to_bcs()
    }
}
