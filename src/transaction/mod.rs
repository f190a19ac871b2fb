//! Transaction building subsystem.
//!
//! # Data Flow
//! ```text
//! page parameters (call target, typed values)
//!     → builder.rs (inputs, commands, argument references)
//!     → pure.rs (typed values → pure argument bytes)
//!     → type_tag.rs (type arguments)
//!     → intent.rs (UnsignedTransactionIntent, sender slot)
//!     → object.rs (object ids → shared or owned references, via an ObjectResolver)
//!     → intent.rs (BCS kind bytes)
//!     → handed to the sponsorship client
//!
//! sponsor response bytes
//!     → sponsored.rs (decoded once, signed as-is)
//! ```
//!
//! # Invariants
//! - An intent always carries at least one command
//! - Kind bytes never include sender or gas metadata
//! - Argument references point at earlier inputs/commands only
//! - Kind bytes are only produced once every object input is resolved

pub mod builder;
pub mod intent;
pub mod object;
pub mod pure;
pub mod sponsored;
pub mod type_tag;

pub use builder::{build, InputSpec, TransactionBuilder};
pub use intent::{
    normalize_address, Address, Argument, CallArg, CallTarget, Command, Input, MoveCall,
    ProgrammableTransaction, TransactionError, TransactionKind, TransactionResult,
    UnsignedTransactionIntent,
};
pub use object::{ObjectArg, ObjectDigest, ObjectRef, ObjectResolver};
pub use pure::PureValue;
pub use sponsored::SponsoredTransaction;
pub use type_tag::{StructTag, TypeTag};
