//! Programmable transaction builder.

use std::str::FromStr;

use crate::transaction::intent::{
    Address, Argument, CallArg, CallTarget, Command, Input, MoveCall, TransactionError,
    TransactionResult, UnsignedTransactionIntent, MAX_COMMANDS,
};
use crate::transaction::object::{ObjectArg, ObjectRef};
use crate::transaction::pure::PureValue;
use crate::transaction::type_tag::TypeTag;

/// Accumulates inputs and commands for one intent.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    inputs: Vec<Input>,
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The gas coin (supplied by the sponsor).
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    /// Add an object input by id. Its reference is looked up before the
    /// intent is serialized. The same object id is only added once.
    pub fn object(&mut self, id: &str) -> TransactionResult<Argument> {
        let id: Address = id.parse()?;
        match self.position_of(&id) {
            Some(index) => Ok(Argument::Input(index as u16)),
            None => self.push_input(Input::UnresolvedObject(id)),
        }
    }

    /// Add a shared object whose initial shared version is already known.
    pub fn shared_object(
        &mut self,
        id: &str,
        initial_shared_version: u64,
        mutable: bool,
    ) -> TransactionResult<Argument> {
        let id: Address = id.parse()?;
        self.object_arg(ObjectArg::SharedObject {
            id,
            initial_shared_version,
            mutable,
        })
    }

    /// Add an owned or immutable object at a specific version.
    pub fn object_ref(&mut self, object: ObjectRef) -> TransactionResult<Argument> {
        self.object_arg(ObjectArg::ImmOrOwnedObject(object))
    }

    /// A resolved object replaces an unresolved input for the same id.
    fn object_arg(&mut self, arg: ObjectArg) -> TransactionResult<Argument> {
        match self.position_of(arg.id()) {
            Some(index) => {
                if let Input::UnresolvedObject(_) = self.inputs[index] {
                    self.inputs[index] = Input::Resolved(CallArg::Object(arg));
                }
                Ok(Argument::Input(index as u16))
            }
            None => self.push_input(Input::Resolved(CallArg::Object(arg))),
        }
    }

    /// Add a pure value input.
    pub fn pure(&mut self, value: PureValue) -> TransactionResult<Argument> {
        let bytes = value.encode()?;
        self.push_input(Input::Resolved(CallArg::Pure(bytes)))
    }

    /// Add an input described by an [`InputSpec`].
    pub fn input(&mut self, spec: InputSpec) -> TransactionResult<Argument> {
        match spec {
            InputSpec::Object(id) => self.object(&id),
            InputSpec::Shared {
                id,
                initial_shared_version,
            } => self.shared_object(&id, initial_shared_version, true),
            InputSpec::Pure(value) => self.pure(value),
        }
    }

    /// Append a move call and return a reference to its result.
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: Vec<String>,
        arguments: Vec<Argument>,
    ) -> TransactionResult<Argument> {
        let target: CallTarget = target.parse()?;
        let type_arguments = type_arguments
            .iter()
            .map(|t| t.parse::<TypeTag>())
            .collect::<TransactionResult<Vec<_>>>()?;
        for arg in &arguments {
            self.check_argument(arg)?;
        }
        self.push_command(Command::MoveCall(Box::new(MoveCall {
            package: *target.package(),
            module: target.module().to_string(),
            function: target.function().to_string(),
            type_arguments,
            arguments,
        })))
    }

    /// Split `amounts` off `coin`; the result holds one new coin per amount.
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> TransactionResult<Argument> {
        if amounts.is_empty() {
            return Err(TransactionError::InvalidArgument(
                "split requires at least one amount".to_string(),
            ));
        }
        self.check_argument(&coin)?;
        for amount in &amounts {
            self.check_argument(amount)?;
        }
        self.push_command(Command::SplitCoins(coin, amounts))
    }

    /// Split a single coin of `amount` off `coin` and return it.
    pub fn split_coin(&mut self, coin: Argument, amount: u64) -> TransactionResult<Argument> {
        let amount = self.pure(PureValue::U64(amount))?;
        match self.split_coins(coin, vec![amount])? {
            Argument::Result(index) => Ok(Argument::NestedResult(index, 0)),
            other => Ok(other),
        }
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, address: Argument) -> TransactionResult<()> {
        if objects.is_empty() {
            return Err(TransactionError::InvalidArgument(
                "transfer requires at least one object".to_string(),
            ));
        }
        for obj in &objects {
            self.check_argument(obj)?;
        }
        self.check_argument(&address)?;
        self.push_command(Command::TransferObjects(objects, address))?;
        Ok(())
    }

    /// Finish the intent. Fails when no command was added.
    pub fn build(self) -> TransactionResult<UnsignedTransactionIntent> {
        UnsignedTransactionIntent::new(self.inputs, self.commands)
    }

    fn position_of(&self, id: &Address) -> Option<usize> {
        self.inputs
            .iter()
            .position(|input| input.object_id() == Some(id))
    }

    fn push_input(&mut self, input: Input) -> TransactionResult<Argument> {
        let index = u16::try_from(self.inputs.len())
            .map_err(|_| TransactionError::InvalidArgument("too many inputs".to_string()))?;
        self.inputs.push(input);
        Ok(Argument::Input(index))
    }

    fn push_command(&mut self, command: Command) -> TransactionResult<Argument> {
        if self.commands.len() >= MAX_COMMANDS {
            return Err(TransactionError::TooManyCommands(self.commands.len() + 1));
        }
        let index = self.commands.len() as u16;
        self.commands.push(command);
        Ok(Argument::Result(index))
    }

    fn check_argument(&self, arg: &Argument) -> TransactionResult<()> {
        let (kind, index, bound) = match *arg {
            Argument::GasCoin => return Ok(()),
            Argument::Input(i) => ("input", i, self.inputs.len()),
            Argument::Result(i) | Argument::NestedResult(i, _) => ("result", i, self.commands.len()),
        };
        if (index as usize) < bound {
            Ok(())
        } else {
            Err(TransactionError::InvalidArgument(format!(
                "{kind} {index} does not exist ({bound} available)"
            )))
        }
    }
}

/// Textual description of one call input, `kind:value`.
///
/// Supported kinds: `object`, `shared` (`shared:0xID@VERSION`), `u8`, `u64`,
/// `bool`, `address`, `string`, `hex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    Object(String),
    Shared { id: String, initial_shared_version: u64 },
    Pure(PureValue),
}

impl FromStr for InputSpec {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransactionError::InvalidInput(s.to_string());
        let (kind, value) = s.split_once(':').ok_or_else(invalid)?;

        let spec = match kind {
            "object" => InputSpec::Object(value.parse::<Address>()?.to_string()),
            "shared" => {
                let (id, version) = value.split_once('@').ok_or_else(invalid)?;
                InputSpec::Shared {
                    id: id.parse::<Address>()?.to_string(),
                    initial_shared_version: version.parse().map_err(|_| invalid())?,
                }
            }
            "u8" => InputSpec::Pure(PureValue::U8(value.parse().map_err(|_| invalid())?)),
            "u64" => InputSpec::Pure(PureValue::U64(value.parse().map_err(|_| invalid())?)),
            "bool" => InputSpec::Pure(PureValue::Bool(value.parse().map_err(|_| invalid())?)),
            "address" => InputSpec::Pure(PureValue::Address(value.parse::<Address>()?.to_string())),
            "string" => InputSpec::Pure(PureValue::String(value.to_string())),
            "hex" => {
                let bytes = alloy::hex::decode(value).map_err(|_| invalid())?;
                InputSpec::Pure(PureValue::Bytes(bytes))
            }
            _ => return Err(invalid()),
        };
        Ok(spec)
    }
}

/// Build a single-call intent from a target and its inputs.
pub fn build(target: &str, args: Vec<InputSpec>) -> TransactionResult<UnsignedTransactionIntent> {
    let mut tx = TransactionBuilder::new();
    let arguments = args
        .into_iter()
        .map(|spec| tx.input(spec))
        .collect::<TransactionResult<Vec<_>>>()?;
    tx.move_call(target, Vec::new(), arguments)?;
    tx.build()
}
