//! Move type arguments, parsed from their textual form.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::transaction::intent::{is_identifier, Address, TransactionError, TransactionResult};

/// A Move type. Variant order is part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    pub address: Address,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl FromStr for TypeTag {
    type Err = TransactionError;

    /// Parses `u64`, `vector<u8>`, `0x2::sui::SUI`, `0x2::coin::Coin<0x2::sui::SUI>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { input: s, rest: s };
        let tag = parser.tag()?;
        if !parser.rest.trim().is_empty() {
            return Err(parser.invalid());
        }
        Ok(tag)
    }
}

struct Parser<'a> {
    input: &'a str,
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn invalid(&self) -> TransactionError {
        TransactionError::InvalidTypeTag(self.input.to_string())
    }

    fn word(&mut self) -> &'a str {
        self.rest = self.rest.trim_start();
        let end = self
            .rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == ':'))
            .unwrap_or(self.rest.len());
        let (word, rest) = self.rest.split_at(end);
        self.rest = rest;
        word
    }

    fn eat(&mut self, c: char) -> bool {
        self.rest = self.rest.trim_start();
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn require(&mut self, c: char) -> TransactionResult<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.invalid())
        }
    }

    fn tag(&mut self) -> TransactionResult<TypeTag> {
        let tag = match self.word() {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            "vector" => {
                self.require('<')?;
                let inner = self.tag()?;
                self.require('>')?;
                TypeTag::Vector(Box::new(inner))
            }
            path => TypeTag::Struct(Box::new(self.struct_tag(path)?)),
        };
        Ok(tag)
    }

    fn struct_tag(&mut self, path: &str) -> TransactionResult<StructTag> {
        let parts: Vec<&str> = path.split("::").collect();
        let [address, module, name] = parts.as_slice() else {
            return Err(self.invalid());
        };
        if !is_identifier(module) || !is_identifier(name) {
            return Err(self.invalid());
        }
        let address: Address = address.parse().map_err(|_| self.invalid())?;

        let mut type_params = Vec::new();
        if self.eat('<') {
            loop {
                type_params.push(self.tag()?);
                if self.eat('>') {
                    break;
                }
                self.require(',')?;
            }
        }

        Ok(StructTag {
            address,
            module: module.to_string(),
            name: name.to_string(),
            type_params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_and_vectors() {
        assert_eq!("u64".parse::<TypeTag>().unwrap(), TypeTag::U64);
        assert_eq!(
            "vector<vector<u8>>".parse::<TypeTag>().unwrap(),
            TypeTag::Vector(Box::new(TypeTag::Vector(Box::new(TypeTag::U8))))
        );
    }

    #[test]
    fn test_generic_struct() {
        let tag: TypeTag = "0x2::coin::Coin<0x2::sui::SUI>".parse().unwrap();
        let TypeTag::Struct(coin) = tag else {
            panic!("expected struct tag");
        };
        assert_eq!(coin.module, "coin");
        assert_eq!(coin.name, "Coin");
        assert_eq!(coin.address, "0x2".parse::<Address>().unwrap());
        assert!(matches!(&coin.type_params[..], [TypeTag::Struct(sui)] if sui.name == "SUI"));
    }

    #[test]
    fn test_multiple_params() {
        let tag: TypeTag = "0x1::pool::Pool<u8, 0x2::sui::SUI>".parse().unwrap();
        let TypeTag::Struct(pool) = tag else {
            panic!("expected struct tag");
        };
        assert_eq!(pool.type_params.len(), 2);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "vector<u8", "u64>", "0x2::coin", "0x2::coin::Coin<>", "u8<u8>", "0xzz::m::T"] {
            assert!(bad.parse::<TypeTag>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_wire_variant_indices() {
        assert_eq!(bcs::to_bytes(&TypeTag::U64).unwrap(), vec![2]);
        assert_eq!(bcs::to_bytes(&TypeTag::U16).unwrap(), vec![8]);
    }
}
