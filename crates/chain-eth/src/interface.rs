//! JSON contract interface (the `abi` array emitted by the Solidity compiler)
//! and lookup of function/constructor argument types.

use serde::Deserialize;
use serde_json::Value;

use crate::abi::{self, AbiType};
use crate::error::EthError;

/// Kind of an interface member. Events, errors, fallback and receive entries
/// all collapse into `Other` and are ignored by lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Function,
    Constructor,
    #[serde(other)]
    Other,
}

/// One typed input of a function or constructor.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberInput {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
}

/// One member descriptor of a contract interface.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    /// Solidity ABI JSON treats a missing `type` as `function`.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: MemberKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<MemberInput>,
}

fn default_kind() -> MemberKind {
    MemberKind::Function
}

impl Member {
    /// Type tags of the inputs, in declaration order.
    pub fn input_types(&self) -> Vec<String> {
        self.inputs.iter().map(|i| i.type_tag.clone()).collect()
    }
}

/// An ordered contract interface.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ContractInterface {
    pub members: Vec<Member>,
}

impl ContractInterface {
    /// Parses the compiler's JSON ABI array.
    pub fn from_json_str(json: &str) -> Result<Self, EthError> {
        serde_json::from_str(json).map_err(|e| EthError::InvalidInterface(e.to_string()))
    }

    /// Builds an interface from an already-parsed JSON value.
    pub fn from_json_value(value: Value) -> Result<Self, EthError> {
        serde_json::from_value(value).map_err(|e| EthError::InvalidInterface(e.to_string()))
    }

    /// Input type lists of every function named exactly `name`, in declaration
    /// order. Overloads yield several lists; an unknown name yields none.
    pub fn select_function_types(&self, name: &str) -> Vec<Vec<String>> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Function && m.name.as_deref() == Some(name))
            .map(Member::input_types)
            .collect()
    }

    /// Input type lists of every constructor taking exactly `arg_count`
    /// arguments. An empty result is not an error here; callers decide.
    pub fn select_constructor_types(&self, arg_count: usize) -> Vec<Vec<String>> {
        self.constructors()
            .filter(|m| m.inputs.len() == arg_count)
            .map(Member::input_types)
            .collect()
    }

    /// Resolves the single function `name` callable with `arg_count`
    /// arguments.
    ///
    /// Overloads are narrowed by arity. If more than one candidate remains the
    /// call is rejected rather than guessing; encode with explicit types via
    /// [`abi::encode_function_call`] instead.
    pub fn function_types(&self, name: &str, arg_count: usize) -> Result<Vec<AbiType>, EthError> {
        let candidates = self.select_function_types(name);
        if candidates.is_empty() {
            return Err(EthError::UnknownFunction(name.to_string()));
        }

        let mut by_arity: Vec<&Vec<String>> =
            candidates.iter().filter(|t| t.len() == arg_count).collect();
        match by_arity.len() {
            0 if candidates.len() == 1 => Err(EthError::ArgumentCountMismatch {
                expected: candidates[0].len(),
                actual: arg_count,
            }),
            0 => Err(EthError::UnknownFunction(format!(
                "{name} with {arg_count} arguments"
            ))),
            1 => AbiType::parse_all(by_arity.remove(0)),
            n => Err(EthError::AmbiguousFunction {
                name: name.to_string(),
                candidates: n,
            }),
        }
    }

    /// Resolves the constructor taking `arg_count` arguments.
    ///
    /// Returns `Ok(None)` when the interface declares no constructor and no
    /// arguments are given (the implicit default constructor). Several
    /// constructors with the same arity are rejected; pick one with
    /// [`ContractInterface::constructor_types_at`].
    pub fn constructor_types(&self, arg_count: usize) -> Result<Option<Vec<AbiType>>, EthError> {
        let mut candidates = self.select_constructor_types(arg_count);
        match candidates.len() {
            0 if arg_count == 0 && self.constructors().next().is_none() => Ok(None),
            0 => Err(EthError::NoMatchingConstructor(arg_count)),
            1 => AbiType::parse_all(&candidates.remove(0)).map(Some),
            n => Err(EthError::AmbiguousConstructor(n)),
        }
    }

    /// Types of the `index`-th constructor in declaration order.
    pub fn constructor_types_at(&self, index: usize) -> Result<Vec<AbiType>, EthError> {
        let member = self.constructors().nth(index).ok_or_else(|| {
            EthError::InvalidInterface(format!("no constructor at index {index}"))
        })?;
        AbiType::parse_all(&member.input_types())
    }

    fn constructors(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Constructor)
    }
}

/// Calldata for `method` with JSON `args`: selector followed by the encoded
/// arguments.
pub fn function_call_data(
    interface: &ContractInterface,
    method: &str,
    args: &[Value],
) -> Result<Vec<u8>, EthError> {
    let types = interface.function_types(method, args.len())?;
    let values = abi::values_from_json(&types, args)?;
    abi::encode_function_call(method, &types, &values)
}

/// Encodes a call to `method` with JSON `args`, returning `0x`-prefixed hex.
pub fn encode_function_call(
    interface: &ContractInterface,
    method: &str,
    args: &[Value],
) -> Result<String, EthError> {
    let data = function_call_data(interface, method, args)?;
    Ok(format!("0x{}", hex::encode(data)))
}

/// Encodes constructor `args` (no selector), returning `0x`-prefixed hex.
/// The result is appended to contract creation bytecode.
pub fn encode_constructor_call(
    interface: &ContractInterface,
    args: &[Value],
) -> Result<String, EthError> {
    let types = interface.constructor_types(args.len())?.unwrap_or_default();
    encode_constructor_with_types(&types, args)
}

/// Like [`encode_constructor_call`] but with the constructor chosen by index.
pub fn encode_constructor_call_at(
    interface: &ContractInterface,
    index: usize,
    args: &[Value],
) -> Result<String, EthError> {
    let types = interface.constructor_types_at(index)?;
    encode_constructor_with_types(&types, args)
}

fn encode_constructor_with_types(types: &[AbiType], args: &[Value]) -> Result<String, EthError> {
    let values = abi::values_from_json(types, args)?;
    let data = abi::encode_params(types, &values)?;
    Ok(format!("0x{}", hex::encode(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn interface(value: Value) -> ContractInterface {
        ContractInterface::from_json_value(value).unwrap()
    }

    fn token_interface() -> ContractInterface {
        interface(json!([
            {"type": "constructor", "inputs": [{"name": "supply", "type": "uint256"}]},
            {"type": "function", "name": "transfer", "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ]},
            {"type": "function", "name": "mint", "inputs": [{"name": "amount", "type": "uint256"}]},
            {"type": "function", "name": "mint", "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ]},
            {"type": "event", "name": "Transfer", "inputs": [
                {"name": "from", "type": "address"},
                {"name": "to", "type": "address"},
                {"name": "value", "type": "uint256"}
            ]},
            {"type": "fallback"}
        ]))
    }

    #[test]
    fn select_function_types_exact_name() {
        let abi = token_interface();
        assert_eq!(
            abi.select_function_types("transfer"),
            vec![vec!["address".to_string(), "uint256".to_string()]]
        );
        assert_eq!(abi.select_function_types("mint").len(), 2);
        assert!(abi.select_function_types("Transfer").is_empty());
        assert!(abi.select_function_types("transferFrom").is_empty());
    }

    #[test]
    fn select_constructor_types_by_arity() {
        let abi = token_interface();
        assert_eq!(
            abi.select_constructor_types(1),
            vec![vec!["uint256".to_string()]]
        );
        assert!(abi.select_constructor_types(2).is_empty());
    }

    #[test]
    fn missing_type_defaults_to_function() {
        let abi = interface(json!([{"name": "ping", "inputs": []}]));
        assert_eq!(abi.members[0].kind, MemberKind::Function);
        assert_eq!(abi.select_function_types("ping"), vec![Vec::<String>::new()]);
    }

    #[test]
    fn overloads_are_narrowed_by_arity() {
        let abi = token_interface();
        assert_eq!(abi.function_types("mint", 1).unwrap(), vec![AbiType::Uint(256)]);
        assert_eq!(
            abi.function_types("mint", 2).unwrap(),
            vec![AbiType::Address, AbiType::Uint(256)]
        );
        assert!(matches!(
            abi.function_types("mint", 3),
            Err(EthError::UnknownFunction(_))
        ));
    }

    #[test]
    fn same_arity_overloads_are_ambiguous() {
        let abi = interface(json!([
            {"type": "function", "name": "f", "inputs": [{"type": "uint256"}]},
            {"type": "function", "name": "f", "inputs": [{"type": "address"}]}
        ]));
        assert!(matches!(
            abi.function_types("f", 1),
            Err(EthError::AmbiguousFunction { candidates: 2, .. })
        ));
    }

    #[test]
    fn unknown_function_and_wrong_arity() {
        let abi = token_interface();
        assert!(matches!(
            abi.function_types("burn", 1),
            Err(EthError::UnknownFunction(_))
        ));
        assert!(matches!(
            abi.function_types("transfer", 1),
            Err(EthError::ArgumentCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn encode_set_42_end_to_end() {
        let abi = interface(json!([
            {"type": "function", "name": "set", "inputs": [{"type": "uint256"}]}
        ]));
        let payload = encode_function_call(&abi, "set", &[json!(42)]).unwrap();
        assert_eq!(payload, format!("0x60fe47b1{:0>64}", "2a"));
    }

    #[test]
    fn encode_transfer_payload() {
        let abi = token_interface();
        let payload = encode_function_call(
            &abi,
            "transfer",
            &[
                json!("0xdead000000000000000000000000000000000000"),
                json!("1000000000000000000"),
            ],
        )
        .unwrap();

        assert!(payload.starts_with("0xa9059cbb000000000000000000000000dead"));
        assert!(payload.ends_with("0de0b6b3a7640000"));
        assert_eq!(payload.len(), 2 + 8 + 128);
    }

    #[test]
    fn unsupported_input_type_is_fatal() {
        let abi = interface(json!([
            {"type": "function", "name": "g", "inputs": [{"type": "tuple"}]}
        ]));
        assert!(matches!(
            encode_function_call(&abi, "g", &[json!([])]),
            Err(EthError::UnsupportedType(_))
        ));
    }

    #[test]
    fn constructor_encoding_has_no_selector() {
        let abi = token_interface();
        let payload = encode_constructor_call(&abi, &[json!(1000)]).unwrap();
        assert_eq!(payload, format!("0x{:0>64}", "3e8"));
    }

    #[test]
    fn implicit_constructor_encodes_empty() {
        let abi = interface(json!([
            {"type": "function", "name": "set", "inputs": [{"type": "uint256"}]}
        ]));
        assert_eq!(encode_constructor_call(&abi, &[]).unwrap(), "0x");
        assert!(matches!(
            encode_constructor_call(&abi, &[json!(1)]),
            Err(EthError::NoMatchingConstructor(1))
        ));
    }

    #[test]
    fn ambiguous_constructor_requires_index() {
        let abi = interface(json!([
            {"type": "constructor", "inputs": [{"type": "uint256"}]},
            {"type": "constructor", "inputs": [{"type": "address"}]}
        ]));
        assert!(matches!(
            encode_constructor_call(&abi, &[json!(1)]),
            Err(EthError::AmbiguousConstructor(2))
        ));

        let payload = encode_constructor_call_at(
            &abi,
            1,
            &[json!("0x000000000000000000000000000000000000dEaD")],
        )
        .unwrap();
        assert!(payload.ends_with("dead"));
        assert!(encode_constructor_call_at(&abi, 2, &[]).is_err());
    }

    #[test]
    fn malformed_interface_is_rejected() {
        assert!(matches!(
            ContractInterface::from_json_str("{\"not\": \"an array\"}"),
            Err(EthError::InvalidInterface(_))
        ));
    }
}
