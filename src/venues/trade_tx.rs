// Router transaction decoding
// The router returns the swap as a serialized transaction: either the JSON
// document (version 2) the TypeScript SDK produces with `Transaction.serialize`,
// or base64 BCS `TransactionData` / `TransactionKind`. This file turns either
// form into a programmable transaction, resolving object inputs the router
// left unresolved through the node
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::metrics::{REQ_ERRORS, REQ_LATENCY};
use crate::transport::jsonrpc::parse_u64;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use sui_sdk::rpc_types::SuiObjectDataOptions;
use sui_sdk::types::base_types::{ObjectID, ObjectRef, SequenceNumber};
use sui_sdk::types::digests::ObjectDigest;
use sui_sdk::types::object::Owner;
use sui_sdk::types::transaction::{
    Argument, CallArg, Command, ObjectArg, ProgrammableTransaction, TransactionData,
    TransactionDataAPI, TransactionKind,
};
use sui_sdk::types::{parse_sui_type_tag, Identifier};
use sui_sdk::SuiClient;

/// How an object input the router left unresolved is owned on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedObject {
    Owned(ObjectRef),
    Shared { initial_shared_version: SequenceNumber },
}

/// Looks up ownership and current reference of objects.
#[async_trait]
pub trait ObjectResolver: Send + Sync {
    async fn resolve_objects(
        &self,
        ids: &[ObjectID],
    ) -> Result<HashMap<ObjectID, ResolvedObject>, SwapError>;
}

#[async_trait]
impl ObjectResolver for SuiClient {
    async fn resolve_objects(
        &self,
        ids: &[ObjectID],
    ) -> Result<HashMap<ObjectID, ResolvedObject>, SwapError> {
        let _timer = REQ_LATENCY
            .with_label_values(&["sui_client", "multi_get_objects"])
            .start_timer();
        let responses = self
            .read_api()
            .multi_get_object_with_options(ids.to_vec(), SuiObjectDataOptions::new().with_owner())
            .await
            .map_err(|e| {
                REQ_ERRORS
                    .with_label_values(&["sui_client", "multi_get_objects"])
                    .inc();
                SwapError::Transport(format!("fetch router input objects: {e}"))
            })?;

        let mut resolved = HashMap::with_capacity(responses.len());
        for resp in responses {
            let Some(data) = resp.data else {
                return Err(SwapError::RouteResolution(
                    "router referenced an object that does not exist".into(),
                ));
            };
            let kind = match data.owner {
                Some(Owner::Shared {
                    initial_shared_version,
                }) => ResolvedObject::Shared {
                    initial_shared_version,
                },
                Some(_) => ResolvedObject::Owned(data.object_ref()),
                None => {
                    return Err(SwapError::Provider(format!(
                        "object {} returned without owner",
                        data.object_id
                    )))
                }
            };
            resolved.insert(data.object_id, kind);
        }
        Ok(resolved)
    }
}

/// Input slot of a decoded transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedInput {
    Ready(CallArg),
    /// Object known only by id; `mutable` applies if it turns out to be shared.
    Unresolved { id: ObjectID, mutable: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTransaction {
    pub inputs: Vec<DecodedInput>,
    pub commands: Vec<Command>,
}

impl DecodedTransaction {
    pub fn unresolved_ids(&self) -> Vec<ObjectID> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                DecodedInput::Unresolved { id, .. } => Some(*id),
                DecodedInput::Ready(_) => None,
            })
            .collect()
    }

    pub fn into_programmable(
        self,
        objects: &HashMap<ObjectID, ResolvedObject>,
    ) -> Result<ProgrammableTransaction, SwapError> {
        let inputs = self
            .inputs
            .into_iter()
            .map(|input| match input {
                DecodedInput::Ready(arg) => Ok(arg),
                DecodedInput::Unresolved { id, mutable } => match objects.get(&id) {
                    Some(ResolvedObject::Owned(obj_ref)) => {
                        Ok(CallArg::Object(ObjectArg::ImmOrOwnedObject(*obj_ref)))
                    }
                    Some(ResolvedObject::Shared {
                        initial_shared_version,
                    }) => Ok(CallArg::Object(ObjectArg::SharedObject {
                        id,
                        initial_shared_version: *initial_shared_version,
                        mutable,
                    })),
                    None => Err(SwapError::RouteResolution(format!(
                        "router input object {id} could not be resolved"
                    ))),
                },
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProgrammableTransaction {
            inputs,
            commands: self.commands,
        })
    }
}

/// Decode a router transaction response body.
pub fn decode_router_transaction(body: &Value) -> Result<DecodedTransaction, SwapError> {
    match body {
        Value::Object(_) => decode_json(body),
        Value::String(s) if s.trim_start().starts_with('{') => {
            let doc: Value = serde_json::from_str(s)
                .map_err(|e| route_err(format!("serialized transaction json: {e}")))?;
            decode_json(&doc)
        }
        Value::String(s) => decode_bcs(s),
        other => Err(route_err(format!(
            "unexpected router transaction payload: {other}"
        ))),
    }
}

fn route_err(msg: impl Into<String>) -> SwapError {
    SwapError::RouteResolution(msg.into())
}

fn decode_bcs(b64: &str) -> Result<DecodedTransaction, SwapError> {
    let bytes = B64
        .decode(b64.trim())
        .map_err(|e| route_err(format!("transaction base64: {e}")))?;
    let kind = match bcs::from_bytes::<TransactionData>(&bytes) {
        Ok(data) => data.kind().clone(),
        Err(_) => bcs::from_bytes::<TransactionKind>(&bytes)
            .map_err(|e| route_err(format!("transaction bcs: {e}")))?,
    };
    match kind {
        TransactionKind::ProgrammableTransaction(pt) => Ok(DecodedTransaction {
            inputs: pt.inputs.into_iter().map(DecodedInput::Ready).collect(),
            commands: pt.commands,
        }),
        _ => Err(route_err("router returned a non-programmable transaction")),
    }
}

#[derive(Deserialize)]
struct SerializedTransaction {
    version: u64,
    #[serde(default)]
    inputs: Vec<Value>,
    #[serde(default)]
    commands: Vec<Value>,
}

fn decode_json(doc: &Value) -> Result<DecodedTransaction, SwapError> {
    let tx: SerializedTransaction = serde_json::from_value(doc.clone())
        .map_err(|e| route_err(format!("serialized transaction: {e}")))?;
    if tx.version != 2 {
        return Err(route_err(format!(
            "unsupported serialized transaction version {}",
            tx.version
        )));
    }
    Ok(DecodedTransaction {
        inputs: tx.inputs.iter().map(decode_input).collect::<Result<_, _>>()?,
        commands: tx.commands.iter().map(decode_command).collect::<Result<_, _>>()?,
    })
}

/// Split `{"$kind": "X", "X": {...}}` into its variant name and body.
fn variant(value: &Value) -> Result<(&str, &Value), SwapError> {
    let map = value
        .as_object()
        .ok_or_else(|| route_err(format!("expected tagged object, got {value}")))?;
    if let Some(kind) = map.get("$kind").and_then(Value::as_str) {
        if let Some(body) = map.get(kind) {
            return Ok((kind, body));
        }
    }
    map.iter()
        .find(|(key, _)| key.as_str() != "$kind")
        .map(|(key, body)| (key.as_str(), body))
        .ok_or_else(|| route_err(format!("empty tagged object {value}")))
}

fn field<'a>(body: &'a Value, name: &str) -> Result<&'a Value, SwapError> {
    body.get(name)
        .ok_or_else(|| route_err(format!("missing field `{name}` in {body}")))
}

fn str_field<'a>(body: &'a Value, name: &str) -> Result<&'a str, SwapError> {
    field(body, name)?
        .as_str()
        .ok_or_else(|| route_err(format!("field `{name}` is not a string")))
}

fn u64_field(body: &Value, name: &str) -> Result<u64, SwapError> {
    parse_u64(field(body, name)?).ok_or_else(|| route_err(format!("field `{name}` is not a u64")))
}

fn object_id(raw: &str) -> Result<ObjectID, SwapError> {
    ObjectID::from_hex_literal(raw).map_err(|e| route_err(format!("object id {raw}: {e}")))
}

fn object_ref(body: &Value) -> Result<ObjectRef, SwapError> {
    let id = object_id(str_field(body, "objectId")?)?;
    let version = SequenceNumber::from_u64(u64_field(body, "version")?);
    let raw_digest = str_field(body, "digest")?;
    let digest = ObjectDigest::from_str(raw_digest)
        .map_err(|e| route_err(format!("object digest {raw_digest}: {e}")))?;
    Ok((id, version, digest))
}

fn decode_input(value: &Value) -> Result<DecodedInput, SwapError> {
    let (kind, body) = variant(value)?;
    match kind {
        "Pure" => {
            let bytes = B64
                .decode(str_field(body, "bytes")?)
                .map_err(|e| route_err(format!("pure input base64: {e}")))?;
            Ok(DecodedInput::Ready(CallArg::Pure(bytes)))
        }
        "Object" => {
            let (obj_kind, obj) = variant(body)?;
            let arg = match obj_kind {
                "ImmOrOwnedObject" => ObjectArg::ImmOrOwnedObject(object_ref(obj)?),
                "Receiving" => ObjectArg::Receiving(object_ref(obj)?),
                "SharedObject" => ObjectArg::SharedObject {
                    id: object_id(str_field(obj, "objectId")?)?,
                    initial_shared_version: SequenceNumber::from_u64(u64_field(
                        obj,
                        "initialSharedVersion",
                    )?),
                    mutable: obj.get("mutable").and_then(Value::as_bool).unwrap_or(true),
                },
                other => return Err(route_err(format!("unknown object input kind {other}"))),
            };
            Ok(DecodedInput::Ready(CallArg::Object(arg)))
        }
        "UnresolvedObject" => {
            let id = object_id(str_field(body, "objectId")?)?;
            let mutable = body.get("mutable").and_then(Value::as_bool).unwrap_or(true);
            if let Some(initial) = body.get("initialSharedVersion").and_then(parse_u64) {
                return Ok(DecodedInput::Ready(CallArg::Object(ObjectArg::SharedObject {
                    id,
                    initial_shared_version: SequenceNumber::from_u64(initial),
                    mutable,
                })));
            }
            if body.get("version").is_some_and(|v| !v.is_null())
                && body.get("digest").is_some_and(|v| !v.is_null())
            {
                return Ok(DecodedInput::Ready(CallArg::Object(
                    ObjectArg::ImmOrOwnedObject(object_ref(body)?),
                )));
            }
            Ok(DecodedInput::Unresolved { id, mutable })
        }
        other => Err(route_err(format!("unsupported transaction input {other}"))),
    }
}

fn decode_argument(value: &Value) -> Result<Argument, SwapError> {
    let index = |v: &Value| {
        v.as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| route_err(format!("bad argument index {v}")))
    };
    let map = value
        .as_object()
        .ok_or_else(|| route_err(format!("expected argument object, got {value}")))?;
    if map.contains_key("GasCoin") {
        Ok(Argument::GasCoin)
    } else if let Some(i) = map.get("Input") {
        Ok(Argument::Input(index(i)?))
    } else if let Some(i) = map.get("Result") {
        Ok(Argument::Result(index(i)?))
    } else if let Some(pair) = map.get("NestedResult").and_then(Value::as_array) {
        match pair.as_slice() {
            [a, b] => Ok(Argument::NestedResult(index(a)?, index(b)?)),
            _ => Err(route_err(format!("bad nested result {value}"))),
        }
    } else {
        Err(route_err(format!("unknown argument {value}")))
    }
}

fn arguments(body: &Value, name: &str) -> Result<Vec<Argument>, SwapError> {
    field(body, name)?
        .as_array()
        .ok_or_else(|| route_err(format!("field `{name}` is not an array")))?
        .iter()
        .map(decode_argument)
        .collect()
}

fn identifier(raw: &str) -> Result<Identifier, SwapError> {
    Identifier::new(raw).map_err(|e| route_err(format!("identifier {raw}: {e}")))
}

fn decode_command(value: &Value) -> Result<Command, SwapError> {
    let (kind, body) = variant(value)?;
    match kind {
        "MoveCall" => {
            let type_arguments = match body.get("typeArguments").and_then(Value::as_array) {
                Some(tags) => tags
                    .iter()
                    .map(|tag| {
                        let raw = tag
                            .as_str()
                            .ok_or_else(|| route_err(format!("type argument {tag}")))?;
                        parse_sui_type_tag(raw)
                            .map_err(|e| route_err(format!("type argument {raw}: {e}")))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            Ok(Command::move_call(
                object_id(str_field(body, "package")?)?,
                identifier(str_field(body, "module")?)?,
                identifier(str_field(body, "function")?)?,
                type_arguments,
                arguments(body, "arguments")?,
            ))
        }
        "SplitCoins" => Ok(Command::SplitCoins(
            decode_argument(field(body, "coin")?)?,
            arguments(body, "amounts")?,
        )),
        "MergeCoins" => Ok(Command::MergeCoins(
            decode_argument(field(body, "destination")?)?,
            arguments(body, "sources")?,
        )),
        "TransferObjects" => Ok(Command::TransferObjects(
            arguments(body, "objects")?,
            decode_argument(field(body, "address")?)?,
        )),
        "MakeMoveVec" => {
            let ty = match body.get("type").and_then(Value::as_str) {
                Some(raw) => Some(
                    parse_sui_type_tag(raw)
                        .map_err(|e| route_err(format!("vector type {raw}: {e}")))?,
                ),
                None => None,
            };
            Ok(Command::make_move_vec(ty, arguments(body, "elements")?))
        }
        other => Err(route_err(format!("unsupported transaction command {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sui_sdk::types::programmable_transaction_builder::ProgrammableTransactionBuilder;

    const POOL: &str = "0x00000000000000000000000000000000000000000000000000000000000000a1";
    const COIN: &str = "0x00000000000000000000000000000000000000000000000000000000000000c2";

    fn router_json() -> Value {
        json!({
            "version": 2,
            "sender": null,
            "expiration": null,
            "gasData": { "budget": null, "price": null, "owner": null, "payment": null },
            "inputs": [
                { "$kind": "Pure", "Pure": { "bytes": B64.encode(bcs::to_bytes(&1_000_000u64).unwrap()) } },
                { "$kind": "UnresolvedObject", "UnresolvedObject": { "objectId": POOL } },
                { "$kind": "Object", "Object": { "$kind": "SharedObject", "SharedObject": {
                    "objectId": "0x6", "initialSharedVersion": "1", "mutable": false } } },
                { "$kind": "UnresolvedObject", "UnresolvedObject": { "objectId": COIN } }
            ],
            "commands": [
                { "$kind": "SplitCoins", "SplitCoins": {
                    "coin": { "$kind": "GasCoin", "GasCoin": true },
                    "amounts": [{ "$kind": "Input", "Input": 0, "type": "pure" }] } },
                { "$kind": "MoveCall", "MoveCall": {
                    "package": "0x2", "module": "pay", "function": "join",
                    "typeArguments": ["0x2::sui::SUI"],
                    "arguments": [
                        { "$kind": "Input", "Input": 3, "type": "object" },
                        { "$kind": "NestedResult", "NestedResult": [0, 0] }
                    ] } },
                { "$kind": "MergeCoins", "MergeCoins": {
                    "destination": { "$kind": "Input", "Input": 1 },
                    "sources": [{ "$kind": "Result", "Result": 1 }] } }
            ]
        })
    }

    fn resolved() -> HashMap<ObjectID, ResolvedObject> {
        let coin_ref = (
            object_id(COIN).unwrap(),
            SequenceNumber::from_u64(9),
            ObjectDigest::random(),
        );
        HashMap::from([
            (
                object_id(POOL).unwrap(),
                ResolvedObject::Shared {
                    initial_shared_version: SequenceNumber::from_u64(40),
                },
            ),
            (object_id(COIN).unwrap(), ResolvedObject::Owned(coin_ref)),
        ])
    }

    #[test]
    fn serialized_json_decodes_and_resolves() {
        let decoded = decode_router_transaction(&router_json()).unwrap();
        assert_eq!(
            decoded.unresolved_ids(),
            vec![object_id(POOL).unwrap(), object_id(COIN).unwrap()]
        );
        assert_eq!(decoded.commands.len(), 3);
        assert!(matches!(
            &decoded.commands[0],
            Command::SplitCoins(Argument::GasCoin, amounts) if amounts == &vec![Argument::Input(0)]
        ));
        assert!(matches!(
            &decoded.commands[2],
            Command::MergeCoins(Argument::Input(1), sources) if sources == &vec![Argument::Result(1)]
        ));

        let objects = resolved();
        let pt = decoded.into_programmable(&objects).unwrap();
        assert_eq!(pt.inputs.len(), 4);
        assert!(matches!(
            &pt.inputs[1],
            CallArg::Object(ObjectArg::SharedObject { mutable: true, initial_shared_version, .. })
                if *initial_shared_version == SequenceNumber::from_u64(40)
        ));
        assert!(matches!(
            &pt.inputs[2],
            CallArg::Object(ObjectArg::SharedObject { mutable: false, .. })
        ));
        assert!(matches!(
            &pt.inputs[3],
            CallArg::Object(ObjectArg::ImmOrOwnedObject((id, _, _))) if *id == object_id(COIN).unwrap()
        ));
    }

    #[test]
    fn json_string_payload_is_accepted() {
        let body = Value::String(router_json().to_string());
        assert_eq!(decode_router_transaction(&body).unwrap().commands.len(), 3);
    }

    #[test]
    fn missing_resolution_is_a_route_error() {
        let decoded = decode_router_transaction(&router_json()).unwrap();
        assert!(matches!(
            decoded.into_programmable(&HashMap::new()),
            Err(SwapError::RouteResolution(_))
        ));
    }

    #[test]
    fn bcs_kind_payload_decodes() {
        let mut ptb = ProgrammableTransactionBuilder::new();
        ptb.pure(5u64).unwrap();
        let kind = TransactionKind::ProgrammableTransaction(ptb.finish());
        let body = Value::String(B64.encode(bcs::to_bytes(&kind).unwrap()));

        let decoded = decode_router_transaction(&body).unwrap();
        assert!(decoded.unresolved_ids().is_empty());
        let pt = decoded.into_programmable(&HashMap::new()).unwrap();
        assert_eq!(pt.inputs.len(), 1);
    }

    #[test]
    fn unsupported_shapes_are_route_errors() {
        for body in [
            json!({ "version": 1, "inputs": [], "transactions": [] }),
            json!({ "version": 2, "inputs": [{ "UnresolvedPure": { "value": 5 } }], "commands": [] }),
            json!({ "version": 2, "inputs": [], "commands": [{ "$kind": "Publish", "Publish": {} }] }),
            json!("not base64!"),
            json!(42),
        ] {
            assert!(
                matches!(decode_router_transaction(&body), Err(SwapError::RouteResolution(_))),
                "{body}"
            );
        }
    }
}
