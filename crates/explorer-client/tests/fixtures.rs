// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Explorer response fixtures shared by the integration tests

use alloy_primitives::Address;
use serde_json::{Value, json};

pub const TEST_API_KEY: &str = "test-api-key";

pub fn account() -> Address {
    Address::from([0x11; 20])
}

pub fn incubator() -> Address {
    Address::from([0x22; 20])
}

pub fn token() -> Address {
    Address::from([0x55; 20])
}

/// Successful envelope around `result`
pub fn ok(result: Value) -> Value {
    json!({"status": "1", "message": "OK", "result": result})
}

/// Explorer error envelope carrying `detail`
pub fn notok(detail: &str) -> Value {
    json!({"status": "0", "message": "NOTOK", "result": detail})
}

/// Empty list envelope, which the explorer reports with status 0
pub fn no_transactions() -> Value {
    json!({"status": "0", "message": "No transactions found", "result": []})
}

pub fn transaction(from: Address, to: Address, value: &str) -> Value {
    json!({
        "blockNumber": "38123456",
        "timeStamp": "1714000000",
        "hash": "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060",
        "nonce": "7",
        "blockHash": "0x9f0c6c4a1f4bd6e1b5e1a2f8b0a0a3b6c1d2e3f405162738495a6b7c8d9e0f1a",
        "transactionIndex": "12",
        "from": from.to_string().to_lowercase(),
        "to": to.to_string().to_lowercase(),
        "value": value,
        "gas": "21000",
        "gasPrice": "3000000000",
        "isError": "0",
        "txreceipt_status": "1",
        "input": "0x",
        "contractAddress": "",
        "cumulativeGasUsed": "1234567",
        "gasUsed": "21000",
        "confirmations": "120",
        "methodId": "0x",
        "functionName": ""
    })
}

pub fn token_transfer(from: Address, to: Address, contract: Address, value: &str) -> Value {
    json!({
        "blockNumber": "38123460",
        "timeStamp": "1714000100",
        "hash": "0x0b5d5b6b4fbbd4dfe6b4b4f1c0b6a3b3a7f7d09d1f1e2c3b4a5968778695a4b3",
        "nonce": "8",
        "blockHash": "0x1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f809",
        "from": from.to_string().to_lowercase(),
        "contractAddress": contract.to_string().to_lowercase(),
        "to": to.to_string().to_lowercase(),
        "value": value,
        "tokenName": "Tether USD",
        "tokenSymbol": "USDT",
        "tokenDecimal": "18",
        "transactionIndex": "3",
        "gas": "60000",
        "gasPrice": "3000000000",
        "gasUsed": "51000",
        "cumulativeGasUsed": "2345678",
        "input": "deprecated",
        "confirmations": "100"
    })
}
