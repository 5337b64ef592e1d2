// Responsible for all communication with the registry and reverse contracts.

use super::abi::{self, Token};
use super::{LedgerGateway, PendingTx, TxStatus};
use crate::domain::{Address, RecordField, RecordSet};
use crate::infra::wallet::{RpcError, WalletContext, WalletProvider};
use async_trait::async_trait;
use primitive_types::{H256, U256};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;

/// Gateway over the wallet's JSON-RPC interface. Reads use `eth_call`, writes use
/// `eth_sendTransaction` signed by the context's account.
pub struct RpcLedger {
    wallet: Arc<dyn WalletProvider>,
    registry: Address,
    reverse: Address,
    poll_interval: Duration,
}

fn to_hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn from_hex_data(value: &JsonValue) -> anyhow::Result<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("expected hex string, got {}", value))?;
    Ok(hex::decode(s.trim_start_matches("0x"))?)
}

fn parse_tx_hash(value: &JsonValue) -> anyhow::Result<H256> {
    let bytes = from_hex_data(value)?;
    if bytes.len() != 32 {
        return Err(anyhow::anyhow!("transaction hash must be 32 bytes, got {}", bytes.len()));
    }
    Ok(H256::from_slice(&bytes))
}

impl RpcLedger {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        registry: Address,
        reverse: Address,
        poll_interval: Duration,
    ) -> Self {
        Self {
            wallet,
            registry,
            reverse,
            poll_interval,
        }
    }

    fn call_params(ctx: &WalletContext, to: Address, data: Vec<u8>) -> JsonValue {
        let mut call = json!({
            "to": to.to_string(),
            "data": to_hex_data(&data),
        });
        if let Some(from) = ctx.account {
            call["from"] = JsonValue::String(from.to_string());
        }
        json!([call, "latest"])
    }

    async fn call(&self, ctx: &WalletContext, data: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        let result = self
            .wallet
            .request("eth_call", Self::call_params(ctx, self.registry, data))
            .await?;
        from_hex_data(&result)
    }

    async fn send(
        &self,
        ctx: &WalletContext,
        to: Address,
        data: Vec<u8>,
        value: Option<U256>,
    ) -> anyhow::Result<PendingTx> {
        let from = ctx.signer()?;
        let mut tx = json!({
            "from": from.to_string(),
            "to": to.to_string(),
            "data": to_hex_data(&data),
        });
        if let Some(v) = value {
            tx["value"] = JsonValue::String(format!("0x{:x}", v));
        }
        let hash = self.wallet.request("eth_sendTransaction", json!([tx])).await?;
        Ok(PendingTx {
            hash: parse_tx_hash(&hash)?,
        })
    }
}

#[async_trait]
impl LedgerGateway for RpcLedger {
    async fn lookup_id(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<bool> {
        let data = abi::encode_call(abi::GET_ID, &[Token::Str(name)]);
        match self
            .wallet
            .request("eth_call", Self::call_params(ctx, self.registry, data))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_revert() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_records(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<RecordSet> {
        let out = self
            .call(ctx, abi::encode_call(abi::GET_RECORDS, &[Token::Str(name)]))
            .await?;
        let (values, owner) = abi::decode_records(&out)?;
        Ok(RecordSet::from_ledger_values(&values, owner))
    }

    async fn get_record(
        &self,
        ctx: &WalletContext,
        name: &str,
        field: RecordField,
    ) -> anyhow::Result<String> {
        let data = abi::encode_call(
            abi::GET_RECORD,
            &[Token::Str(name), Token::Uint(U256::from(field.selector()))],
        );
        let out = self.call(ctx, data).await?;
        Ok(abi::decode_string(&out)?)
    }

    async fn get_address(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<Address> {
        let out = self
            .call(ctx, abi::encode_call(abi::GET_ADDRESS, &[Token::Str(name)]))
            .await?;
        Ok(abi::decode_address(&out)?)
    }

    async fn enumerate_names(&self, ctx: &WalletContext) -> anyhow::Result<Vec<String>> {
        let out = self.call(ctx, abi::encode_call(abi::GET_ALL_NAMES, &[])).await?;
        Ok(abi::decode_string_array(&out)?)
    }

    async fn register(&self, ctx: &WalletContext, name: &str, price: U256) -> anyhow::Result<PendingTx> {
        let data = abi::encode_call(abi::REGISTER, &[Token::Str(name)]);
        self.send(ctx, self.registry, data, Some(price)).await
    }

    async fn set_records(
        &self,
        ctx: &WalletContext,
        name: &str,
        records: &RecordSet,
    ) -> anyhow::Result<PendingTx> {
        let mut args = vec![Token::Str(name)];
        args.extend(RecordField::ALL.iter().map(|f| Token::Str(records.get(*f))));
        let data = abi::encode_call(abi::SET_RECORDS, &args);
        self.send(ctx, self.registry, data, None).await
    }

    async fn set_reverse(&self, ctx: &WalletContext, name: &str) -> anyhow::Result<PendingTx> {
        let data = abi::encode_call(abi::SET_REVERSE, &[Token::Str(name)]);
        self.send(ctx, self.reverse, data, None).await
    }

    async fn wait(&self, tx: &PendingTx) -> anyhow::Result<TxStatus> {
        let params = json!([tx.hash_hex()]);
        loop {
            let receipt = match self
                .wallet
                .request("eth_getTransactionReceipt", params.clone())
                .await
            {
                Ok(receipt) => receipt,
                // Transport failures are retried like a missing receipt.
                Err(RpcError::Transport(reason)) => {
                    eprintln!(
                        "> Ledger: receipt poll for {} failed, retrying: {}",
                        tx.hash_hex(),
                        reason
                    );
                    tokio::time::sleep(self.poll_interval).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if receipt.is_null() {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }
            let status = receipt.get("status").and_then(|s| s.as_str()).unwrap_or("0x0");
            return Ok(if status == "0x1" {
                TxStatus::Success
            } else {
                TxStatus::Failed
            });
        }
    }
}
