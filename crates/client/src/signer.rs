//! Signing of bank transfers through the node CLI.

use crate::{
    cli::NodeCli,
    error::ClientError,
};
use ledger_check_types::{
    coin::format_coins,
    Account,
    Amount,
    Fee,
};
use std::ffi::OsString;

/// Produces signed and encoded `MsgSend` transactions.
///
/// The three steps (generate, sign, encode) are delegated to the node CLI so
/// the keys never leave the keyring.
#[derive(Debug, Clone)]
pub struct CliSigner {
    cli: NodeCli,
    chain_id: String,
    rpc_node: Option<String>,
}

impl CliSigner {
    pub fn new(cli: NodeCli, chain_id: impl Into<String>) -> Self {
        Self {
            cli,
            chain_id: chain_id.into(),
            rpc_node: None,
        }
    }

    /// The Tendermint RPC endpoint used by the CLI to look up account numbers
    /// and sequences.
    pub fn with_rpc_node(mut self, rpc_node: impl Into<String>) -> Self {
        self.rpc_node = Some(rpc_node.into());
        self
    }

    fn network_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            vec!["--chain-id".into(), self.chain_id.clone().into()];
        if let Some(node) = &self.rpc_node {
            args.push("--node".into());
            args.push(node.clone().into());
        }
        args.extend(self.cli.keyring_args());
        args
    }

    /// Returns the base64 encoded bytes of a signed transfer of `amounts`
    /// from `sender` to `recipient`.
    #[tracing::instrument(skip_all, fields(sender = %sender.address, %recipient))]
    pub async fn sign_send(
        &self,
        sender: &Account,
        recipient: &str,
        amounts: &[Amount],
        fee: &Fee,
        memo: &str,
    ) -> Result<String, ClientError> {
        let workdir = tokio::task::spawn_blocking(tempfile::tempdir)
            .await
            .map_err(std::io::Error::other)??;

        let mut generate: Vec<OsString> = vec![
            "tx".into(),
            "bank".into(),
            "send".into(),
            sender.signer_id().into(),
            recipient.into(),
            format_coins(amounts).into(),
            "--fees".into(),
            format_coins(&fee.amount).into(),
            "--gas".into(),
            fee.gas.to_string().into(),
            "--note".into(),
            memo.into(),
            "--generate-only".into(),
            "--output".into(),
            "json".into(),
        ];
        generate.extend(self.network_args());
        let unsigned = self.cli.run(generate).await?;
        let unsigned_path = workdir.path().join("unsigned.json");
        tokio::fs::write(&unsigned_path, unsigned.trim()).await?;

        let mut sign: Vec<OsString> = vec![
            "tx".into(),
            "sign".into(),
            unsigned_path.into(),
            "--from".into(),
            sender.signer_id().into(),
            "--output".into(),
            "json".into(),
        ];
        sign.extend(self.network_args());
        let signed = self.cli.run(sign).await?;
        let signed_path = workdir.path().join("signed.json");
        tokio::fs::write(&signed_path, signed.trim()).await?;

        let encoded = self
            .cli
            .run([OsString::from("tx"), "encode".into(), signed_path.into()])
            .await?;
        let encoded = encoded.trim().to_string();
        if encoded.is_empty() {
            return Err(ClientError::Command {
                command: "tx encode".to_string(),
                status: "success".to_string(),
                stderr: "the encoded transaction is empty".to_string(),
            })
        }
        Ok(encoded)
    }
}
