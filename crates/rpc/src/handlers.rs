use axum::extract::{Path, Query, State};
use axum::{Form, Json};
use ledgerd_engine::{BulkTransferRequest, FaucetRequest, LedgerError, SingleTransferRequest};
use ledgerd_types::{Account, Address, Amount, NewAccount, Transaction, DEFAULT_PAGE_LIMIT};

use crate::error::RpcError;
use crate::types::{
    bulk_legs_from_json, BalancesResponse, BulkTransferJson, FaucetForm, HashResponse, ListTransactionsQuery,
    SequenceResponse, SingleTransferForm, TrustAssetForm,
};
use crate::RpcState;

fn parse_address(s: String) -> Result<Address, RpcError> {
    Address::new(s).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()).into())
}

fn parse_amount(s: &str) -> Result<Amount, RpcError> {
    Amount::parse_strict(s).map_err(|e| LedgerError::TxnBuildFailed(e.to_string()).into())
}

pub async fn health() -> &'static str {
    "OK"
}

/// `POST /v1/accounts/`
pub async fn create_account(State(state): State<RpcState>) -> Result<Json<NewAccount>, RpcError> {
    let account = state.engine.create_account().await?;
    Ok(Json(account))
}

/// `GET /v1/accounts/{addr}`
pub async fn get_account(State(state): State<RpcState>, Path(addr): Path<String>) -> Result<Json<Account>, RpcError> {
    let account = state.engine.get_account(&addr).await?;
    Ok(Json(account))
}

/// `POST /v1/accounts/{addr}/asset`
pub async fn trust_asset(
    State(state): State<RpcState>,
    Path(addr): Path<String>,
    Form(form): Form<TrustAssetForm>,
) -> Result<Json<Account>, RpcError> {
    let account = state.engine.trust_asset(&addr, &form.asset).await?;
    Ok(Json(account))
}

/// `GET /v1/accounts/{addr}/sequence`
pub async fn get_sequence(
    State(state): State<RpcState>,
    Path(addr): Path<String>,
) -> Result<Json<SequenceResponse>, RpcError> {
    let account = state.engine.get_account(&addr).await?;
    Ok(Json(SequenceResponse { sequence: account.sequence }))
}

/// `GET /v1/accounts/{addr}/balances`
pub async fn get_balances(
    State(state): State<RpcState>,
    Path(addr): Path<String>,
) -> Result<Json<BalancesResponse>, RpcError> {
    let account = state.engine.get_account(&addr).await?;
    Ok(Json(BalancesResponse { balances: account.balances }))
}

/// `GET /v1/accounts/{addr}/transactions`
pub async fn list_transactions(
    State(state): State<RpcState>,
    Path(addr): Path<String>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, RpcError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    let txns = state
        .engine
        .list_transactions(&addr, query.cursor.as_deref(), query.order, limit)
        .await?;
    Ok(Json(txns))
}

fn single_transfer_request(form: SingleTransferForm) -> Result<SingleTransferRequest, RpcError> {
    let from = parse_address(form.from)?;
    let to = parse_address(form.to)?;
    let amount = parse_amount(&form.amount)?;
    Ok(SingleTransferRequest {
        from,
        to,
        asset: form.asset,
        amount,
        from_sequence: form.from_sequence,
        memo: form.memo,
        handle: form.hash.filter(|h| !h.is_empty()),
    })
}

/// `POST /v1/transactions/hash`
pub async fn build_single_handle(
    State(state): State<RpcState>,
    Form(form): Form<SingleTransferForm>,
) -> Result<Json<HashResponse>, RpcError> {
    let req = single_transfer_request(form)?;
    let hash = state.engine.build_single_handle(&req)?;
    Ok(Json(HashResponse { hash }))
}

/// `POST /v1/transactions/`
pub async fn submit_single(
    State(state): State<RpcState>,
    Form(form): Form<SingleTransferForm>,
) -> Result<Json<Transaction>, RpcError> {
    let req = single_transfer_request(form)?;
    let txn = state.engine.submit_single(req).await?;
    Ok(Json(txn))
}

fn bulk_transfer_request(body: BulkTransferJson) -> Result<BulkTransferRequest, RpcError> {
    let from = parse_address(body.from)?;
    let legs = bulk_legs_from_json(body.op)?;
    Ok(BulkTransferRequest {
        from,
        from_sequence: body.from_sequence,
        legs,
        memo: body.memo,
        handle: body.hash.filter(|h| !h.is_empty()),
    })
}

/// `POST /v1/transactions/bulk/hash`
pub async fn build_bulk_handle(
    State(state): State<RpcState>,
    Json(body): Json<BulkTransferJson>,
) -> Result<Json<HashResponse>, RpcError> {
    let req = bulk_transfer_request(body)?;
    let hash = state.engine.build_bulk_handle(&req)?;
    Ok(Json(HashResponse { hash }))
}

/// `POST /v1/transactions/bulk`
pub async fn submit_bulk(
    State(state): State<RpcState>,
    Json(body): Json<BulkTransferJson>,
) -> Result<Json<Transaction>, RpcError> {
    let req = bulk_transfer_request(body)?;
    let txn = state.engine.submit_bulk(req).await?;
    Ok(Json(txn))
}

/// `GET /v1/transactions/{handle}`
pub async fn get_transaction(
    State(state): State<RpcState>,
    Path(handle): Path<String>,
) -> Result<Json<Transaction>, RpcError> {
    let txn = state.engine.get_transaction(&handle).await?;
    Ok(Json(txn))
}

/// `POST /v1/faucet/`
pub async fn faucet_mint(
    State(state): State<RpcState>,
    Form(form): Form<FaucetForm>,
) -> Result<Json<Transaction>, RpcError> {
    let to = parse_address(form.to)?;
    let amount = parse_amount(&form.amount)?;
    let txn = state
        .engine
        .faucet_mint(FaucetRequest { finance_addr: state.finance_addr.clone(), to, asset: form.asset, amount })
        .await?;
    Ok(Json(txn))
}
