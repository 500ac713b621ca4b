use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ins_service::{
	ActivePolicy, AgentClaimCount, AgentPolicyCount, ClientCurrentPolicies, ClientSummary,
	ClientVehicleCount, CreateClaimRequest, CreateClientRequest, Error, ExpiredPolicy,
	INVALID_REQUEST, InsuredVehicle, IssuePolicyRequest, OpenClaim, RecentClaim,
	RecentClaimsRequest, SuspendedPolicy, TopClients, UpdateClientRequest,
};
use ins_storage::models::{Claim, Client, Policy};

use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;
type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/agents/active", get(active_agents))
		.route("/api/agents/claim-totals", get(agent_claim_totals))
		.route("/api/clients", post(create_client))
		.route("/api/clients/active", get(active_clients))
		.route("/api/clients/without-active-policies", get(clients_without_active_policies))
		.route("/api/clients/multi-vehicle", get(multi_vehicle_clients))
		.route("/api/clients/{id}", get(get_client).patch(update_client))
		.route("/api/clients/{id}/deactivate", post(deactivate_client))
		.route("/api/policies", post(issue_policy))
		.route("/api/policies/expired", get(expired_policies))
		.route("/api/policies/active-by-date", get(active_policies_by_date))
		.route("/api/policies/suspended-with-client-info", get(suspended_policies))
		.route("/api/policies/top-clients", get(top_clients).delete(invalidate_top_clients))
		.route("/api/policies/{number}", get(get_policy))
		.route("/api/claims", post(create_claim))
		.route("/api/claims/open", get(open_claims))
		.route("/api/claims/recent", get(recent_claims))
		.route("/api/vehicles/insured", get(insured_vehicles))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn active_agents(State(state): State<AppState>) -> ApiResult<Vec<AgentPolicyCount>> {
	Ok(Json(state.service.active_agents_with_policy_counts().await?))
}

async fn agent_claim_totals(State(state): State<AppState>) -> ApiResult<Vec<AgentClaimCount>> {
	Ok(Json(state.service.agents_with_claim_counts().await?))
}

async fn active_clients(State(state): State<AppState>) -> ApiResult<Vec<ClientCurrentPolicies>> {
	Ok(Json(state.service.active_clients_with_current_policies().await?))
}

async fn clients_without_active_policies(
	State(state): State<AppState>,
) -> ApiResult<Vec<ClientSummary>> {
	Ok(Json(state.service.clients_without_active_policies().await?))
}

async fn multi_vehicle_clients(
	State(state): State<AppState>,
) -> ApiResult<Vec<ClientVehicleCount>> {
	Ok(Json(state.service.clients_with_multiple_insured_vehicles().await?))
}

async fn create_client(
	State(state): State<AppState>,
	payload: Result<Json<CreateClientRequest>, JsonRejection>,
) -> Created<Client> {
	let Json(payload) = payload?;
	let client = state.service.create_client(payload).await?;

	Ok((StatusCode::CREATED, Json(client)))
}

async fn get_client(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Client> {
	Ok(Json(state.service.get_client(&id).await?))
}

async fn update_client(
	State(state): State<AppState>,
	Path(id): Path<String>,
	payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Client> {
	let Json(payload) = payload?;
	let req = UpdateClientRequest::from_value(payload)?;

	Ok(Json(state.service.update_client(&id, req).await?))
}

async fn deactivate_client(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> ApiResult<Client> {
	Ok(Json(state.service.deactivate_client(&id).await?))
}

async fn issue_policy(
	State(state): State<AppState>,
	payload: Result<Json<IssuePolicyRequest>, JsonRejection>,
) -> Created<Policy> {
	let Json(payload) = payload?;
	let policy = state.service.issue_policy(payload).await?;

	Ok((StatusCode::CREATED, Json(policy)))
}

async fn expired_policies(State(state): State<AppState>) -> ApiResult<Vec<ExpiredPolicy>> {
	Ok(Json(state.service.expired_policies_with_client().await?))
}

async fn active_policies_by_date(State(state): State<AppState>) -> ApiResult<Vec<ActivePolicy>> {
	Ok(Json(state.service.active_policies_by_start_date().await?))
}

async fn suspended_policies(State(state): State<AppState>) -> ApiResult<Vec<SuspendedPolicy>> {
	Ok(Json(state.service.suspended_policies_with_client().await?))
}

#[derive(Debug, Deserialize)]
struct TopClientsQuery {
	n: Option<String>,
}

async fn top_clients(
	State(state): State<AppState>,
	query: Result<Query<TopClientsQuery>, QueryRejection>,
) -> ApiResult<TopClients> {
	let Query(query) = query?;
	let n = match query.n.as_deref().map(str::trim) {
		None | Some("") => state.service.cfg.ranking.default_top_n,
		Some(raw) => raw.parse::<u32>().map_err(|_| {
			Error::invalid("n", format!("n must be a positive integer, got {raw:?}."))
		})?,
	};

	Ok(Json(state.service.get_top(n).await?))
}

#[derive(Debug, Serialize)]
struct InvalidateResponse {
	removed: bool,
}

async fn invalidate_top_clients(State(state): State<AppState>) -> ApiResult<InvalidateResponse> {
	let removed = state.service.invalidate_ranking().await?;

	Ok(Json(InvalidateResponse { removed }))
}

async fn get_policy(
	State(state): State<AppState>,
	Path(number): Path<String>,
) -> ApiResult<Policy> {
	Ok(Json(state.service.get_policy(&number).await?))
}

async fn create_claim(
	State(state): State<AppState>,
	payload: Result<Json<CreateClaimRequest>, JsonRejection>,
) -> Created<Claim> {
	let Json(payload) = payload?;
	let claim = state.service.create_claim(payload).await?;

	Ok((StatusCode::CREATED, Json(claim)))
}

async fn open_claims(State(state): State<AppState>) -> ApiResult<Vec<OpenClaim>> {
	Ok(Json(state.service.open_claims_with_client().await?))
}

async fn recent_claims(
	State(state): State<AppState>,
	query: Result<Query<RecentClaimsRequest>, QueryRejection>,
) -> ApiResult<Vec<RecentClaim>> {
	let Query(query) = query?;

	Ok(Json(state.service.recent_claims_of_type(query).await?))
}

async fn insured_vehicles(State(state): State<AppState>) -> ApiResult<Vec<InsuredVehicle>> {
	Ok(Json(state.service.insured_vehicles_with_owner_and_policy().await?))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::Validation { code, field, message } => ApiError::new(
				StatusCode::UNPROCESSABLE_ENTITY,
				code,
				message,
				Some(vec![field.to_string()]),
			),
			Error::Conflict { message } =>
				ApiError::new(StatusCode::CONFLICT, "CONFLICT", message, None),
			Error::NotFound { message } =>
				ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			Error::EmptyResult { message } =>
				ApiError::new(StatusCode::NOT_FOUND, "NO_DATA", message, None),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Request failed on storage.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal error.", None)
			},
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		ApiError::new(rejection.status(), INVALID_REQUEST, rejection.body_text(), None)
	}
}
impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		ApiError::new(rejection.status(), INVALID_REQUEST, rejection.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
