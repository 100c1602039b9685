// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use secrets_gateway::{
	_preludet::*,
	config::GatewayConfigBuilder,
	dispatch::{ApiRequest, ListResponse},
	error::ConfigError,
	gateway::Gateway,
};

const TOKEN_PATH: &str = "/identity/connect/token";

async fn authenticated_gateway(
	server: &MockServer,
	configure: impl FnOnce(GatewayConfigBuilder) -> GatewayConfigBuilder,
) -> Gateway {
	let gateway = build_test_gateway(&server.base_url(), TOKEN_PATH, configure);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "sesame",
				"token_type": "Bearer",
				"expires_in": 3600,
			}));
		})
		.await;
	gateway.authenticate().await.expect("Authentication should succeed before dispatching.");

	gateway
}

#[tokio::test]
async fn dispatch_without_a_session_is_an_authentication_error() {
	let server = MockServer::start_async().await;
	let gateway = build_test_gateway(&server.base_url(), TOKEN_PATH, |builder| builder);
	let resource = server
		.mock_async(|when, then| {
			when.method(GET).path("/public/members");
			then.status(200).header("content-type", "application/json").json_body(json!({}));
		})
		.await;
	let err = gateway
		.execute(ApiRequest::get("public/members"))
		.await
		.expect_err("Dispatch without a token should fail fast.");

	assert!(matches!(err, Error::Authentication));
	assert!(err.to_string().contains("No access token found"));

	resource.assert_calls_async(0).await;
}

#[tokio::test]
async fn non_rate_limit_failures_are_never_retried() {
	let server = MockServer::start_async().await;
	let gateway = authenticated_gateway(&server, |builder| builder).await;
	let resource = server
		.mock_async(|when, then| {
			when.method(GET).path("/public/members/missing");
			then.status(404)
				.header("content-type", "application/json")
				.json_body(json!({ "detail": "Not Found" }));
		})
		.await;
	let err = gateway
		.execute(ApiRequest::get("public/members/missing"))
		.await
		.expect_err("404 responses should surface immediately.");

	let Error::Api { status, message } = err else {
		panic!("Non-429 failures should surface as API errors.");
	};

	assert_eq!(status, 404);
	assert_eq!(message, "Not Found");

	resource.assert_calls_async(1).await;
	assert_eq!(gateway.metrics.rate_limit_waits(), 0);
}

#[tokio::test]
async fn unstructured_error_bodies_fall_back_to_raw_text() {
	let server = MockServer::start_async().await;
	let gateway = authenticated_gateway(&server, |builder| builder).await;
	let _resource = server
		.mock_async(|when, then| {
			when.method(GET).path("/public/members");
			then.status(502).body("upstream exploded");
		})
		.await;
	let err = gateway
		.execute(ApiRequest::get("public/members"))
		.await
		.expect_err("502 responses should surface immediately.");

	let Error::Api { status, message } = err else {
		panic!("Non-429 failures should surface as API errors.");
	};

	assert_eq!(status, 502);
	assert_eq!(message, "upstream exploded");
}

#[tokio::test]
async fn empty_success_bodies_return_none() {
	let server = MockServer::start_async().await;
	let gateway = authenticated_gateway(&server, |builder| builder).await;
	let resource = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/public/members/m1");
			then.status(204);
		})
		.await;
	let value = gateway
		.execute(ApiRequest::delete("public/members/m1"))
		.await
		.expect("Deletes should succeed without content.");

	assert!(value.is_none(), "Commands without content should return none.");

	resource.assert_calls_async(1).await;
}

#[tokio::test]
async fn request_headers_carry_bearer_subscription_and_content_type() {
	let server = MockServer::start_async().await;
	let gateway =
		authenticated_gateway(&server, |builder| builder.subscription_key("sub-123")).await;
	let resource = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/public/members")
				.header("authorization", "Bearer sesame")
				.header("Ocp-Apim-Subscription-Key", "sub-123")
				.header("content-type", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "data": [] }));
		})
		.await;

	gateway
		.execute(ApiRequest::get("public/members"))
		.await
		.expect("Dispatch should succeed when all headers are attached.");

	resource.assert_async().await;
}

#[tokio::test]
async fn request_bodies_are_attached_verbatim() {
	let server = MockServer::start_async().await;
	let gateway = authenticated_gateway(&server, |builder| builder).await;
	let resource = server
		.mock_async(|when, then| {
			when.method(POST).path("/public/members").json_body(json!({ "email": "a@b.c" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "id": "m2", "email": "a@b.c" }));
		})
		.await;
	let value = gateway
		.execute(ApiRequest::post("public/members").with_body(json!({ "email": "a@b.c" })))
		.await
		.expect("Creates should succeed.")
		.expect("Creates should return the new resource.");

	assert_eq!(value["id"], "m2");

	resource.assert_async().await;
}

#[tokio::test]
async fn boundary_violations_surface_before_any_call() {
	let server = MockServer::start_async().await;
	let gateway = authenticated_gateway(&server, |builder| builder).await;
	let err = gateway
		.execute(ApiRequest::get("/public/members"))
		.await
		.expect_err("Leading slashes violate the caller contract.");

	assert!(matches!(err, Error::Config(ConfigError::LeadingSlashEndpoint { .. })));

	let err = gateway
		.execute(ApiRequest::get("public/members").with_filter_query("?limit=5"))
		.await
		.expect_err("Leading query delimiters violate the caller contract.");

	assert!(matches!(err, Error::Config(ConfigError::LeadingQueryDelimiter { .. })));
}

#[tokio::test]
async fn filter_queries_are_appended_to_the_request() {
	let server = MockServer::start_async().await;
	let gateway = authenticated_gateway(&server, |builder| builder).await;
	let resource = server
		.mock_async(|when, then| {
			when.method(GET).path("/public/members").query_param("limit", "5");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "data": [{ "id": "m1" }] }));
		})
		.await;
	let list: ListResponse<serde_json::Value> = gateway
		.execute_decoded(ApiRequest::get("public/members").with_filter_query("limit=5"))
		.await
		.expect("Filtered lists should succeed and decode.");

	assert_eq!(list.data.len(), 1);

	resource.assert_async().await;
}

#[tokio::test]
async fn malformed_success_bodies_fail_to_decode() {
	let server = MockServer::start_async().await;
	let gateway = authenticated_gateway(&server, |builder| builder).await;
	let _resource = server
		.mock_async(|when, then| {
			when.method(GET).path("/public/members");
			then.status(200).header("content-type", "application/json").body("{not json");
		})
		.await;
	let err = gateway
		.execute(ApiRequest::get("public/members"))
		.await
		.expect_err("Invalid JSON payloads should fail to decode.");

	assert!(matches!(err, Error::Decode(_)));
}
