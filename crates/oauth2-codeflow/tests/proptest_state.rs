//! Property-based tests for redirect construction and code issuance.

mod common;

use std::collections::HashSet;

use proptest::prelude::*;

use common::{CLIENT_ID, build_engine};
use oauth2_codeflow::CodeFlowClient;
use oauth2_codeflow::models::AuthorizationParams;
use oauth2_codeflow::server::oauth::store::generate_code;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime")
}

/// Redirect URIs with and without an existing query.
fn arb_redirect_uri() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("http://x/callback".to_string()),
        Just("https://app.example.com/cb?tenant=7".to_string()),
        "[a-z]{1,12}".prop_map(|p| format!("http://localhost:8081/{p}")),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever state goes in comes back out of the redirect unchanged.
    #[test]
    fn state_echoed_byte_for_byte(state in any::<String>(), redirect_uri in arb_redirect_uri()) {
        let (engine, _store) = build_engine();
        let params = AuthorizationParams {
            client_id: CLIENT_ID.to_string(),
            redirect_uri: redirect_uri.clone(),
            state: state.clone(),
        };

        let redirect = runtime().block_on(engine.approve(&params)).expect("approve");

        let states: Vec<String> = redirect
            .query_pairs()
            .filter(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .collect();
        prop_assert_eq!(states, vec![state.clone()]);

        let original = url::Url::parse(&redirect_uri).expect("redirect uri");
        prop_assert_eq!(redirect.host_str(), original.host_str());
        prop_assert_eq!(redirect.path(), original.path());

        // The companion client reads the same code back out
        let code = CodeFlowClient::parse_callback(redirect.as_str(), &state);
        prop_assert!(code.is_ok());
    }

    /// Unknown clients never get a redirect, whatever they send.
    #[test]
    fn unknown_client_never_redirected(client_id in "[a-z-]{0,20}", state in ".*") {
        prop_assume!(client_id != CLIENT_ID && client_id != "other-client");
        let (engine, _store) = build_engine();
        let params = AuthorizationParams {
            client_id,
            redirect_uri: "http://x/callback".to_string(),
            state,
        };

        prop_assert!(runtime().block_on(engine.approve(&params)).is_err());
    }
}

#[test]
fn generated_codes_are_unique_hex() {
    let codes: HashSet<String> = (0..10_000).map(|_| generate_code()).collect();
    assert_eq!(codes.len(), 10_000);
    assert!(codes.iter().all(|c| c.len() == 64 && c.bytes().all(|b| b.is_ascii_hexdigit())));
}
