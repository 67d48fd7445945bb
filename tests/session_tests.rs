//! End-to-end session flows against the in-memory host

use cip30_session::decode::{AddressFormat, AssetFilter, Balance};
use cip30_session::provider::memory::{MemoryRegistry, MemoryWallet, WalletFixture, API_REFUSED, TX_SIGN_DECLINED};
use cip30_session::provider::EventCallback;
use cip30_session::{SessionConfig, SessionPhase, WalletError, WalletSession};
use futures::StreamExt;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

const CHANGE_ADDRESS: &str = "019493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e337b62cfff6403a06a3acbc34f8c46003c69fe79a3628cefa9c47251";

fn nami() -> WalletFixture {
    WalletFixture {
        name: "Nami".into(),
        api_version: "0.1.0".into(),
        network_id: 1,
        change_address: CHANGE_ADDRESS.into(),
        // 2 ada, no tokens map
        balance: "1a001e8480".into(),
        ..Default::default()
    }
}

fn host(wallets: &[(&str, WalletFixture)]) -> Rc<MemoryRegistry> {
    let registry = Rc::new(MemoryRegistry::new());
    for (key, fixture) in wallets {
        registry.inject(*key, MemoryWallet::new(fixture.clone()));
    }
    registry
}

#[tokio::test]
async fn no_registry_means_no_providers_and_noop_connect() {
    let session = WalletSession::new(MemoryRegistry::absent());
    assert_eq!(session.refresh(), 0);
    assert!(session.providers().get().is_empty());

    session.connect("nami").await.unwrap();
    assert!(!session.is_connected());
    assert!(session.selected().get().is_none());
    assert!(session.facade().get().is_none());
}

#[tokio::test]
async fn enabled_then_disabled_keeps_facade_but_not_connected() {
    let session = WalletSession::new(host(&[("nami", WalletFixture { report_disabled: true, ..nami() })]));
    session.refresh();
    session.connect("nami").await.unwrap();

    let state = session.snapshot();
    assert!(state.facade.is_some());
    assert!(!state.connected);
    assert_eq!(state.selected.unwrap().name(), "Nami");
}

#[tokio::test]
async fn connected_facade_serves_decoded_data() {
    let session = WalletSession::new(host(&[("nami", nami())]));
    session.refresh();
    session.connect("nami").await.unwrap();
    assert!(session.is_connected());
    assert_eq!(session.phase().get(), SessionPhase::Connected);

    let facade = session.facade().get().unwrap();
    assert_eq!(facade.get_network_id().await.unwrap(), 1);
    let stake = facade.get_address(AddressFormat::StakeKey).await.unwrap();
    assert_eq!(stake.as_text(), Some("stake1uyehkck0lajq8gr28t9uxnuvgcqrc6070x3k9r8048z8y5gh6ffgw"));
    assert_eq!(facade.get_assets(AssetFilter::Nft, "").await.unwrap(), Balance::NoTokens);
    assert_eq!(facade.get_assets(AssetFilter::Handles, "").await.unwrap(), Balance::Assets(vec![]));
}

#[tokio::test]
async fn reserved_and_denied_keys_cannot_be_connected() {
    let registry = host(&[("nami", nami()), ("typhon", nami()), ("_events", nami())]);
    let session = WalletSession::new(registry.clone());
    assert_eq!(session.refresh(), 1);

    session.connect("typhon").await.unwrap();
    assert!(session.selected().get().is_none());
    assert_eq!(registry.wallet("typhon").unwrap().enable_calls(), 0);

    let lenient = WalletSession::with_config(registry, SessionConfig::new().allow_all_providers());
    assert_eq!(lenient.refresh(), 2);
}

#[tokio::test]
async fn user_declining_enable_is_surfaced() {
    let session = WalletSession::new(host(&[("nami", WalletFixture { decline_enable: true, ..nami() })]));
    session.refresh();
    let err = session.connect("nami").await.unwrap_err();
    assert_eq!(err, WalletError::Provider(cip30_session::ProviderError::new(Some(API_REFUSED), "user declined access")));
    assert_eq!(session.phase().get(), SessionPhase::ConnectFailed);
    assert!(session.facade().get().is_none());
}

#[tokio::test]
async fn switching_wallets_replaces_selection() {
    let session = WalletSession::new(host(&[("nami", nami()), ("eternl", WalletFixture { name: "Eternl".into(), ..nami() })]));
    session.refresh();
    session.connect("nami").await.unwrap();
    let first = session.facade().get().unwrap();

    session.connect("eternl").await.unwrap();
    assert_eq!(session.selected().get().unwrap().name(), "Eternl");
    assert!(!Rc::ptr_eq(&first, &session.facade().get().unwrap()));
    assert!(session.is_connected());
}

#[tokio::test]
async fn late_injection_is_picked_up_on_refresh() {
    let registry = host(&[]);
    let session = WalletSession::new(registry.clone());
    assert_eq!(session.refresh(), 0);
    assert_eq!(session.phase().get(), SessionPhase::Idle);

    registry.inject("lace", MemoryWallet::new(nami()));
    assert_eq!(session.refresh(), 1);
    assert_eq!(session.phase().get(), SessionPhase::Discovered);
    session.connect("lace").await.unwrap();
    assert!(session.is_connected());
}

#[tokio::test]
async fn subscribers_observe_each_transition() {
    let session = WalletSession::new(host(&[("nami", nami())]));
    let phases = session.phase().subscribe();
    session.refresh();
    session.connect("nami").await.unwrap();
    session.disconnect();
    drop(session);

    let seen: Vec<SessionPhase> = phases.collect().await;
    assert_eq!(
        seen,
        vec![
            SessionPhase::Idle,
            SessionPhase::Discovered,
            SessionPhase::Connecting,
            SessionPhase::Connected,
            SessionPhase::Disconnected,
        ]
    );
}

#[tokio::test]
async fn passthrough_errors_are_unchanged() {
    let registry = host(&[("nami", WalletFixture { decline_sign: true, ..nami() })]);
    let session = WalletSession::new(registry);
    session.refresh();
    session.connect("nami").await.unwrap();
    let facade = session.facade().get().unwrap();

    let err = facade.sign_tx("84a400", true).await.unwrap_err();
    assert_eq!(err.code, Some(TX_SIGN_DECLINED));
    assert!(matches!(facade.get_authorization(CHANGE_ADDRESS, "hello").await, Err(WalletError::Authorization { .. })));
}

#[tokio::test]
async fn experimental_events_reach_listeners() {
    let registry = host(&[("nami", nami())]);
    let session = WalletSession::new(registry.clone());
    session.refresh();
    session.connect("nami").await.unwrap();
    let facade = session.facade().get().unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let callback: EventCallback = Rc::new(move |payload| sink.borrow_mut().push(payload));
    facade.experimental_on("networkChange", callback.clone());

    let wallet = registry.wallet("nami").unwrap();
    wallet.emit("networkChange", json!(0));
    facade.experimental_off("networkChange", &callback);
    wallet.emit("networkChange", json!(1));

    assert_eq!(*seen.borrow(), vec![json!(0)]);
}
