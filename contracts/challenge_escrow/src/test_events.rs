extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    token, vec, Address, Env, IntoVal, Symbol, TryIntoVal,
};

use crate::events::{
    ChallengeStatusRefreshed, DonationReceived, DonationRefunded, EscrowInitialized, FundsSwept,
    OracleUpdated, RefreshRequested,
};
use crate::{ChallengeEscrow, ChallengeEscrowClient, ChallengeStatus};

struct Actors {
    owner: Address,
    beneficiary: Address,
    oracle: Address,
    token: token::Client<'static>,
}

fn setup_with_init() -> (Env, ChallengeEscrowClient<'static>, Actors) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(ChallengeEscrow, ());
    let client = ChallengeEscrowClient::new(&env, &contract_id);

    let token_admin = Address::generate(&env);
    let addr = env.register_stellar_asset_contract_v2(token_admin);
    let actors = Actors {
        owner: Address::generate(&env),
        beneficiary: Address::generate(&env),
        oracle: Address::generate(&env),
        token: token::Client::new(&env, &addr.address()),
    };
    client.init(
        &actors.owner,
        &actors.beneficiary,
        &actors.oracle,
        &actors.token.address,
    );
    (env, client, actors)
}

fn funded_donor(env: &Env, actors: &Actors, amount: i128) -> Address {
    let donor = Address::generate(env);
    token::StellarAssetClient::new(env, &actors.token.address).mint(&donor, &amount);
    donor
}

#[test]
fn test_initialized_event() {
    let (env, client, actors) = setup_with_init();

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![&env, symbol_short!("init").into_val(&env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: EscrowInitialized = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        EscrowInitialized {
            owner: actors.owner.clone(),
            beneficiary: actors.beneficiary.clone(),
            oracle: actors.oracle.clone(),
            token: actors.token.address.clone(),
        }
    );
}

#[test]
fn test_donation_received_event() {
    let (env, client, actors) = setup_with_init();
    let donor = funded_donor(&env, &actors, 1_500);

    client.deposit(&donor, &1_000);
    client.deposit(&donor, &500);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("donated"), donor)
    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("donated").into_val(&env),
        donor.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: DonationReceived = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        DonationReceived {
            donor: donor.clone(),
            amount: 500,
            total_donation: 1_500,
        }
    );
}

#[test]
fn test_refresh_requested_event() {
    let (env, client, actors) = setup_with_init();

    let id = client.request_refresh(&actors.beneficiary);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![&env, Symbol::new(&env, "refresh_requested").into_val(&env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: RefreshRequested = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        RefreshRequested {
            request_id: id,
            requested_by: actors.beneficiary.clone(),
        }
    );
}

#[test]
fn test_repeated_request_reannounces_same_id() {
    let (env, client, actors) = setup_with_init();

    let id = client.request_refresh(&actors.owner);
    client.request_refresh(&actors.beneficiary);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let event_data: RefreshRequested = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(event_data.request_id, id);
    assert_eq!(event_data.requested_by, actors.beneficiary);
}

#[test]
fn test_status_refreshed_event() {
    let (env, client, actors) = setup_with_init();

    let id = client.request_refresh(&actors.owner);
    client.fulfill_refresh(&actors.oracle, &id, &ChallengeStatus::Accomplished);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("refreshed"),)
    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![&env, symbol_short!("refreshed").into_val(&env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ChallengeStatusRefreshed = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ChallengeStatusRefreshed {
            request_id: id,
            status: ChallengeStatus::Accomplished,
        }
    );
}

#[test]
fn test_refunded_event() {
    let (env, client, actors) = setup_with_init();
    let donor = funded_donor(&env, &actors, 700);
    client.deposit(&donor, &700);
    let id = client.request_refresh(&actors.owner);
    client.fulfill_refresh(&actors.oracle, &id, &ChallengeStatus::Failed);

    client.withdraw_own(&donor);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("refunded").into_val(&env),
        donor.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: DonationRefunded = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        DonationRefunded {
            donor: donor.clone(),
            amount: 700,
        }
    );
}

#[test]
fn test_swept_event() {
    let (env, client, actors) = setup_with_init();
    let donor = funded_donor(&env, &actors, 300);
    client.deposit(&donor, &300);
    let id = client.request_refresh(&actors.owner);
    client.fulfill_refresh(&actors.oracle, &id, &ChallengeStatus::Accomplished);

    client.sweep_to_beneficiary(&actors.owner);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![&env, symbol_short!("swept").into_val(&env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: FundsSwept = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundsSwept {
            beneficiary: actors.beneficiary.clone(),
            amount: 300,
        }
    );
}

#[test]
fn test_paused_and_unpaused_events() {
    let (env, client, actors) = setup_with_init();

    client.pause(&actors.owner);
    let last_event = env.events().all().last().expect("No events found");
    assert_eq!(
        last_event.1,
        vec![&env, symbol_short!("paused").into_val(&env)]
    );
    let by: Address = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(by, actors.owner);

    client.unpause(&actors.beneficiary);
    let last_event = env.events().all().last().expect("No events found");
    assert_eq!(
        last_event.1,
        vec![&env, symbol_short!("unpaused").into_val(&env)]
    );
    let by: Address = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(by, actors.beneficiary);
}

#[test]
fn test_oracle_updated_event() {
    let (env, client, actors) = setup_with_init();
    let new_oracle = Address::generate(&env);

    client.set_oracle(&actors.owner, &new_oracle);

    let last_event = env.events().all().last().expect("No events found");
    assert_eq!(
        last_event.1,
        vec![&env, symbol_short!("oracle").into_val(&env)]
    );
    let event_data: OracleUpdated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        OracleUpdated {
            oracle: new_oracle,
            by: actors.owner.clone(),
        }
    );
}
