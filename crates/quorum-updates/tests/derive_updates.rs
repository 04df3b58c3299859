//! End-to-end derivation scenarios over realistic configs.

use quorum_canonical::Canonical;
use quorum_config::{Asset, AssetKind, BallotCategory, Config, ContractConfig, ContractType};
use quorum_updates::{
    derive_updates, derive_updates_with, updates_to_plain, CombinationPolicy, Error, UpdateKind,
    UpdatePayload, Updates,
};
use serde_json::{json, Value};

const TIMESTAMP: u64 = 1_700_000_000_000;

const SYSTEM: &str = "GCEBYD3K3IYSYLK5EQEK72RVAH2AHZUYSFFG4IOXUS5AOINLMXJRMDRA";
const ADMIN: &str = "GDCOZYKHZXOJANHK3ASICJYEFGYUBSEP3YQKEXXLAGV3BBPLOFLGBAZX";
const DEVELOPER: &str = "GD6CN3XGN3ZGND3RSPMAOB3YCO4HXF2TD6W4OMOUL4YOPC7XGBHXPF5K";

const NODE_1: &str = "GCR6ZOFMKDWX5OMUDQZHQWD2FEE4WCWQJOBMRZRQM5BVTPKJ7LL35TBF";
const NODE_2: &str = "GDQFOLVYRNYBTQ2WCXOANDAAM4BSZMLJUEI6CO2PMOCOVDS6SKM2AMRQ";
const NODE_3: &str = "GAL3OTXUY6SWY7BSS6EB43RY4EYH5LHJPKVANA6ACMLJEX7IVTJXEL26";
const NODE_4: &str = "GDPKQ2TSNJOFSEE7XSUXPWRP27H6GFGLWD7JCHNEYYWQVGFA543EVBVT";
const NODE_5: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

const ORACLE_A: &str = "CAA2NN3TSWQFI6TZVLYM7B46RXBINZFRXZFP44BM2H6OHOPRXD5OASUW";
const ORACLE_B: &str = "CBMZO5MRIBFL457FBK5FEWZ4QJTYL3XWID7QW7SWDSDOQI5H4JN7XPZU";
const BEAM: &str = "CBFZZVW5SKMVTXKHHQKGOLLHYTOVNSYA774GCROOBMYAKEYCP4THNEXQ";
const SUBSCRIPTIONS: &str = "CBR4M2COCTRH3RMYODCVSXKXJPLMUXLKY2OZ2BLY7BXOS5YVNN7XE5TI";
const DAO: &str = "CDJIU6UAZHU7LUU7W7I2UBXESLOAINQLMG3MNF2DCIDJLTUC64CTSJGL";
const EXTRA: &str = "CDUKIPT3SYANLO3M6ILJLAXUUJKL2NY5RKILGW5ZYVUJBSFSRI2BB56A";
const TOKEN: &str = "CDBBDS5FN46XAVGD5IRKJIK4I7KGGSFI7R2KLXG32QQQELHPTIZS26BW";
const OTHER_TOKEN: &str = "CAH6MM2HE5RAQFSOGRC5N7OWHUZDOMAV2B3XIPMXGXLS4T46Z3QMBDDM";

const ORACLE_HASH: &str = "551723e0178208dd25c950bf78ab5618d47257a594654bbcaaf6cec8dc8c240c";
const SUBSCRIPTIONS_HASH: &str = "fc6a3d0fff933962afccbe038a6259ae6fd308057a771f1638cca5f8c59f6094";
const NEW_HASH: &str = "11507a0e2f5e69d5dfa40a62a1bd7b6ee57e6bcd85c67c9b8431b36fff21c437";

fn generic(code: &str) -> Value {
    json!({"type": 2, "code": code})
}

fn node(pubkey: &str, index: usize) -> Value {
    json!({
        "pubkey": pubkey,
        "url": format!("ws://node{}.example.com:30347", index),
        "domain": format!("node{}.example.com", index),
    })
}

fn oracle(contract_id: &str, kind: &str) -> Value {
    json!({
        "type": kind,
        "contractId": contract_id,
        "admin": ADMIN,
        "fee": 10000000,
        "baseAsset": generic("USD"),
        "decimals": 14,
        "assets": [generic("BTC"), generic("ETH")],
        "dataSource": "exchanges",
        "period": 86400000,
        "timeframe": 300000,
    })
}

fn raw_config() -> Value {
    let mut oracle_a = oracle(ORACLE_A, "oracle");
    oracle_a["cacheSize"] = json!(256);
    oracle_a["feeConfig"] = json!({"token": TOKEN, "fee": "1000"});
    let mut beam = oracle(BEAM, "oracle_beam");
    beam["invocationCosts"] = json!(["100", "200", "300", "400", "500"]);

    json!({
        "systemAccount": SYSTEM,
        "network": "Test SDF Network ; September 2015",
        "minDate": 0,
        "wasmHash": {
            "oracle": {"hash": ORACLE_HASH, "type": "oracle"},
            "subscriptions": {"hash": SUBSCRIPTIONS_HASH, "type": "subscriptions"},
        },
        "contracts": {
            ORACLE_A: oracle_a,
            ORACLE_B: oracle(ORACLE_B, "oracle"),
            BEAM: beam,
            SUBSCRIPTIONS: {
                "type": "subscriptions",
                "contractId": SUBSCRIPTIONS,
                "admin": ADMIN,
                "fee": 100,
                "baseFee": 100,
                "token": TOKEN,
                "dataSources": [ORACLE_A, ORACLE_B],
            },
            DAO: {
                "type": "dao",
                "contractId": DAO,
                "admin": ADMIN,
                "fee": 100,
                "initAmount": "100000000000",
                "startDate": 1700000000000u64,
                "token": TOKEN,
                "developer": DEVELOPER,
                "depositParams": {"0": "100", "1": "200", "2": "300", "3": "400"},
            },
        },
        "nodes": {
            NODE_1: node(NODE_1, 1),
            NODE_2: node(NODE_2, 2),
            NODE_3: node(NODE_3, 3),
        },
    })
}

fn config(raw: &Value) -> Config {
    Config::from_raw(raw).unwrap()
}

/// Derive from the fixture to the fixture with `edit` applied.
fn derive_edited(edit: impl FnOnce(&mut Value)) -> Result<Updates, Error> {
    derive_edited_with(CombinationPolicy::Exclusive, edit)
}

fn derive_edited_with(
    policy: CombinationPolicy,
    edit: impl FnOnce(&mut Value),
) -> Result<Updates, Error> {
    let current = raw_config();
    let mut new = current.clone();
    edit(&mut new);
    derive_updates_with(TIMESTAMP, &config(&current), &config(&new), policy)
}

fn scope(contract_id: &str) -> Option<String> {
    Some(contract_id.to_string())
}

fn single_update(updates: &Updates) -> (Option<String>, UpdateKind) {
    assert_eq!(updates.len(), 1, "expected one scope, got {:?}", updates.keys());
    let (scope, update) = updates.iter().next().unwrap();
    (scope.clone(), update.as_ref().expect("on-chain update").kind())
}

#[test]
fn identical_configs_need_no_update() {
    let current = config(&raw_config());
    assert!(derive_updates(TIMESTAMP, &current, &current).unwrap().is_empty());

    let updates = derive_edited(|raw| raw["minDate"] = json!(TIMESTAMP)).unwrap();
    assert!(updates.is_empty());
}

#[test]
fn appended_assets_yield_assets_update() {
    let updates = derive_edited(|raw| {
        raw["contracts"][ORACLE_A]["assets"] = json!([generic("BTC"), generic("ETH"), generic("XRP")]);
    })
    .unwrap();

    let update = updates[&scope(ORACLE_A)].as_ref().unwrap();
    assert_eq!(update.kind(), UpdateKind::OracleAssets);
    assert_eq!(update.timestamp(), TIMESTAMP);
    assert_eq!(update.target().unwrap().contract_id, ORACLE_A);
    assert_eq!(update.target().unwrap().admin, ADMIN);
    assert_eq!(
        update.payload(),
        &UpdatePayload::OracleAssets(vec![Asset::new(AssetKind::Generic, "XRP").unwrap()])
    );
}

#[test]
fn assets_cannot_be_removed_or_reordered() {
    let expected = Error::AssetsModified {
        contract: ORACLE_A.to_string(),
    };
    let test_cases = [
        json!([generic("BTC"), generic("XRP")]),
        json!([generic("ETH"), generic("BTC")]),
        json!([generic("BTC")]),
    ];
    for assets in test_cases {
        let result = derive_edited(|raw| raw["contracts"][ORACLE_A]["assets"] = assets.clone());
        assert_eq!(result, Err(expected.clone()), "assets {}", assets);
    }
}

#[test]
fn replacing_a_minority_of_validators_is_allowed() {
    let updates = derive_edited(|raw| {
        raw["nodes"] = json!({
            NODE_1: node(NODE_1, 1),
            NODE_2: node(NODE_2, 2),
            NODE_4: node(NODE_4, 4),
        });
    })
    .unwrap();
    assert_eq!(single_update(&updates), (None, UpdateKind::Nodes));

    let update = updates[&None].as_ref().unwrap();
    let UpdatePayload::Nodes { current, new } = update.payload() else {
        panic!("expected nodes payload");
    };
    assert!(current.contains_key(NODE_3));
    assert!(new.contains_key(NODE_4));
    assert_eq!(new.len(), 3);
}

#[test]
fn replacing_a_majority_of_validators_is_rejected() {
    let result = derive_edited(|raw| {
        raw["nodes"] = json!({
            NODE_1: node(NODE_1, 1),
            NODE_4: node(NODE_4, 4),
            NODE_5: node(NODE_5, 5),
        });
    });
    assert_eq!(result, Err(Error::MajorityUnreachable));
}

#[test]
fn node_endpoint_change_is_a_nodes_update() {
    let updates = derive_edited(|raw| {
        raw["nodes"][NODE_2]["url"] = json!("wss://moved.example.com:443");
    })
    .unwrap();
    assert_eq!(single_update(&updates), (None, UpdateKind::Nodes));
}

#[test]
fn global_update_excludes_contract_changes() {
    let result = derive_edited(|raw| {
        raw["nodes"][NODE_2]["domain"] = json!("renamed.example.com");
        raw["contracts"][ORACLE_A]["assets"] = json!([generic("BTC"), generic("ETH"), generic("XRP")]);
    });
    assert_eq!(result, Err(Error::GlobalWithContracts));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Global update can not be combined with contracts update"
    );
}

#[test]
fn on_chain_change_must_stand_alone() {
    let edit = |raw: &mut Value| {
        raw["contracts"][ORACLE_A]["assets"] = json!([generic("BTC"), generic("ETH"), generic("XRP")]);
        raw["contracts"][ORACLE_B]["fee"] = json!(20000000);
    };
    assert_eq!(derive_edited(edit), Err(Error::CombinedUpdates));

    let updates = derive_edited_with(CombinationPolicy::AllowOffChain, edit).unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(
        updates[&scope(ORACLE_A)].as_ref().map(|u| u.kind()),
        Some(UpdateKind::OracleAssets)
    );
    assert!(updates[&scope(ORACLE_B)].is_none());
}

#[test]
fn two_on_chain_changes_are_rejected() {
    let result = derive_edited_with(CombinationPolicy::AllowOffChain, |raw| {
        raw["contracts"][ORACLE_A]["period"] = json!(172800000);
        raw["contracts"][ORACLE_B]["period"] = json!(172800000);
    });
    assert_eq!(result, Err(Error::MultipleBlockchainUpdates));
}

#[test]
fn one_update_per_contract() {
    let result = derive_edited(|raw| {
        raw["contracts"][ORACLE_A]["assets"] = json!([generic("BTC"), generic("ETH"), generic("XRP")]);
        raw["contracts"][ORACLE_A]["period"] = json!(172800000);
    });
    assert_eq!(
        result,
        Err(Error::MultiplePerContract {
            contract: ORACLE_A.to_string()
        })
    );
}

#[test]
fn off_chain_contract_changes_yield_null_entries() {
    let updates = derive_edited(|raw| {
        raw["contracts"][ORACLE_B]["dataSource"] = json!("aggregator");
        raw["contracts"][DAO]["developer"] = json!(NODE_5);
    })
    .unwrap();
    assert_eq!(updates.len(), 2);
    assert!(updates[&scope(ORACLE_B)].is_none());
    assert!(updates[&scope(DAO)].is_none());
}

#[test]
fn immutable_fields_are_guarded() {
    let test_cases: [(&str, &str, Value, &str); 8] = [
        (SUBSCRIPTIONS, "token", json!(OTHER_TOKEN), "Token"),
        (DAO, "token", json!(OTHER_TOKEN), "Token"),
        (DAO, "initAmount", json!("5"), "Init amount"),
        (DAO, "startDate", json!(1), "Start date"),
        (ORACLE_A, "baseAsset", generic("EUR"), "Base asset"),
        (ORACLE_A, "timeframe", json!(600000), "Timeframe"),
        (ORACLE_B, "decimals", json!(7), "Decimals"),
        (BEAM, "admin", json!(DEVELOPER), "Admin"),
    ];
    for (contract, key, value, field) in test_cases {
        let result = derive_edited(|raw| raw["contracts"][contract][key] = value.clone());
        assert_eq!(
            result,
            Err(Error::ImmutableField {
                contract: contract.to_string(),
                field,
            }),
            "{} {}",
            contract,
            key
        );
    }
}

#[test]
fn contract_type_is_immutable() {
    let result = derive_edited(|raw| raw["contracts"][ORACLE_B]["type"] = json!("oracle_beam"));
    assert_eq!(
        result,
        Err(Error::ImmutableField {
            contract: ORACLE_B.to_string(),
            field: "Type",
        })
    );
}

#[test]
fn immutable_violation_names_contract_and_field() {
    let err = derive_edited(|raw| raw["contracts"][SUBSCRIPTIONS]["token"] = json!(OTHER_TOKEN))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Contract {}. Token can not be modified", SUBSCRIPTIONS)
    );
}

#[test]
fn per_kind_settings_updates() {
    let test_cases: [(&str, &str, Value, UpdateKind); 6] = [
        (ORACLE_A, "period", json!(172800000), UpdateKind::OracleHistoryPeriod),
        (ORACLE_A, "cacheSize", json!(512), UpdateKind::OracleCacheSize),
        (
            ORACLE_A,
            "feeConfig",
            json!({"token": TOKEN, "fee": "2000"}),
            UpdateKind::OracleFeeConfig,
        ),
        (
            BEAM,
            "invocationCosts",
            json!(["100", "200", "300", "400", "600"]),
            UpdateKind::OracleInvocationCosts,
        ),
        (SUBSCRIPTIONS, "baseFee", json!(250), UpdateKind::SubscriptionsFee),
        (
            DAO,
            "depositParams",
            json!({"0": "100", "1": "200", "2": "300", "3": "1000"}),
            UpdateKind::DaoDeposits,
        ),
    ];
    for (contract, key, value, kind) in test_cases {
        let updates = derive_edited(|raw| raw["contracts"][contract][key] = value.clone()).unwrap();
        assert_eq!(single_update(&updates), (scope(contract), kind), "{} {}", contract, key);
    }
}

#[test]
fn beam_follows_oracle_rules() {
    let updates = derive_edited(|raw| {
        raw["contracts"][BEAM]["assets"] = json!([generic("BTC"), generic("ETH"), generic("SOL")]);
    })
    .unwrap();
    assert_eq!(single_update(&updates), (scope(BEAM), UpdateKind::OracleAssets));

    let result = derive_edited(|raw| {
        raw["contracts"][BEAM]["assets"] = json!([generic("ETH")]);
    });
    assert_eq!(
        result,
        Err(Error::AssetsModified {
            contract: BEAM.to_string()
        })
    );
}

#[test]
fn deposit_payload_carries_full_map() {
    let updates = derive_edited(|raw| {
        raw["contracts"][DAO]["depositParams"]["2"] = json!("999");
    })
    .unwrap();
    let update = updates[&scope(DAO)].as_ref().unwrap();
    let UpdatePayload::DaoDeposits(deposits) = update.payload() else {
        panic!("expected deposits payload");
    };
    assert_eq!(deposits.len(), 4);
    assert_eq!(deposits[&BallotCategory::AddAsset], 999);
}

#[test]
fn optional_oracle_settings_cannot_be_unset() {
    let test_cases = [
        (ORACLE_A, "cacheSize", "Cache size"),
        (ORACLE_A, "feeConfig", "Fee config"),
        (BEAM, "invocationCosts", "Invocation costs"),
    ];
    for (contract, key, field) in test_cases {
        let result = derive_edited(|raw| {
            raw["contracts"][contract].as_object_mut().unwrap().remove(key);
        });
        assert_eq!(
            result,
            Err(Error::RemovedSetting {
                contract: contract.to_string(),
                field,
            })
        );
    }
}

#[test]
fn wasm_updates() {
    let updates = derive_edited(|raw| raw["wasmHash"]["oracle"]["hash"] = json!(NEW_HASH)).unwrap();
    assert_eq!(single_update(&updates), (None, UpdateKind::Wasm));
    let UpdatePayload::Wasm(hash) = updates[&None].as_ref().unwrap().payload() else {
        panic!("expected wasm payload");
    };
    assert_eq!(hash.hash, NEW_HASH);
    assert_eq!(hash.kind, ContractType::Oracle);

    let updates = derive_edited(|raw| {
        raw["wasmHash"]["dao"] = json!({"hash": NEW_HASH, "type": "dao"});
    })
    .unwrap();
    let UpdatePayload::Wasm(hash) = updates[&None].as_ref().unwrap().payload() else {
        panic!("expected wasm payload");
    };
    assert_eq!(hash.kind, ContractType::Dao);
}

#[test]
fn wasm_rules() {
    let removed = derive_edited(|raw| {
        raw["wasmHash"].as_object_mut().unwrap().remove("subscriptions");
    });
    assert_eq!(removed, Err(Error::WasmRemoved));

    let two = derive_edited(|raw| {
        raw["wasmHash"]["oracle"]["hash"] = json!(NEW_HASH);
        raw["wasmHash"]["subscriptions"]["hash"] = json!(NEW_HASH);
    });
    assert_eq!(two, Err(Error::MultipleWasm));
}

#[test]
fn contract_topology_change_carries_both_sets() {
    let updates = derive_edited(|raw| {
        let mut extra = oracle(EXTRA, "oracle");
        extra["dataSource"] = json!("forex");
        raw["contracts"][EXTRA] = extra;
    })
    .unwrap();
    assert_eq!(single_update(&updates), (None, UpdateKind::Contracts));
    let UpdatePayload::Contracts { current, new } = updates[&None].as_ref().unwrap().payload()
    else {
        panic!("expected contracts payload");
    };
    assert_eq!(current.len(), 5);
    assert_eq!(new.len(), 6);

    let removed = derive_edited(|raw| {
        raw["contracts"].as_object_mut().unwrap().remove(ORACLE_B);
    })
    .unwrap();
    assert_eq!(single_update(&removed), (None, UpdateKind::Contracts));
}

#[test]
fn only_one_global_update() {
    let result = derive_edited(|raw| {
        raw["contracts"].as_object_mut().unwrap().remove(ORACLE_B);
        raw["wasmHash"]["oracle"]["hash"] = json!(NEW_HASH);
    });
    assert_eq!(result, Err(Error::MultipleGlobal));
}

#[test]
fn network_parameters_fall_back_to_config_update() {
    let test_cases: [(&str, Value); 3] = [
        ("network", json!("Public Global Stellar Network ; September 2015")),
        ("systemAccount", json!(NODE_5)),
        ("baseAssets", json!({"exchanges": generic("USD")})),
    ];
    for (key, value) in test_cases {
        let updates = derive_edited(|raw| raw[key] = value.clone()).unwrap();
        assert_eq!(single_update(&updates), (None, UpdateKind::Config), "{}", key);
        let UpdatePayload::Config { current, new } = updates[&None].as_ref().unwrap().payload() else {
            panic!("expected config payload");
        };
        assert!(!current.equals(new, true));
    }
}

#[test]
fn invalid_inputs_are_refused() {
    let current = config(&raw_config());
    let mut new = current.clone();
    if let Some(ContractConfig::Oracle(oracle)) = new.contracts.get_mut(ORACLE_A) {
        oracle.period = oracle.timeframe;
    }
    let err = derive_updates(TIMESTAMP, &current, &new).unwrap_err();
    let Error::InvalidConfig { side, issues } = err else {
        panic!("expected invalid config");
    };
    assert_eq!(side, "new");
    assert_eq!(
        issues.to_lines(),
        format!("contracts.{}: period: Invalid or not defined", ORACLE_A)
    );
}

#[test]
fn result_projection_is_deterministic() {
    let first = derive_edited(|raw| raw["contracts"][SUBSCRIPTIONS]["baseFee"] = json!(300)).unwrap();
    let second = derive_edited(|raw| raw["contracts"][SUBSCRIPTIONS]["baseFee"] = json!("300")).unwrap();
    let plain = updates_to_plain(&first);
    assert_eq!(plain, updates_to_plain(&second));
    assert_eq!(
        plain,
        json!({
            SUBSCRIPTIONS: {
                "admin": ADMIN,
                "contractId": SUBSCRIPTIONS,
                "fee": 300,
                "timestamp": TIMESTAMP,
                "type": "subscriptions_fee",
            }
        })
    );
    assert_eq!(
        quorum_canonical::data_hash(&plain).unwrap(),
        quorum_canonical::data_hash(&updates_to_plain(&second)).unwrap()
    );

    let global = derive_edited(|raw| raw["network"] = json!("standalone")).unwrap();
    let plain = updates_to_plain(&global);
    assert_eq!(plain["global"]["type"], json!("config"));
    assert_eq!(plain["global"]["newConfig"]["network"], json!("standalone"));
    assert_eq!(
        plain["global"]["currentConfig"],
        config(&raw_config()).to_plain()
    );
}

#[test]
fn hash_is_independent_of_raw_key_order() {
    let raw = raw_config();
    let reversed: serde_json::Map<String, Value> = raw
        .as_object()
        .unwrap()
        .iter()
        .rev()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let first = config(&raw);
    let second = config(&Value::Object(reversed));
    assert_eq!(first.hash().unwrap(), second.hash().unwrap());
    assert!(derive_updates(TIMESTAMP, &first, &second).unwrap().is_empty());
}
