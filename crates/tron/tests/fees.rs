mod common;

use common::{FakeNode, HOLDER, USDT, addr};
use prost::Message;
use std::time::Duration;
use tron_client::grpc::methods;
use tron_client::protocol::chain_parameters::ChainParameter;
use tron_client::protocol::r#return::ResponseCode;
use tron_client::protocol::{
    ChainParameters, EmptyMessage, EstimateEnergyMessage, Return, TriggerSmartContract,
};
use tron_client::resources::{FALLBACK_ENERGY_REQUIRED, FeePolicy, quote_fee_limit_sun};
use tron_client::wallet::SIGNATURE_LEN;
use tron_client::{Context, Error};

fn transfer_call() -> TriggerSmartContract {
    TriggerSmartContract {
        owner_address: addr(HOLDER).bytes(),
        contract_address: addr(USDT).bytes(),
        data: vec![0xa9, 0x05, 0x9c, 0xbb],
        ..Default::default()
    }
}

fn ok_return() -> Return {
    Return {
        result: true,
        code: ResponseCode::Success as i32,
        message: Vec::new(),
    }
}

/// A node with energy at 100 sun and bandwidth at 1000 sun per byte that estimates
/// `energy` for every trigger.
fn fee_node(energy: i64) -> FakeNode {
    let node = FakeNode::new();
    node.on(methods::GET_CHAIN_PARAMETERS, |_: EmptyMessage| {
        Ok(ChainParameters {
            chain_parameter: vec![
                ChainParameter {
                    key: "getEnergyFee".into(),
                    value: 100,
                },
                ChainParameter {
                    key: "getTransactionFee".into(),
                    value: 1000,
                },
            ],
        })
    });
    node.on(methods::ESTIMATE_ENERGY, move |_: TriggerSmartContract| {
        Ok(EstimateEnergyMessage {
            result: Some(ok_return()),
            energy_required: energy,
        })
    });
    node.on(methods::TRIGGER_CONTRACT, |req: TriggerSmartContract| {
        let mut ext = common::built_trigger(&req, Duration::from_secs(60));
        ext.result = Some(ok_return());
        Ok(ext)
    });
    node
}

#[tokio::test]
async fn estimate_energy_returns_the_node_estimate() {
    let node = fee_node(31_895);
    let client = node.client();

    let est = client
        .estimate_energy(&Context::background(), transfer_call())
        .await
        .unwrap();
    assert_eq!(est.energy_required, 31_895);
    let sent = node.requests::<TriggerSmartContract>(methods::ESTIMATE_ENERGY);
    assert_eq!(sent[0], transfer_call());
}

#[tokio::test]
async fn rejected_estimate_is_a_build_rejection() {
    let node = FakeNode::new();
    node.on(methods::ESTIMATE_ENERGY, |_: TriggerSmartContract| {
        Ok(EstimateEnergyMessage {
            result: Some(Return {
                result: false,
                code: ResponseCode::ContractExeError as i32,
                message: b"REVERT opcode executed".to_vec(),
            }),
            energy_required: 0,
        })
    });
    let client = node.client();

    let err = client
        .estimate_energy(&Context::background(), transfer_call())
        .await
        .unwrap_err();
    match err {
        Error::BuildRejected {
            label,
            code,
            message,
        } => {
            assert_eq!(label, "estimate energy");
            assert_eq!(code, ResponseCode::ContractExeError);
            assert_eq!(message, "REVERT opcode executed");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn estimate_with_bad_owner_makes_no_rpc() {
    let node = fee_node(1);
    let client = node.client();
    let mut call = transfer_call();
    call.owner_address = vec![0x41; 3];

    let err = client
        .estimate_energy(&Context::background(), call)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidAddress(_)), "{err}");
    assert_eq!(node.total_calls(), 0);
}

#[tokio::test]
async fn quote_prices_energy_and_signed_size_with_headroom() {
    let node = fee_node(20_000);
    let client = node.client();
    let policy = FeePolicy {
        fee_limit_cap_sun: u64::MAX,
        fee_limit_headroom_ppm: 200_000,
    };

    let quote = client
        .quote_trigger_fee_limit(&Context::background(), transfer_call(), 2, policy)
        .await
        .unwrap();
    assert_eq!(quote.energy_required, 20_000);
    assert_eq!(quote.fees.energy_fee_sun_per_energy, 100);
    assert_eq!(quote.fees.tx_fee_sun_per_byte, 1000);

    let base = quote_fee_limit_sun(20_000, quote.tx_size_bytes, quote.fees);
    assert_eq!(base, 2_000_000 + quote.tx_size_bytes * 1000);
    assert_eq!(quote.fee_limit_sun, base + base / 5);

    // Both signatures are counted on top of the unsigned body.
    let unsigned = common::built_trigger(&transfer_call(), Duration::from_secs(60))
        .transaction
        .unwrap()
        .encoded_len() as u64;
    assert!(quote.tx_size_bytes >= unsigned + 2 * SIGNATURE_LEN as u64);
}

#[tokio::test]
async fn quote_is_capped_by_policy() {
    let node = fee_node(1_000_000);
    let client = node.client();
    let policy = FeePolicy {
        fee_limit_cap_sun: 5_000_000,
        fee_limit_headroom_ppm: 100_000,
    };

    let quote = client
        .quote_trigger_fee_limit(&Context::background(), transfer_call(), 1, policy)
        .await
        .unwrap();
    assert!(quote_fee_limit_sun(quote.energy_required, quote.tx_size_bytes, quote.fees) > 5_000_000);
    assert_eq!(quote.fee_limit_sun, 5_000_000);
}

#[tokio::test]
async fn zero_estimate_falls_back_to_default_energy() {
    let node = fee_node(0);
    let client = node.client();

    let quote = client
        .quote_trigger_fee_limit(
            &Context::background(),
            transfer_call(),
            1,
            FeePolicy::default(),
        )
        .await
        .unwrap();
    assert_eq!(quote.energy_required, FALLBACK_ENERGY_REQUIRED);
}

#[tokio::test]
async fn quote_stops_at_a_rejected_estimate() {
    let node = fee_node(0);
    node.on(methods::ESTIMATE_ENERGY, |_: TriggerSmartContract| {
        Ok(EstimateEnergyMessage {
            result: Some(Return {
                result: false,
                code: ResponseCode::ContractValidateError as i32,
                message: b"contract does not exist".to_vec(),
            }),
            energy_required: 0,
        })
    });
    let client = node.client();

    let err = client
        .quote_trigger_fee_limit(
            &Context::background(),
            transfer_call(),
            1,
            FeePolicy::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BuildRejected { .. }), "{err}");
    assert_eq!(node.calls(methods::TRIGGER_CONTRACT), 0);
}
