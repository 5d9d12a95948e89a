use cosmwasm_std::{coins, Addr, Empty, Timestamp};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};

use authz::authorization::{
    Action, Authorization, GenericAuthorization, SendAuthorization, SEND_MSG_TYPE_URL,
};
use authz::contract::{execute, instantiate, query};
use authz::msg::{ExecuteMsg, GrantResponse, GrantsResponse, InstantiateMsg, QueryMsg};
use authz::ContractError;

const VOTE: &str = "/cosmos.gov.v1beta1.MsgVote";

fn authz_contract() -> Box<dyn Contract<Empty>> {
    Box::new(ContractWrapper::new(execute, instantiate, query))
}

fn setup() -> (App, Addr) {
    let mut app = App::default();
    let code_id = app.store_code(authz_contract());
    let msg = InstantiateMsg {
        default_limit: None,
        max_limit: None,
    };
    let contract = app
        .instantiate_contract(code_id, Addr::unchecked("owner"), &msg, &[], "authz", None)
        .unwrap();
    (app, contract)
}

fn grant(
    app: &mut App,
    contract: &Addr,
    granter: &str,
    grantee: &str,
    authorization: Authorization,
    expiration: Option<Timestamp>,
) -> anyhow::Result<AppResponse> {
    let msg = ExecuteMsg::Grant {
        grantee: grantee.to_string(),
        authorization,
        expiration,
    };
    app.execute_contract(Addr::unchecked(granter), contract.clone(), &msg, &[])
}

fn exec(
    app: &mut App,
    contract: &Addr,
    granter: &str,
    grantee: &str,
    type_url: &str,
    amount: u128,
) -> anyhow::Result<AppResponse> {
    let msg = ExecuteMsg::Exec {
        granter: granter.to_string(),
        action: Action {
            type_url: type_url.to_string(),
            amount: coins(amount, "stake"),
        },
    };
    app.execute_contract(Addr::unchecked(grantee), contract.clone(), &msg, &[])
}

fn assert_contract_error(err: anyhow::Error, expected: ContractError) {
    assert_eq!(err.root_cause().to_string(), expected.to_string());
}

#[test]
fn send_grant_lifecycle() {
    let (mut app, contract) = setup();
    let send = Authorization::Send(SendAuthorization {
        spend_limit: coins(50, "stake"),
    });
    grant(&mut app, &contract, "granter", "grantee", send, None).unwrap();

    exec(&mut app, &contract, "granter", "grantee", SEND_MSG_TYPE_URL, 20).unwrap();
    let res: GrantResponse = app
        .wrap()
        .query_wasm_smart(
            contract.clone(),
            &QueryMsg::Grant {
                granter: "granter".to_string(),
                grantee: "grantee".to_string(),
                msg_type_url: SEND_MSG_TYPE_URL.to_string(),
            },
        )
        .unwrap();
    assert_eq!(
        res.grant.authorization,
        Authorization::Send(SendAuthorization {
            spend_limit: coins(30, "stake"),
        })
    );

    let err = exec(&mut app, &contract, "granter", "grantee", SEND_MSG_TYPE_URL, 31).unwrap_err();
    assert_contract_error(
        err,
        ContractError::InsufficientFunds {
            budget: "send".to_string(),
        },
    );

    exec(&mut app, &contract, "granter", "grantee", SEND_MSG_TYPE_URL, 30).unwrap();
    let err = exec(&mut app, &contract, "granter", "grantee", SEND_MSG_TYPE_URL, 1).unwrap_err();
    assert_contract_error(err, ContractError::NoGrant {});
}

#[test]
fn grants_are_listed_per_type() {
    let (mut app, contract) = setup();
    let send = Authorization::Send(SendAuthorization {
        spend_limit: coins(5, "stake"),
    });
    let vote = Authorization::Generic(GenericAuthorization {
        msg: VOTE.to_string(),
    });
    grant(&mut app, &contract, "granter", "grantee", send, None).unwrap();
    grant(&mut app, &contract, "granter", "grantee", vote, None).unwrap();

    let res: GrantsResponse = app
        .wrap()
        .query_wasm_smart(
            contract,
            &QueryMsg::Grants {
                granter: "granter".to_string(),
                grantee: "grantee".to_string(),
                start_after: None,
                limit: None,
            },
        )
        .unwrap();
    let types: Vec<&str> = res
        .grants
        .iter()
        .map(|grant| grant.authorization.msg_type_url())
        .collect();
    assert_eq!(types, vec![SEND_MSG_TYPE_URL, VOTE]);
}

#[test]
fn grant_expires_with_block_time() {
    let (mut app, contract) = setup();
    let expiration = app.block_info().time.plus_seconds(100);
    let vote = Authorization::Generic(GenericAuthorization {
        msg: VOTE.to_string(),
    });
    grant(&mut app, &contract, "granter", "grantee", vote, Some(expiration)).unwrap();

    exec(&mut app, &contract, "granter", "grantee", VOTE, 0).unwrap();

    app.update_block(|block| block.time = block.time.plus_seconds(100));
    let err = exec(&mut app, &contract, "granter", "grantee", VOTE, 0).unwrap_err();
    assert_contract_error(err, ContractError::Expired {});
}
