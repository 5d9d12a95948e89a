use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdError,
    StdResult, Timestamp,
};
use cw2::set_contract_version;
use grant_shared::{clamp_limit, coins_to_string, validate_limits, Accepted};

use crate::authorization::{Action, Authorization, AuthorizationGrant};
use crate::error::ContractError;
use crate::msg::{
    ConfigResponse, ExecuteMsg, GrantCursor, GrantResponse, GrantsResponse, InstantiateMsg,
    QueryMsg,
};
use crate::state::{
    delete_grant, exec_grant, grants_between, grants_by_granter, load_grant, save_grant, Config,
    CONFIG,
};

const CONTRACT_NAME: &str = "crates.io:authz";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        default_limit: msg.default_limit.unwrap_or(DEFAULT_LIMIT),
        max_limit: msg.max_limit.unwrap_or(MAX_LIMIT),
    };
    validate_limits(config.default_limit, config.max_limit)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("default_limit", config.default_limit.to_string())
        .add_attribute("max_limit", config.max_limit.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Grant {
            grantee,
            authorization,
            expiration,
        } => execute_grant(deps, env, info, grantee, authorization, expiration),
        ExecuteMsg::Revoke {
            grantee,
            msg_type_url,
        } => execute_revoke(deps, info, grantee, msg_type_url),
        ExecuteMsg::Exec { granter, action } => execute_exec(deps, env, info, granter, action),
    }
}

pub fn execute_grant(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    grantee: String,
    authorization: Authorization,
    expiration: Option<Timestamp>,
) -> Result<Response, ContractError> {
    let grantee_addr = deps.api.addr_validate(&grantee)?;
    if grantee_addr == info.sender {
        return Err(ContractError::invalid("cannot self-grant authorization"));
    }

    authorization.validate()?;

    if let Some(expiration) = expiration {
        if expiration <= env.block.time {
            return Err(ContractError::invalid("expiration must be in the future"));
        }
    }

    let msg_type_url = authorization.msg_type_url().to_string();
    let grant = AuthorizationGrant {
        granter: info.sender.clone(),
        grantee: grantee_addr,
        authorization,
        expiration,
    };
    save_grant(deps.storage, &grant)?;

    Ok(Response::new()
        .add_attribute("method", "grant")
        .add_attribute("granter", info.sender)
        .add_attribute("grantee", grantee)
        .add_attribute("msg_type_url", msg_type_url))
}

pub fn execute_revoke(
    deps: DepsMut,
    info: MessageInfo,
    grantee: String,
    msg_type_url: String,
) -> Result<Response, ContractError> {
    let grantee_addr = deps.api.addr_validate(&grantee)?;

    delete_grant(deps.storage, &info.sender, &grantee_addr, &msg_type_url)?;

    Ok(Response::new()
        .add_attribute("method", "revoke")
        .add_attribute("granter", info.sender)
        .add_attribute("grantee", grantee)
        .add_attribute("msg_type_url", msg_type_url))
}

pub fn execute_exec(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    granter: String,
    action: Action,
) -> Result<Response, ContractError> {
    let granter_addr = deps.api.addr_validate(&granter)?;

    // the granter acting for itself is always allowed
    let outcome = if granter_addr == info.sender {
        "self"
    } else {
        match exec_grant(deps.storage, &env.block, &granter_addr, &info.sender, &action)? {
            Accepted::Retain(_) => "updated",
            Accepted::Remove => "removed",
        }
    };

    Ok(Response::new()
        .add_attribute("method", "exec")
        .add_attribute("granter", granter)
        .add_attribute("grantee", info.sender)
        .add_attribute("msg_type_url", action.type_url)
        .add_attribute("amount", coins_to_string(&action.amount))
        .add_attribute("outcome", outcome))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Grant {
            granter,
            grantee,
            msg_type_url,
        } => to_json_binary(&query_grant(deps, granter, grantee, msg_type_url)?),
        QueryMsg::Grants {
            granter,
            grantee,
            start_after,
            limit,
        } => to_json_binary(&query_grants(deps, granter, grantee, start_after, limit)?),
        QueryMsg::GranterGrants {
            granter,
            start_after,
            limit,
        } => to_json_binary(&query_granter_grants(deps, granter, start_after, limit)?),
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
    }
}

fn query_grant(
    deps: Deps,
    granter: String,
    grantee: String,
    msg_type_url: String,
) -> StdResult<GrantResponse> {
    let granter_addr = deps.api.addr_validate(&granter)?;
    let grantee_addr = deps.api.addr_validate(&grantee)?;

    let grant = load_grant(deps.storage, &granter_addr, &grantee_addr, &msg_type_url)?
        .ok_or_else(|| StdError::not_found("authorization grant"))?;
    Ok(GrantResponse { grant })
}

fn query_grants(
    deps: Deps,
    granter: String,
    grantee: String,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<GrantsResponse> {
    let config = CONFIG.load(deps.storage)?;
    let limit = clamp_limit(limit, config.default_limit, config.max_limit);
    let granter_addr = deps.api.addr_validate(&granter)?;
    let grantee_addr = deps.api.addr_validate(&grantee)?;

    let grants = grants_between(
        deps.storage,
        &granter_addr,
        &grantee_addr,
        start_after.as_deref(),
    )
    .take(limit)
    .collect::<StdResult<Vec<_>>>()?;

    Ok(GrantsResponse { grants })
}

fn query_granter_grants(
    deps: Deps,
    granter: String,
    start_after: Option<GrantCursor>,
    limit: Option<u32>,
) -> StdResult<GrantsResponse> {
    let config = CONFIG.load(deps.storage)?;
    let limit = clamp_limit(limit, config.default_limit, config.max_limit);
    let granter_addr = deps.api.addr_validate(&granter)?;
    let start = start_after
        .map(|cursor| -> StdResult<_> {
            Ok((deps.api.addr_validate(&cursor.grantee)?, cursor.msg_type_url))
        })
        .transpose()?;

    let grants = grants_by_granter(
        deps.storage,
        &granter_addr,
        start
            .as_ref()
            .map(|(grantee, msg_type_url)| (grantee, msg_type_url.as_str())),
    )
    .take(limit)
        .collect::<StdResult<Vec<_>>>()?;

    Ok(GrantsResponse { grants })
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        default_limit: config.default_limit,
        max_limit: config.max_limit,
    })
}
