use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Coin, Deps, DepsMut, Env, MessageInfo, Response,
    StdError, StdResult,
};
use cw2::set_contract_version;
use grant_shared::{clamp_limit, coins_to_string, validate_limits, Accepted};

use crate::allowance::{Allowance, FeeAllowanceGrant};
use crate::error::ContractError;
use crate::msg::{
    AllowanceResponse, AllowancesResponse, ConfigResponse, ExecuteMsg, GrantKey, InstantiateMsg,
    QueryMsg, SimulateUseResponse,
};
use crate::state::{
    all_allowances, allowances_by_granter, allowances_by_grantee, grant_allowance,
    load_allowance, revoke_allowance, use_granted_fees, Config, CONFIG,
};

const CONTRACT_NAME: &str = "crates.io:fee-grant";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;
const DEFAULT_MAX_ALLOWED_MESSAGES: u32 = 32;

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
        max_allowed_messages: msg
            .max_allowed_messages
            .unwrap_or(DEFAULT_MAX_ALLOWED_MESSAGES),
    };
    validate_limits(config.default_limit, config.max_limit)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("default_limit", config.default_limit.to_string())
        .add_attribute("max_limit", config.max_limit.to_string())
        .add_attribute(
            "max_allowed_messages",
            config.max_allowed_messages.to_string(),
        ))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::GrantAllowance { grantee, allowance } => {
            execute_grant_allowance(deps, info, grantee, allowance)
        }
        ExecuteMsg::RevokeAllowance { grantee } => execute_revoke_allowance(deps, info, grantee),
        ExecuteMsg::UseGrantedFees { granter, fee, msgs } => {
            execute_use_granted_fees(deps, env, info, granter, fee, msgs)
        }
    }
}

pub fn execute_grant_allowance(
    deps: DepsMut,
    info: MessageInfo,
    grantee: String,
    allowance: Allowance,
) -> Result<Response, ContractError> {
    let grantee_addr = deps.api.addr_validate(&grantee)?;
    if grantee_addr == info.sender {
        return Err(ContractError::invalid("cannot self-grant fee allowance"));
    }

    allowance.validate()?;

    let config = CONFIG.load(deps.storage)?;
    if let Allowance::Filtered(filtered) = &allowance {
        if filtered.allowed_messages.len() > config.max_allowed_messages as usize {
            return Err(ContractError::invalid(format!(
                "at most {} allowed messages",
                config.max_allowed_messages
            )));
        }
    }

    let kind = allowance.kind();
    let grant = FeeAllowanceGrant {
        granter: info.sender.clone(),
        grantee: grantee_addr,
        allowance,
    };
    grant_allowance(deps.storage, &grant)?;

    Ok(Response::new()
        .add_attribute("method", "grant_allowance")
        .add_attribute("granter", info.sender)
        .add_attribute("grantee", grantee)
        .add_attribute("allowance", kind))
}

pub fn execute_revoke_allowance(
    deps: DepsMut,
    info: MessageInfo,
    grantee: String,
) -> Result<Response, ContractError> {
    let grantee_addr = deps.api.addr_validate(&grantee)?;

    revoke_allowance(deps.storage, &info.sender, &grantee_addr)?;

    Ok(Response::new()
        .add_attribute("method", "revoke_allowance")
        .add_attribute("granter", info.sender)
        .add_attribute("grantee", grantee))
}

pub fn execute_use_granted_fees(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    granter: String,
    fee: Vec<Coin>,
    msgs: Vec<String>,
) -> Result<Response, ContractError> {
    let granter_addr = deps.api.addr_validate(&granter)?;

    let outcome = use_granted_fees(
        deps.storage,
        &env.block,
        &granter_addr,
        &info.sender,
        &fee,
        &msgs,
    )?;
    let outcome = match outcome {
        Accepted::Retain(_) => "updated",
        Accepted::Remove => "removed",
    };

    Ok(Response::new()
        .add_attribute("method", "use_granted_fees")
        .add_attribute("granter", granter)
        .add_attribute("grantee", info.sender)
        .add_attribute("fee", coins_to_string(&fee))
        .add_attribute("outcome", outcome))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Allowance { granter, grantee } => {
            to_json_binary(&query_allowance(deps, granter, grantee)?)
        }
        QueryMsg::Allowances {
            grantee,
            start_after,
            limit,
        } => to_json_binary(&query_allowances(deps, grantee, start_after, limit)?),
        QueryMsg::AllowancesByGranter {
            granter,
            start_after,
            limit,
        } => to_json_binary(&query_allowances_by_granter(
            deps,
            granter,
            start_after,
            limit,
        )?),
        QueryMsg::AllAllowances { start_after, limit } => {
            to_json_binary(&query_all_allowances(deps, start_after, limit)?)
        }
        QueryMsg::SimulateUse {
            granter,
            grantee,
            fee,
            msgs,
        } => to_json_binary(&query_simulate_use(
            deps, env, granter, grantee, fee, msgs,
        )?),
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
    }
}

fn query_allowance(deps: Deps, granter: String, grantee: String) -> StdResult<AllowanceResponse> {
    let granter_addr = deps.api.addr_validate(&granter)?;
    let grantee_addr = deps.api.addr_validate(&grantee)?;

    let allowance = load_allowance(deps.storage, &granter_addr, &grantee_addr)?
        .ok_or_else(|| StdError::not_found("fee allowance"))?;
    Ok(AllowanceResponse { allowance })
}

fn query_allowances(
    deps: Deps,
    grantee: String,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<AllowancesResponse> {
    let config = CONFIG.load(deps.storage)?;
    let limit = clamp_limit(limit, config.default_limit, config.max_limit);
    let grantee_addr = deps.api.addr_validate(&grantee)?;
    let start = start_after
        .map(|granter| deps.api.addr_validate(&granter))
        .transpose()?;

    let allowances = allowances_by_grantee(deps.storage, &grantee_addr, start.as_ref())
        .take(limit)
        .collect::<StdResult<Vec<_>>>()?;

    Ok(AllowancesResponse { allowances })
}

fn query_allowances_by_granter(
    deps: Deps,
    granter: String,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<AllowancesResponse> {
    let config = CONFIG.load(deps.storage)?;
    let limit = clamp_limit(limit, config.default_limit, config.max_limit);
    let granter_addr = deps.api.addr_validate(&granter)?;
    let start = start_after
        .map(|grantee| deps.api.addr_validate(&grantee))
        .transpose()?;

    let allowances = allowances_by_granter(deps.storage, &granter_addr, start.as_ref())
        .take(limit)
        .collect::<StdResult<Vec<_>>>()?;

    Ok(AllowancesResponse { allowances })
}

fn query_all_allowances(
    deps: Deps,
    start_after: Option<GrantKey>,
    limit: Option<u32>,
) -> StdResult<AllowancesResponse> {
    let config = CONFIG.load(deps.storage)?;
    let limit = clamp_limit(limit, config.default_limit, config.max_limit);
    let start = start_after
        .map(|key| -> StdResult<_> {
            Ok((
                deps.api.addr_validate(&key.granter)?,
                deps.api.addr_validate(&key.grantee)?,
            ))
        })
        .transpose()?;

    let allowances = all_allowances(
        deps.storage,
        start.as_ref().map(|(granter, grantee)| (granter, grantee)),
    )
    .take(limit)
    .collect::<StdResult<Vec<_>>>()?;

    Ok(AllowancesResponse { allowances })
}

fn query_simulate_use(
    deps: Deps,
    env: Env,
    granter: String,
    grantee: String,
    fee: Vec<Coin>,
    msgs: Vec<String>,
) -> StdResult<SimulateUseResponse> {
    let granter_addr = deps.api.addr_validate(&granter)?;
    let grantee_addr = deps.api.addr_validate(&grantee)?;

    let Some(grant) = load_allowance(deps.storage, &granter_addr, &grantee_addr)? else {
        return Ok(SimulateUseResponse {
            allowed: false,
            reason: ContractError::NoGrant {}.to_string(),
            remaining: None,
        });
    };

    Ok(match grant.allowance.accept(&fee, &msgs, &env.block) {
        Ok(Accepted::Retain(allowance)) => SimulateUseResponse {
            allowed: true,
            reason: "Valid".to_string(),
            remaining: Some(allowance),
        },
        Ok(Accepted::Remove) => SimulateUseResponse {
            allowed: true,
            reason: "Valid, allowance would be used up".to_string(),
            remaining: None,
        },
        Err(err) => SimulateUseResponse {
            allowed: false,
            reason: err.to_string(),
            remaining: Some(grant.allowance),
        },
    })
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        default_limit: config.default_limit,
        max_limit: config.max_limit,
        max_allowed_messages: config.max_allowed_messages,
    })
}
