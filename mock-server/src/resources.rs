use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{authorize, fixtures, reject, Db, Rejection, Reply};

const DEFAULT_TAKE: usize = 100;
const MAX_IDS: usize = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesParams {
    pub from: String,
    pub to: String,
    pub units: Option<String>,
    pub sales_channel: Option<String>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffShiftsParams {
    pub clock_in_from: String,
    pub clock_in_to: String,
    pub units: Option<String>,
    pub staff_type_name: Option<String>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersParams {
    pub staff_type: Option<String>,
    pub statuses: Option<String>,
    pub units: Option<String>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersShiftsParams {
    pub clock_in_from: String,
    pub clock_in_to: String,
    pub staff_ids: String,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalEntitiesParams {
    pub type_ids: Option<String>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitShiftsParams {
    pub from: String,
    pub to: String,
    pub units: Option<String>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoresParams {
    pub business_id: String,
    pub country_id: String,
    pub unit_states: Option<String>,
    pub units: Option<String>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

pub async fn roles_list(State(db): State<Db>, headers: HeaderMap) -> Reply {
    authorize(&db, &headers, &["user.role:read"]).await?;
    Ok(Json(fixtures::roles()))
}

pub async fn roles_units(State(db): State<Db>, headers: HeaderMap) -> Reply {
    authorize(&db, &headers, &["user.role:read"]).await?;
    Ok(Json(fixtures::role_units()))
}

pub async fn sales(State(db): State<Db>, headers: HeaderMap, Query(params): Query<SalesParams>) -> Reply {
    authorize(&db, &headers, &["sales", "user.role:read"]).await?;
    ordered(&params.from, &params.to)?;
    let units = hex_ids("units", params.units.as_deref())?;
    let items: Vec<Value> = fixtures::sales()
        .into_iter()
        .filter(|sale| matches_any(sale, "unitId", units.as_deref()))
        .filter(|sale| {
            params
                .sales_channel
                .as_deref()
                .is_none_or(|channel| sale["salesChannel"] == channel)
        })
        .collect();
    Ok(Json(window("sales", &items, params.skip, params.take)))
}

pub async fn staff_shifts(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<StaffShiftsParams>,
) -> Reply {
    authorize(&db, &headers, &["staffshifts:read", "user.role:read"]).await?;
    ordered(&params.clock_in_from, &params.clock_in_to)?;
    let units = hex_ids("units", params.units.as_deref())?;
    let items: Vec<Value> = fixtures::staff_shifts()
        .into_iter()
        .filter(|shift| matches_any(shift, "unitId", units.as_deref()))
        .filter(|shift| {
            params
                .staff_type_name
                .as_deref()
                .is_none_or(|staff_type| shift["staffTypeName"] == staff_type)
        })
        .collect();
    Ok(Json(window("shifts", &items, params.skip, params.take)))
}

pub async fn staff_members(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<MembersParams>,
) -> Reply {
    authorize(&db, &headers, &["staffmembers:read", "user.role:read"]).await?;
    let units = hex_ids("units", params.units.as_deref())?;
    let statuses = split(params.statuses.as_deref());
    let items: Vec<Value> = fixtures::members()
        .into_iter()
        .filter(|member| matches_any(member, "unitId", units.as_deref()))
        .filter(|member| {
            params.staff_type.as_deref().is_none_or(|staff_type| {
                member["staffType"]
                    .as_str()
                    .is_some_and(|value| value.eq_ignore_ascii_case(staff_type))
            })
        })
        .filter(|member| {
            statuses.as_deref().is_none_or(|statuses| {
                member["status"]
                    .as_str()
                    .is_some_and(|value| statuses.iter().any(|s| s.eq_ignore_ascii_case(value)))
            })
        })
        .collect();
    Ok(Json(window("members", &items, params.skip, params.take)))
}

pub async fn members_shifts(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<MembersShiftsParams>,
) -> Reply {
    authorize(&db, &headers, &["staffshifts:read", "user.role:read"]).await?;
    ordered(&params.clock_in_from, &params.clock_in_to)?;
    let staff_ids = hex_ids("staffIds", Some(params.staff_ids.as_str()))?;
    let items: Vec<Value> = fixtures::staff_shifts()
        .into_iter()
        .filter(|shift| matches_any(shift, "staffId", staff_ids.as_deref()))
        .collect();
    Ok(Json(window("shifts", &items, params.skip, params.take)))
}

pub async fn legal_entities(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<LegalEntitiesParams>,
) -> Reply {
    authorize(&db, &headers, &["organizationstructure"]).await?;
    let type_ids = hex_ids("typeIds", params.type_ids.as_deref())?;
    let items: Vec<Value> = fixtures::legal_entities()
        .into_iter()
        .filter(|entity| matches_any(entity, "typeId", type_ids.as_deref()))
        .collect();
    Ok(Json(window("legalEntities", &items, params.skip, params.take)))
}

pub async fn unit_shifts(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<UnitShiftsParams>,
) -> Reply {
    authorize(&db, &headers, &["unit:read", "unitshifts:read", "user.role:read"]).await?;
    ordered(&params.from, &params.to)?;
    let units = hex_ids("units", params.units.as_deref())?;
    let items: Vec<Value> = fixtures::unit_shifts()
        .into_iter()
        .filter(|shift| matches_any(shift, "unitId", units.as_deref()))
        .collect();
    Ok(Json(window("shifts", &items, params.skip, params.take)))
}

pub async fn stores(State(db): State<Db>, headers: HeaderMap, Query(params): Query<StoresParams>) -> Reply {
    authorize(&db, &headers, &["shared"]).await?;
    if params.business_id.is_empty() || params.country_id.is_empty() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "businessId and countryId are required",
        ));
    }
    let units = hex_ids("units", params.units.as_deref())?;
    let states = split(params.unit_states.as_deref());
    let items: Vec<Value> = fixtures::stores()
        .into_iter()
        .filter(|store| store["businessId"] == params.business_id.as_str())
        .filter(|store| matches_any(store, "id", units.as_deref()))
        .filter(|store| {
            states.as_deref().is_none_or(|states| {
                store["state"]
                    .as_str()
                    .is_some_and(|state| states.iter().any(|s| s == state))
            })
        })
        .collect();
    Ok(Json(window("stores", &items, params.skip, params.take)))
}

pub async fn franchisee_units(State(db): State<Db>, headers: HeaderMap) -> Reply {
    authorize(&db, &headers, &["franchisee:read"]).await?;
    Ok(Json(fixtures::businesses()))
}

fn window(key: &str, items: &[Value], skip: Option<usize>, take: Option<usize>) -> Value {
    fixtures::page(key, items, skip.unwrap_or(0), take.unwrap_or(DEFAULT_TAKE))
}

fn split(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|raw| raw.split(',').map(str::to_string).collect())
}

/// Parse a comma-separated id list the way the vendor does: hex only, no
/// dashes, at most 30 entries.
fn hex_ids(name: &str, raw: Option<&str>) -> Result<Option<Vec<String>>, Rejection> {
    let Some(ids) = split(raw) else {
        return Ok(None);
    };
    if ids.len() > MAX_IDS {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            format!("{name}: at most {MAX_IDS} ids per request"),
        ));
    }
    if let Some(bad) = ids
        .iter()
        .find(|id| id.len() != 32 || !id.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            format!("{name}: `{bad}` is not a hex UUID without dashes"),
        ));
    }
    Ok(Some(ids))
}

fn matches_any(record: &Value, field: &str, wanted: Option<&[String]>) -> bool {
    wanted.is_none_or(|wanted| {
        record[field]
            .as_str()
            .is_some_and(|value| wanted.iter().any(|id| id == value))
    })
}

/// Both bounds are ISO 8601 strings, so lexical order is chronological when
/// they share a precision; mixed precision compares by the common prefix.
fn ordered(from: &str, to: &str) -> Result<(), Rejection> {
    let (from, to) = (from.as_bytes(), to.as_bytes());
    let len = from.len().min(to.len());
    if from[..len] > to[..len] || (from.len() == to.len() && from >= to) {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid_request", "from must be before to"));
    }
    Ok(())
}
