//! Member API Handlers

use axum::{
    Json,
    extract::{Extension, Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{account, member, membership};
use crate::utils::upload::{self, UploadKind};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN,
    validate_non_negative, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{
    Account, Member, MemberApplication, MemberCreate, MemberStats, MemberUpdate, Page,
};

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub membership_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(serde::Deserialize)]
pub struct StatusPayload {
    pub status: String,
}

/// Admin creation response: the member plus its provisioned account.
#[derive(Serialize)]
pub struct CreatedMember {
    pub member: Member,
    pub account: Account,
}

fn parse_money(value: &str, field: &str) -> Result<f64, AppError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::validation(format!("{field} must be a number")))
}

fn validate_profile_lengths(
    full_name: &str,
    father_name: &str,
    mobile: &str,
    email: &str,
    address: &str,
    occupation: &str,
) -> Result<(), AppError> {
    validate_required_text(full_name, "full_name", MAX_NAME_LEN)?;
    validate_required_text(father_name, "father_name", MAX_NAME_LEN)?;
    validate_required_text(mobile, "mobile", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
    validate_required_text(occupation, "occupation", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// POST /api/members/apply - public membership application (multipart,
/// optional profile image)
pub async fn apply(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<Member>> {
    let form = upload::collect_form(multipart).await?;

    let full_name = form.require("full_name")?.to_string();
    let father_name = form.require("father_name")?.to_string();
    let mobile = form.require("mobile")?.to_string();
    let email = form.require("email")?.to_string();
    let address = form.require("address")?.to_string();
    let occupation = form.require("occupation")?.to_string();
    let annual_income = parse_money(form.require("annual_income")?, "annual_income")?;
    validate_non_negative(annual_income, "annual_income")?;
    validate_profile_lengths(&full_name, &father_name, &mobile, &email, &address, &occupation)?;

    let plan_id = match form.get("plan_id") {
        Some(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|_| AppError::validation("plan_id must be a plan identifier"))?,
        ),
        _ => None,
    };

    let profile_image = match &form.file {
        Some(file) => Some(upload::save_image(&state.work_dir(), UploadKind::Profile, file)?),
        None => None,
    };

    let input = MemberApplication {
        full_name,
        father_name,
        mobile,
        email,
        address,
        occupation,
        annual_income,
        plan_id,
        profile_image,
    };

    let member = membership::apply(&state.pool, input).await?;

    tracing::info!(
        member_id = %member.member_id,
        email = %member.email,
        "Membership application submitted"
    );

    Ok(Json(member))
}

/// GET /api/members/public - approved member directory
pub async fn list_public(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Member>>> {
    let page = member::list_public(
        &state.pool,
        query.q.as_deref(),
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )
    .await?;
    Ok(Json(page))
}

/// GET /api/members/stats - approved member counts
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<MemberStats>> {
    let stats = member::stats(&state.pool).await?;
    Ok(Json(stats))
}

/// GET /api/members/me - the calling member's record, joined from the
/// caller's account email
pub async fn my_profile(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Member>> {
    let account_id = user
        .account_id()
        .ok_or_else(|| AppError::not_found("Account".to_string()))?;
    let account = account::find_by_id(&state.pool, account_id)
        .await?
        .ok_or_else(|| AppError::not_found("Account".to_string()))?;

    let member = member::find_by_email(&state.pool, &account.email)
        .await?
        .ok_or_else(|| AppError::not_found("Member profile".to_string()))?;
    Ok(Json(member))
}

/// GET /api/members - admin list (status/type filters, search, pagination)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Member>>> {
    let filter = member::MemberFilter {
        status: query.status,
        membership_type: query.membership_type,
        q: query.q,
    };
    let page = member::list(
        &state.pool,
        &filter,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )
    .await?;
    Ok(Json(page))
}

/// GET /api/members/:id - by database id or member ID, with a fallback
/// through the linked account for callers holding an account id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(identifier): Path<String>,
) -> AppResult<Json<Member>> {
    if let Some(found) = member::find_by_identifier(&state.pool, &identifier).await? {
        return Ok(Json(found));
    }

    if let Ok(account_id) = identifier.trim().parse::<i64>()
        && let Some(linked) = account::find_by_id(&state.pool, account_id).await?
        && let Some(found) =
            member::find_by_email_or_mobile(&state.pool, &linked.email, &linked.phone).await?
    {
        return Ok(Json(found));
    }

    Err(AppError::not_found(format!("Member {identifier}")))
}

/// POST /api/members - admin creation (provisions the paired account)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<CreatedMember>> {
    validate_profile_lengths(
        &payload.full_name,
        &payload.father_name,
        &payload.mobile,
        &payload.email,
        &payload.address,
        &payload.occupation,
    )?;
    validate_optional_text(&payload.password, "password", MAX_PASSWORD_LEN)?;

    let (member, account) = membership::admin_create(&state.pool, payload).await?;

    tracing::info!(
        member_id = %member.member_id,
        operator = %user.id,
        "Member created by admin"
    );

    Ok(Json(CreatedMember { member, account }))
}

/// PUT /api/members/:id - admin edit (plan changes re-snapshot the fee)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<Member>> {
    validate_optional_text(&payload.full_name, "full_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.father_name, "father_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.mobile, "mobile", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.occupation, "occupation", MAX_SHORT_TEXT_LEN)?;

    let member = membership::update(&state.pool, id, payload).await?;

    tracing::info!(member_id = %member.member_id, operator = %user.id, "Member updated");

    Ok(Json(member))
}

/// PATCH /api/members/:id/status - approve / reject / back to pending
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> AppResult<Json<Member>> {
    let member = membership::set_status(&state.pool, id, &payload.status).await?;

    tracing::info!(
        member_id = %member.member_id,
        status = %member.status,
        operator = %user.id,
        "Member status changed"
    );

    Ok(Json(member))
}

/// DELETE /api/members/:id - delete member and paired account
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let removed = membership::delete(&state.pool, id).await?;

    tracing::info!(
        member_id = %removed.member_id,
        operator = %user.id,
        "Member deleted"
    );

    Ok(Json(true))
}

// ── CSV export ──────────────────────────────────────────────

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn members_to_csv(members: &[Member]) -> String {
    let mut csv = String::from(
        "member_id,full_name,father_name,mobile,email,membership_type,membership_fee,status,created_at\n",
    );
    for m in members {
        let row = [
            csv_escape(&m.member_id),
            csv_escape(&m.full_name),
            csv_escape(&m.father_name),
            csv_escape(&m.mobile),
            csv_escape(&m.email),
            csv_escape(&m.membership_type),
            m.membership_fee.to_string(),
            csv_escape(&m.status),
            m.created_at.to_string(),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

/// GET /api/members/export - CSV dump of all members
pub async fn export_csv(State(state): State<ServerState>) -> AppResult<Response> {
    let members = member::export_all(&state.pool).await?;
    let csv = members_to_csv(&members);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"members.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_member_response_hides_password_hash() {
        let account = Account {
            id: 7,
            email: "a@x.com".into(),
            password_hash: "$argon2id$fake".into(),
            name: "A".into(),
            phone: "555".into(),
            address: "addr".into(),
            membership_type: "one-time".into(),
            membership_status: "approved".into(),
            role: "member".into(),
            created_at: 0,
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_members_to_csv_header_and_rows() {
        let member = Member {
            id: 1,
            member_id: "MBR-2026-00001".into(),
            full_name: "Khan, Alice".into(),
            father_name: "Khan Sr".into(),
            mobile: "555".into(),
            email: "a@x.com".into(),
            address: "addr".into(),
            occupation: "Teacher".into(),
            annual_income: 0.0,
            membership_type: "one-time".into(),
            plan_id: None,
            plan_name: "Standard".into(),
            membership_fee: 100.0,
            profile_image: None,
            status: "pending".into(),
            account_id: None,
            created_at: 1700000000000,
            updated_at: 1700000000000,
        };
        let csv = members_to_csv(&[member]);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("member_id,full_name"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Khan, Alice\""));
        assert!(row.contains("MBR-2026-00001"));
        assert!(row.contains("100"));
    }
}
