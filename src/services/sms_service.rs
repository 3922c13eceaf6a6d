use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    db::Db,
    dto::sms::CampaignInput,
    entity::{
        sms_campaigns::{ActiveModel, Column, Entity as Campaigns, Model as CampaignModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{ActionResult, AppError, AppResult, msg},
    models::SmsCampaign,
    response::{Meta, Page},
    routes::params::Pagination,
    services::required,
};

/// Who a campaign is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    CompletedProfiles,
}

impl Audience {
    pub fn parse(raw: &str) -> Option<Audience> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Audience::All),
            "completed_profiles" => Some(Audience::CompletedProfiles),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::CompletedProfiles => "completed_profiles",
        }
    }

    fn condition(&self) -> Condition {
        let base = Condition::all()
            .add(UserCol::IsActive.eq(true))
            .add(UserCol::Role.eq("user"));
        match self {
            Audience::All => base,
            Audience::CompletedProfiles => base
                .add(UserCol::FirstName.is_not_null())
                .add(UserCol::LastName.is_not_null()),
        }
    }
}

pub async fn list_campaigns(db: &Db, pagination: Pagination) -> ActionResult<Page<SmsCampaign>> {
    let result = async {
        let (page, limit, offset) = pagination.normalize();
        let finder = Campaigns::find().order_by_desc(Column::CreatedAt);
        let conn = db.orm();
        let total = finder.clone().count(&*conn).await? as i64;
        let items = finder
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&*conn)
            .await?
            .into_iter()
            .map(campaign_from_entity)
            .collect();
        Ok::<_, AppError>(Page {
            items,
            meta: Meta::new(page, limit, total),
        })
    }
    .await;
    ActionResult::settle(result, "list_campaigns", msg::LOAD_FAILED)
}

/// Record a campaign for the SMS gateway. Only the recipient count is
/// captured here; delivery happens outside this service.
pub async fn create_campaign(db: &Db, payload: CampaignInput) -> ActionResult<SmsCampaign> {
    ActionResult::settle(insert_campaign(db, payload).await, "create_campaign", msg::SAVE_FAILED)
}

async fn insert_campaign(db: &Db, payload: CampaignInput) -> AppResult<SmsCampaign> {
    let title = required(&payload.title)?;
    let message = required(&payload.message)?;
    let audience = Audience::parse(&payload.audience)
        .ok_or_else(|| AppError::bad_request(msg::INVALID_AUDIENCE))?;

    let conn = db.orm();
    let recipients = Users::find()
        .filter(audience.condition())
        .count(&*conn)
        .await? as i64;

    let model = ActiveModel {
        id: NotSet,
        title: Set(title),
        message: Set(message),
        audience: Set(audience.as_str().to_string()),
        recipient_count: Set(recipients),
        status: Set("queued".to_string()),
        created_at: NotSet,
    }
    .insert(&*conn)
    .await?;

    tracing::info!(
        campaign_id = model.id,
        audience = audience.as_str(),
        recipients,
        "sms campaign queued"
    );
    Ok(campaign_from_entity(model))
}

fn campaign_from_entity(model: CampaignModel) -> SmsCampaign {
    SmsCampaign {
        id: model.id,
        title: model.title,
        message: model.message,
        audience: model.audience,
        recipient_count: model.recipient_count,
        status: model.status,
        created_at: model.created_at,
    }
}
