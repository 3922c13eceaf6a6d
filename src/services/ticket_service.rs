use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    db::Db,
    dto::tickets::{TicketInput, TicketReply, TicketStatusUpdate},
    entity::support_tickets::{ActiveModel, Column, Entity as Tickets, Model as TicketModel},
    error::{ActionResult, AppError, AppResult, msg},
    middleware::auth::AuthUser,
    models::SupportTicket,
    response::{Meta, Page},
    routes::params::AdminListQuery,
    services::required,
};

pub const TICKET_STATUSES: [&str; 3] = ["open", "answered", "closed"];

pub async fn create_ticket(
    db: &Db,
    user: &AuthUser,
    payload: TicketInput,
) -> ActionResult<SupportTicket> {
    let result = async {
        let now = Utc::now();
        let active = ActiveModel {
            id: NotSet,
            user_id: Set(user.user_id),
            subject: Set(required(&payload.subject)?),
            message: Set(required(&payload.message)?),
            status: Set("open".to_string()),
            admin_reply: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = active.insert(&*db.orm()).await?;
        Ok::<_, AppError>(ticket_from_entity(model))
    }
    .await;
    ActionResult::settle(result, "create_ticket", msg::SAVE_FAILED)
}

pub async fn list_my_tickets(db: &Db, user: &AuthUser) -> ActionResult<Vec<SupportTicket>> {
    let result = async {
        let items = Tickets::find()
            .filter(Column::UserId.eq(user.user_id))
            .order_by_desc(Column::CreatedAt)
            .all(&*db.orm())
            .await?
            .into_iter()
            .map(ticket_from_entity)
            .collect();
        Ok::<_, AppError>(items)
    }
    .await;
    ActionResult::settle(result, "list_my_tickets", msg::LOAD_FAILED)
}

/// Admin listing; `q` filters by status.
pub async fn list_tickets(db: &Db, query: AdminListQuery) -> ActionResult<Page<SupportTicket>> {
    ActionResult::settle(load_page(db, &query).await, "list_tickets", msg::LOAD_FAILED)
}

pub async fn reply_ticket(db: &Db, id: i64, payload: TicketReply) -> ActionResult<SupportTicket> {
    let result = async {
        let reply = required(&payload.reply)?;
        let model = update_ticket(db, id, |active| {
            active.admin_reply = Set(Some(reply));
            active.status = Set("answered".to_string());
        })
        .await?;
        Ok::<_, AppError>(model)
    }
    .await;
    ActionResult::settle(result, "reply_ticket", msg::SAVE_FAILED)
}

pub async fn set_ticket_status(
    db: &Db,
    id: i64,
    payload: TicketStatusUpdate,
) -> ActionResult<SupportTicket> {
    let result = async {
        let status = payload.status.trim().to_ascii_lowercase();
        if !TICKET_STATUSES.contains(&status.as_str()) {
            return Err(AppError::bad_request(msg::INVALID_STATUS));
        }
        update_ticket(db, id, |active| active.status = Set(status)).await
    }
    .await;
    ActionResult::settle(result, "set_ticket_status", msg::SAVE_FAILED)
}

async fn update_ticket<F>(db: &Db, id: i64, apply: F) -> AppResult<SupportTicket>
where
    F: FnOnce(&mut ActiveModel),
{
    let conn = db.orm();
    let existing = Tickets::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound(msg::RECORD_NOT_FOUND))?;
    let mut active: ActiveModel = existing.into();
    apply(&mut active);
    active.updated_at = Set(Utc::now());
    let model = active.update(&*conn).await?;
    Ok(ticket_from_entity(model))
}

async fn load_page(db: &Db, query: &AdminListQuery) -> AppResult<Page<SupportTicket>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = Tickets::find().order_by_desc(Column::CreatedAt);
    if let Some(status) = query.search() {
        finder = finder.filter(Column::Status.eq(status.to_ascii_lowercase()));
    }

    let conn = db.orm();
    let total = finder.clone().count(&*conn).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&*conn)
        .await?
        .into_iter()
        .map(ticket_from_entity)
        .collect();

    Ok(Page {
        items,
        meta: Meta::new(page, limit, total),
    })
}

fn ticket_from_entity(model: TicketModel) -> SupportTicket {
    SupportTicket {
        id: model.id,
        user_id: model.user_id,
        subject: model.subject,
        message: model.message,
        status: model.status,
        admin_reply: model.admin_reply,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
