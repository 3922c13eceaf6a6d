use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    db::Db,
    dto::users::UserActiveUpdate,
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::{ActionResult, AppError, AppResult, msg},
    models::User,
    response::{Meta, Page},
    routes::params::AdminListQuery,
};

/// Admin user listing; `q` matches part of the phone number.
pub async fn list_users(db: &Db, query: AdminListQuery) -> ActionResult<Page<User>> {
    ActionResult::settle(load_page(db, &query).await, "list_users", msg::LOAD_FAILED)
}

pub async fn set_user_active(db: &Db, id: i64, payload: UserActiveUpdate) -> ActionResult<User> {
    let result = async {
        let conn = db.orm();
        let existing = Users::find_by_id(id)
            .one(&*conn)
            .await?
            .ok_or(AppError::NotFound(msg::RECORD_NOT_FOUND))?;
        let mut active: ActiveModel = existing.into();
        active.is_active = Set(payload.is_active);
        let model = active.update(&*conn).await?;
        Ok::<_, AppError>(user_from_entity(model))
    }
    .await;
    ActionResult::settle(result, "set_user_active", msg::SAVE_FAILED)
}

async fn load_page(db: &Db, query: &AdminListQuery) -> AppResult<Page<User>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = Users::find().order_by_desc(Column::CreatedAt);
    if let Some(search) = query.search() {
        finder = finder.filter(Column::Phone.contains(search));
    }

    let conn = db.orm();
    let total = finder.clone().count(&*conn).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&*conn)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(Page {
        items,
        meta: Meta::new(page, limit, total),
    })
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        phone: model.phone,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        role: model.role,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}
