use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr,
};

use crate::{
    db::Db,
    dto::coupons::{CouponCheckRequest, CouponInput, CouponQuote},
    entity::coupons::{ActiveModel, Column, Entity as Coupons, Model as CouponModel},
    error::{ActionResult, AppError, AppResult, msg},
    models::Coupon,
    response::{Deleted, Meta, Page},
    routes::params::AdminListQuery,
    services::required,
};

pub const DISCOUNT_TYPES: [&str; 2] = ["percent", "fixed"];

pub async fn list_coupons(db: &Db, query: AdminListQuery) -> ActionResult<Page<Coupon>> {
    let result = async {
        let (page, limit, offset) = query.pagination().normalize();
        let mut finder = Coupons::find().order_by_desc(Column::CreatedAt);
        if let Some(search) = query.search() {
            finder = finder.filter(Column::Code.contains(search.to_uppercase()));
        }

        let conn = db.orm();
        let total = finder.clone().count(&*conn).await? as i64;
        let items = finder
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&*conn)
            .await?
            .into_iter()
            .map(coupon_from_entity)
            .collect();

        Ok::<_, AppError>(Page {
            items,
            meta: Meta::new(page, limit, total),
        })
    }
    .await;
    ActionResult::settle(result, "list_coupons", msg::LOAD_FAILED)
}

pub async fn create_coupon(db: &Db, payload: CouponInput) -> ActionResult<Coupon> {
    ActionResult::settle(insert_coupon(db, payload).await, "create_coupon", msg::SAVE_FAILED)
}

pub async fn update_coupon(db: &Db, id: i64, payload: CouponInput) -> ActionResult<Coupon> {
    ActionResult::settle(
        replace_coupon(db, id, payload).await,
        "update_coupon",
        msg::SAVE_FAILED,
    )
}

pub async fn delete_coupon(db: &Db, id: i64) -> ActionResult<Deleted> {
    let result = async {
        let done = Coupons::delete_by_id(id).exec(&*db.orm()).await?;
        if done.rows_affected == 0 {
            return Err(AppError::NotFound(msg::RECORD_NOT_FOUND));
        }
        Ok::<_, AppError>(Deleted { id })
    }
    .await;
    ActionResult::settle(result, "delete_coupon", msg::DELETE_FAILED)
}

/// Price an order with a coupon code without consuming the coupon.
pub async fn check_coupon(db: &Db, payload: CouponCheckRequest) -> ActionResult<CouponQuote> {
    let result = async {
        let code = normalize_code(&payload.code)?;
        let coupon = Coupons::find()
            .filter(Column::Code.eq(code))
            .one(&*db.orm())
            .await?
            .map(coupon_from_entity)
            .ok_or_else(|| AppError::bad_request(msg::COUPON_INVALID))?;

        let discount = coupon_discount(&coupon, payload.order_amount, Utc::now())
            .map_err(AppError::bad_request)?;
        Ok::<_, AppError>(CouponQuote {
            code: coupon.code,
            discount_amount: discount,
            payable_amount: payload.order_amount - discount,
        })
    }
    .await;
    ActionResult::settle(result, "check_coupon", msg::LOAD_FAILED)
}

/// Discount granted on `order_amount`, or the reason the coupon does not apply.
pub fn coupon_discount(
    coupon: &Coupon,
    order_amount: i64,
    now: DateTime<Utc>,
) -> Result<i64, &'static str> {
    if !coupon.is_active || order_amount <= 0 {
        return Err(msg::COUPON_INVALID);
    }
    if coupon.expires_at.is_some_and(|expires| expires <= now) {
        return Err(msg::COUPON_EXPIRED);
    }
    if coupon.max_uses.is_some_and(|max| coupon.used_count >= max) {
        return Err(msg::COUPON_EXHAUSTED);
    }
    if coupon.min_order_amount.is_some_and(|min| order_amount < min) {
        return Err(msg::COUPON_MIN_ORDER);
    }

    let discount = match coupon.discount_type.as_str() {
        "percent" => i128::from(order_amount) * i128::from(coupon.discount_value) / 100,
        "fixed" => i128::from(coupon.discount_value),
        _ => return Err(msg::COUPON_INVALID),
    };
    i64::try_from(discount.clamp(0, i128::from(order_amount))).map_err(|_| msg::COUPON_INVALID)
}

fn normalize_code(raw: &str) -> AppResult<String> {
    let code = required(raw)?.to_uppercase();
    if code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        Ok(code)
    } else {
        Err(AppError::bad_request(msg::COUPON_INVALID))
    }
}

struct ValidCoupon {
    code: String,
    discount_type: String,
    discount_value: i64,
    min_order_amount: Option<i64>,
    max_uses: Option<i32>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
}

fn validate(payload: CouponInput) -> AppResult<ValidCoupon> {
    let code = normalize_code(&payload.code)?;
    let discount_type = payload.discount_type.trim().to_ascii_lowercase();
    if !DISCOUNT_TYPES.contains(&discount_type.as_str()) {
        return Err(AppError::bad_request(msg::INVALID_DISCOUNT));
    }
    let value_ok = match discount_type.as_str() {
        "percent" => (1..=100).contains(&payload.discount_value),
        _ => payload.discount_value > 0,
    };
    if !value_ok
        || payload.min_order_amount.is_some_and(|min| min < 0)
        || payload.max_uses.is_some_and(|max| max <= 0)
    {
        return Err(AppError::bad_request(msg::INVALID_DISCOUNT));
    }

    Ok(ValidCoupon {
        code,
        discount_type,
        discount_value: payload.discount_value,
        min_order_amount: payload.min_order_amount,
        max_uses: payload.max_uses,
        expires_at: payload.expires_at,
        is_active: payload.is_active,
    })
}

fn duplicate_code(err: sea_orm::DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::bad_request(msg::CODE_TAKEN),
        _ => AppError::OrmError(err),
    }
}

async fn insert_coupon(db: &Db, payload: CouponInput) -> AppResult<Coupon> {
    let coupon = validate(payload)?;
    let active = ActiveModel {
        id: NotSet,
        code: Set(coupon.code),
        discount_type: Set(coupon.discount_type),
        discount_value: Set(coupon.discount_value),
        min_order_amount: Set(coupon.min_order_amount),
        max_uses: Set(coupon.max_uses),
        used_count: Set(0),
        expires_at: Set(coupon.expires_at),
        is_active: Set(coupon.is_active),
        created_at: NotSet,
    };
    let model = active.insert(&*db.orm()).await.map_err(duplicate_code)?;
    Ok(coupon_from_entity(model))
}

async fn replace_coupon(db: &Db, id: i64, payload: CouponInput) -> AppResult<Coupon> {
    let coupon = validate(payload)?;
    let conn = db.orm();
    let existing = Coupons::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound(msg::RECORD_NOT_FOUND))?;

    let mut active: ActiveModel = existing.into();
    active.code = Set(coupon.code);
    active.discount_type = Set(coupon.discount_type);
    active.discount_value = Set(coupon.discount_value);
    active.min_order_amount = Set(coupon.min_order_amount);
    active.max_uses = Set(coupon.max_uses);
    active.expires_at = Set(coupon.expires_at);
    active.is_active = Set(coupon.is_active);
    let model = active.update(&*conn).await.map_err(duplicate_code)?;
    Ok(coupon_from_entity(model))
}

fn coupon_from_entity(model: CouponModel) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        discount_type: model.discount_type,
        discount_value: model.discount_value,
        min_order_amount: model.min_order_amount,
        max_uses: model.max_uses,
        used_count: model.used_count,
        expires_at: model.expires_at,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}
