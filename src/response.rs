use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Meta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page,
            per_page,
            total,
        }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: Meta,
}

/// Wire shape of every action result: `{ success, data }` or
/// `{ success, error, kind }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl<T: Serialize> ActionEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    pub fn failure(error: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            kind: Some(kind.into()),
        }
    }
}

/// Body of the logout actions.
#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct Acknowledged {
    pub success: bool,
}

/// Body of a successful delete action.
#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct Deleted {
    pub id: i64,
}
