use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    db::PoolCounters,
    dto::{
        auth::{AdminLoginRequest, OtpRequest, OtpSent, ProfileRequest, SessionState, VerifyOtpRequest},
        banners::BannerInput,
        categories::CategoryInput,
        coupons::{CouponCheckRequest, CouponInput, CouponQuote},
        pages::InfoPageInput,
        payments::PaymentRequest,
        products::ProductInput,
        sms::CampaignInput,
        tickets::{TicketInput, TicketReply, TicketStatusUpdate},
        users::UserActiveUpdate,
    },
    models::{Banner, Category, CategoryNode, Coupon, InfoPage, Product, SmsCampaign, SupportTicket, User},
    payment::{PaymentResult, PaymentStatus},
    response::{Acknowledged, Deleted, Meta},
    routes::{
        admin, auth, banners, categories, coupons, health, pages, params, payments, products,
        tickets,
    },
    session::{ADMIN_COOKIE, USER_COOKIE},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(USER_COOKIE))),
        );
        components.add_security_scheme(
            "admin_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ADMIN_COOKIE))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        banners::list_banners,
        banners::admin_list_banners,
        banners::create_banner,
        banners::update_banner,
        banners::delete_banner,
        categories::list_categories,
        categories::category_tree,
        categories::get_category,
        categories::admin_list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        pages::get_page,
        pages::admin_list_pages,
        pages::create_page,
        pages::update_page,
        pages::delete_page,
        products::list_products,
        products::get_product,
        products::admin_list_products,
        products::create_product,
        products::update_product,
        products::delete_product,
        coupons::check_coupon,
        coupons::list_coupons,
        coupons::create_coupon,
        coupons::update_coupon,
        coupons::delete_coupon,
        payments::process_payment,
        auth::request_otp,
        auth::verify_otp,
        auth::complete_profile,
        auth::current_session,
        auth::logout,
        tickets::my_tickets,
        tickets::create_ticket,
        admin::login,
        admin::logout,
        admin::list_users,
        admin::set_user_active,
        admin::list_tickets,
        admin::reply_ticket,
        admin::set_ticket_status,
        admin::list_campaigns,
        admin::create_campaign
    ),
    components(
        schemas(
            Banner,
            Category,
            CategoryNode,
            Product,
            InfoPage,
            User,
            Coupon,
            SupportTicket,
            SmsCampaign,
            PaymentResult,
            PaymentStatus,
            PoolCounters,
            BannerInput,
            CategoryInput,
            InfoPageInput,
            ProductInput,
            CouponInput,
            CouponCheckRequest,
            CouponQuote,
            PaymentRequest,
            OtpRequest,
            OtpSent,
            VerifyOtpRequest,
            ProfileRequest,
            SessionState,
            AdminLoginRequest,
            TicketInput,
            TicketReply,
            TicketStatusUpdate,
            CampaignInput,
            UserActiveUpdate,
            params::Pagination,
            params::ProductQuery,
            params::CategoryQuery,
            params::AdminListQuery,
            Acknowledged,
            Deleted,
            Meta
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Storefront", description = "Public catalog and checkout endpoints"),
        (name = "Auth", description = "Phone sign-in and session endpoints"),
        (name = "Support", description = "Customer support tickets"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
