pub mod coupons;
pub mod otp_codes;
pub mod sms_campaigns;
pub mod support_tickets;
pub mod users;

pub use coupons::Entity as Coupons;
pub use otp_codes::Entity as OtpCodes;
pub use sms_campaigns::Entity as SmsCampaigns;
pub use support_tickets::Entity as SupportTickets;
pub use users::Entity as Users;
