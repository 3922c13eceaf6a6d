pub mod auth;
pub mod banners;
pub mod categories;
pub mod coupons;
pub mod pages;
pub mod payments;
pub mod products;
pub mod sms;
pub mod tickets;
pub mod users;
