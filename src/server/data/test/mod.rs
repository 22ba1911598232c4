mod address;
mod auth_token;
mod cart;
mod comment;
mod discount;
mod notification;
mod order;
mod payment;
mod product;
mod review;
mod video;
