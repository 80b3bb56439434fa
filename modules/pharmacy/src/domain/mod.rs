pub mod access;
pub mod entity;
pub mod handlers;
pub mod identity;
pub mod model;
pub mod notify;
pub mod repo;
pub mod requests;
pub mod tenant;
pub mod validation;
