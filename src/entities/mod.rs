pub mod custom_field;
pub mod customer;
pub mod field_config;
pub mod inquiry;
pub mod order;
pub mod phone;
