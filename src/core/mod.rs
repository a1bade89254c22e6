pub mod errors;
pub mod models;
pub mod paynow;
pub mod services;
pub mod split;
pub mod summary;
pub mod upstream;
