pub mod helpers;
mod mocks;

mod admin;
mod claims;
mod orders;
