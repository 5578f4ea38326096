//! FRB bindings crate for the taskpad mobile app.

pub mod api;
