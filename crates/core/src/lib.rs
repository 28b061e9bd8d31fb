//! Pure logic for the billing console's forms and wizards.
//!
//! Field validators, the form state container, the step progression
//! controller, and the concrete form and wizard definitions built on them.
//! Nothing in this crate performs network I/O.

pub mod contact_sales;
pub mod countries;
pub mod error;
pub mod form;
pub mod kong;
pub mod panel;
pub mod phone;
pub mod store;
pub mod types;
pub mod validators;
pub mod wizard;
pub mod wizards;
